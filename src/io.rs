//! File readers: the input trace format and the random-number replay stream.
//!
//! Hand-written line-oriented lexers rather than a parser-combinator dependency: a `BufRead`
//! scanned line by line, skipping `#`-prefixed comments, propagating a typed [`InputError`] on a
//! malformed line instead of best-effort integer extraction.

use std::io::BufRead;

use log::debug;

use crate::error::InputError;
use crate::pager::RandomStream;
use crate::process::{Pid, Process};
use crate::sim::{Instruction, Opcode};
use crate::vma::Vma;

/// Lines beginning with `#` are comments; blank lines are skipped too.
fn next_content_line<R: BufRead>(
    lines: &mut std::iter::Enumerate<std::io::Lines<R>>,
) -> Option<Result<(usize, String), InputError>> {
    for (n, line) in lines.by_ref() {
        let line = match line {
            Ok(line) => line,
            Err(e) => return Some(Err(InputError::from(e))),
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        return Some(Ok((n + 1, trimmed.to_string())));
    }
    None
}

fn parse_fields(line_no: usize, line: &str, expected: usize) -> Result<Vec<i64>, InputError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != expected {
        return Err(InputError::WrongFieldCount {
            line: line_no,
            expected,
            found: fields.len(),
        });
    }
    fields
        .iter()
        .map(|f| {
            f.parse::<i64>().map_err(|_| InputError::ExpectedInteger {
                line: line_no,
                found: (*f).to_string(),
            })
        })
        .collect()
}

fn read_one_integer<R: BufRead>(
    lines: &mut std::iter::Enumerate<std::io::Lines<R>>,
    what: &'static str,
) -> Result<i64, InputError> {
    let (line_no, line) = next_content_line(lines).ok_or(InputError::UnexpectedEof(what))??;
    Ok(parse_fields(line_no, &line, 1)?[0])
}

/// Parses the process/VMA header and the instruction stream that follows it.
pub fn read_input<R: BufRead>(
    reader: R,
) -> Result<(Vec<Process>, Vec<Instruction>), InputError> {
    let mut lines = reader.lines().enumerate();

    let process_count = read_one_integer(&mut lines, "process count")?;
    let mut processes = Vec::with_capacity(process_count as usize);

    for pid in 0..process_count {
        let vma_count = read_one_integer(&mut lines, "VMA count")?;
        let mut vmas = Vec::with_capacity(vma_count as usize);
        for vma_id in 0..vma_count {
            let (line_no, line) =
                next_content_line(&mut lines).ok_or(InputError::UnexpectedEof("VMA line"))??;
            let fields = parse_fields(line_no, &line, 4)?;
            vmas.push(Vma::new(
                vma_id as u32,
                fields[0] as u8,
                fields[1] as u8,
                fields[2] != 0,
                fields[3] != 0,
            ));
        }
        processes.push(Process::new(Pid::new(pid as u32), vmas));
    }

    let mut instructions = Vec::new();
    while let Some(result) = next_content_line(&mut lines) {
        let (line_no, line) = result?;
        let mut fields = line.split_whitespace();
        let opcode_char = fields
            .next()
            .ok_or(InputError::UnexpectedEof("instruction opcode"))?;
        let opcode = match opcode_char {
            "c" => Opcode::Context(Pid::new(parse_arg(line_no, &mut fields)? as u32)),
            "r" => Opcode::Read(parse_arg(line_no, &mut fields)? as u8),
            "w" => Opcode::Write(parse_arg(line_no, &mut fields)? as u8),
            "e" => Opcode::Exit,
            other => {
                return Err(InputError::ExpectedInteger {
                    line: line_no,
                    found: other.to_string(),
                })
            }
        };
        instructions.push(Instruction::new(opcode));
    }

    debug!(
        "loaded {} processes and {} instructions",
        processes.len(),
        instructions.len()
    );
    Ok((processes, instructions))
}

fn parse_arg<'a>(
    line_no: usize,
    fields: &mut impl Iterator<Item = &'a str>,
) -> Result<i64, InputError> {
    let field = fields
        .next()
        .ok_or(InputError::UnexpectedEof("instruction argument"))?;
    field.parse::<i64>().map_err(|_| InputError::ExpectedInteger {
        line: line_no,
        found: field.to_string(),
    })
}

/// Parses a random-number file: a count `K` followed by `K` integers.
pub fn read_random_stream<R: BufRead>(reader: R) -> Result<RandomStream, InputError> {
    let mut lines = reader.lines().enumerate();
    let count = read_one_integer(&mut lines, "random number count")?;

    let mut numbers = Vec::with_capacity(count as usize);
    for _ in 0..count {
        numbers.push(read_one_integer(&mut lines, "random number")? as u32);
    }

    debug!("loaded {} random numbers", numbers.len());
    Ok(RandomStream::new(numbers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_a_minimal_trace() {
        let text = "\
            # one process, one VMA\n\
            1\n\
            1\n\
            0 9 0 0\n\
            c 0\n\
            r 3\n\
            e\n";
        let (processes, instructions) = read_input(Cursor::new(text)).unwrap();
        assert_eq!(processes.len(), 1);
        assert_eq!(instructions.len(), 3);
        assert_eq!(instructions[0].opcode, Opcode::Context(Pid::new(0)));
        assert_eq!(instructions[1].opcode, Opcode::Read(3));
        assert_eq!(instructions[2].opcode, Opcode::Exit);
    }

    #[test]
    fn rejects_wrong_vma_field_count() {
        let text = "1\n1\n0 9 0\n";
        let err = read_input(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, InputError::WrongFieldCount { .. }));
    }

    #[test]
    fn reads_random_stream_in_order() {
        let mut stream = read_random_stream(Cursor::new("3\n5\n2\n9\n")).unwrap();
        assert_eq!(stream.next(100), 5);
        assert_eq!(stream.next(100), 2);
        assert_eq!(stream.next(100), 9);
    }
}
