//! Configuration-level errors: anything that stops a run before the simulation loop starts.
//!
//! Simulated faults (`SEGV`, `SEGPROT`) are not modeled here; they are expected events handled
//! inline by the simulator. Invariant violations are not modeled here either; those are bugs in
//! the trusted input and panic instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("report flag '{0}' is not one of P, F, S")]
    UnknownReportFlag(char),

    #[error("frame count {0} is out of range (must be 1..=128)")]
    FrameCountOutOfRange(usize),

    #[error("could not open {path}: {source}")]
    CannotOpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input file: {0}")]
    MalformedInput(#[from] InputError),
}

/// A lexical or structural problem in the input or random-number file.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("line {line}: expected an integer, found '{found}'")]
    ExpectedInteger { line: usize, found: String },

    #[error("line {line}: expected {expected} fields, found {found}")]
    WrongFieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("unexpected end of file while reading {0}")]
    UnexpectedEof(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
