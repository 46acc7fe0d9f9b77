use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::process::ExitCode;

use anyhow::Context;
use log::info;

use vmsim::cli::Cli;
use vmsim::error::ConfigError;
use vmsim::io::{read_input, read_random_stream};
use vmsim::pager::RandomStream;
use vmsim::report::{print_frame_table, print_page_tables, print_summary};
use vmsim::logging;
use vmsim::sim::Simulator;

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("vmsim: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_and_validate()?;

    let input = BufReader::new(
        File::open(&cli.input_file).map_err(|source| ConfigError::CannotOpenFile {
            path: cli.input_file.clone(),
            source,
        })?,
    );
    let (processes, instructions) =
        read_input(input).map_err(ConfigError::MalformedInput)?;

    let random_stream: Option<RandomStream> =
        if matches!(cli.algorithm, vmsim::cli::Algorithm::Random) {
            let random_file = BufReader::new(File::open(&cli.random_file).map_err(|source| {
                ConfigError::CannotOpenFile {
                    path: cli.random_file.clone(),
                    source,
                }
            })?);
            Some(read_random_stream(random_file).map_err(ConfigError::MalformedInput)?)
        } else {
            None
        };

    info!(
        "starting simulation: {} processes, {} frames, {} instructions",
        processes.len(),
        cli.frames,
        instructions.len()
    );

    let pager = cli.algorithm.into_pager(random_stream);
    let mut simulator = Simulator::new(processes, cli.frames, pager);

    let stdout = std::io::stdout();
    let mut trace = BufWriter::new(stdout.lock());
    simulator
        .run(&instructions, &mut trace)
        .context("failed to write simulation trace")?;

    if cli.reports.page_table {
        print_page_tables(&simulator, &mut trace).context("failed to write page table report")?;
    }
    if cli.reports.frame_table {
        print_frame_table(&simulator, &mut trace).context("failed to write frame table report")?;
    }
    if cli.reports.summary {
        print_summary(&simulator, &mut trace).context("failed to write summary report")?;
    }

    Ok(())
}
