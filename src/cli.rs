//! Command-line parsing.
//!
//! `clap`'s derive API is configured to accept the reference tool's attached short-option syntax
//! (`-f32`, `-aw`, `-oPFS`) as well as the conventional spaced form (`-f 32`); both are valid short
//! option parses under `clap` and are accepted identically.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::error::ConfigError;
use crate::pager::Pager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    #[value(name = "f")]
    Fifo,
    #[value(name = "c")]
    Clock,
    #[value(name = "e")]
    Nru,
    #[value(name = "a")]
    Aging,
    #[value(name = "w")]
    WorkingSet,
    #[value(name = "r")]
    Random,
}

impl Algorithm {
    /// Builds the pager variant for this algorithm. `Random` additionally needs the pre-loaded
    /// number stream, since it has no clock hand of its own.
    #[must_use]
    pub fn into_pager(self, random_stream: Option<crate::pager::RandomStream>) -> Pager {
        match self {
            Self::Fifo => Pager::fifo(),
            Self::Clock => Pager::clock(),
            Self::Nru => Pager::nru(),
            Self::Aging => Pager::aging(),
            Self::WorkingSet => Pager::working_set(),
            Self::Random => {
                Pager::random(random_stream.expect("random algorithm requires a random file"))
            }
        }
    }
}

/// Which optional reports to print after the simulation finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportFlags {
    pub page_table: bool,
    pub frame_table: bool,
    pub summary: bool,
}

impl std::str::FromStr for ReportFlags {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Self::default();
        for c in s.chars() {
            match c {
                'P' => flags.page_table = true,
                'F' => flags.frame_table = true,
                'S' => flags.summary = true,
                other => return Err(ConfigError::UnknownReportFlag(other)),
            }
        }
        Ok(flags)
    }
}

#[derive(Debug, Parser)]
#[command(name = "vmsim", about = "Deterministic demand-paging virtual memory simulator")]
pub struct Cli {
    /// Number of physical frames (1..=128).
    #[arg(short = 'f', value_name = "FRAMES")]
    pub frames: usize,

    /// Page-replacement algorithm: f, c, e, a, w, r.
    #[arg(short = 'a', value_enum)]
    pub algorithm: Algorithm,

    /// Reports to print after the run: any subset of P, F, S.
    #[arg(short = 'o')]
    pub reports: ReportFlags,

    /// Input trace: process/VMA declarations followed by instructions.
    pub input_file: PathBuf,

    /// Pre-recorded integer stream consumed by the random algorithm.
    pub random_file: PathBuf,
}

impl Cli {
    pub fn parse_and_validate() -> Result<Self, ConfigError> {
        let cli = <Self as Parser>::parse();
        if !(1..=crate::config::MAX_FRAMES).contains(&cli.frames) {
            return Err(ConfigError::FrameCountOutOfRange(cli.frames));
        }
        Ok(cli)
    }
}
