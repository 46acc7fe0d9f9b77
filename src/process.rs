//! Simulated processes: address space, page table and paging counters.

use crate::pte::{Pte, PAGES_PER_PROCESS};
use crate::vma::Vma;

/// Identifies a process. Pids are simply the `0..N` index assigned by the input file's process
/// list, and are never recycled, because a process record outlives the process itself (see
/// [`Process`]'s doc comment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pid(u32);

impl Pid {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for Pid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-process paging counters, printed verbatim by the summary reporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub unmaps: u64,
    pub maps: u64,
    pub ins: u64,
    pub outs: u64,
    pub fins: u64,
    pub fouts: u64,
    pub zeros: u64,
    pub segv: u64,
    pub segprot: u64,
}

/// A simulated process: its pid, its VMAs, its 64-entry page table, and its paging counters.
///
/// Created once when the input file is read and kept for the entire run. The `e` instruction only
/// tears down this process's mappings (see [`crate::frame::FrameTable`]); the process record
/// itself, including its counters, survives so that the summary reporter can still print it.
#[derive(Debug, Clone)]
pub struct Process {
    pid: Pid,
    vmas: Vec<Vma>,
    page_table: [Pte; PAGES_PER_PROCESS],
    counters: Counters,
}

impl Process {
    #[must_use]
    pub fn new(pid: Pid, vmas: Vec<Vma>) -> Self {
        Self {
            pid,
            vmas,
            page_table: [Pte::empty(); PAGES_PER_PROCESS],
            counters: Counters::default(),
        }
    }

    #[must_use]
    pub const fn pid(&self) -> Pid {
        self.pid
    }

    #[must_use]
    pub const fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn counters_mut(&mut self) -> &mut Counters {
        &mut self.counters
    }

    #[must_use]
    pub fn page_table(&self) -> &[Pte; PAGES_PER_PROCESS] {
        &self.page_table
    }

    pub fn pte_mut(&mut self, vpage: u8) -> &mut Pte {
        &mut self.page_table[vpage as usize]
    }

    #[must_use]
    pub fn pte(&self, vpage: u8) -> &Pte {
        &self.page_table[vpage as usize]
    }

    /// Returns the VMA covering `vpage`, if any.
    #[must_use]
    pub fn vma_for(&self, vpage: u8) -> Option<&Vma> {
        self.vmas.iter().find(|vma| vma.contains(vpage))
    }

    /// Returns true if `vpage` is covered by one of this process's VMAs.
    #[must_use]
    pub fn in_any_vma(&self, vpage: u8) -> bool {
        self.vma_for(vpage).is_some()
    }
}
