//! Page-replacement policies.
//!
//! A fixed set of policies selected once at startup (by the `-a` CLI flag) and represented as a
//! closed enum rather than a `dyn` trait object, since the algorithm never changes at runtime.

mod aging;
mod clock;
mod fifo;
mod nru;
mod random;
mod working_set;

use crate::frame::{FrameId, FrameTable};
use crate::process::Process;
use crate::pte::Pte;

pub use random::RandomStream;

/// Looks up the PTE owning `id`, by indexing into the process it is currently mapped to.
///
/// # Panics
/// Panics if `id` names a frame with no owner.
fn pte_at<'a>(processes: &'a mut [Process], frame_table: &FrameTable, id: FrameId) -> &'a mut Pte {
    let (pid, vpage) = frame_table
        .get(id)
        .owner()
        .expect("victim selection only ever inspects owned frames");
    processes[pid.get() as usize].pte_mut(vpage)
}

/// The page-replacement policy in effect for a run, along with whatever hand/clock state it
/// needs between calls.
#[derive(Debug, Clone)]
pub enum Pager {
    Fifo { hand: u8 },
    Clock { hand: u8 },
    Nru { hand: u8, daemon_clock: u64 },
    Aging { hand: u8 },
    WorkingSet { hand: u8 },
    Random { stream: RandomStream },
}

impl Pager {
    #[must_use]
    pub const fn fifo() -> Self {
        Self::Fifo { hand: 0 }
    }

    #[must_use]
    pub const fn clock() -> Self {
        Self::Clock { hand: 0 }
    }

    #[must_use]
    pub const fn nru() -> Self {
        Self::Nru {
            hand: 0,
            daemon_clock: 0,
        }
    }

    #[must_use]
    pub const fn aging() -> Self {
        Self::Aging { hand: 0 }
    }

    #[must_use]
    pub const fn working_set() -> Self {
        Self::WorkingSet { hand: 0 }
    }

    #[must_use]
    pub const fn random(stream: RandomStream) -> Self {
        Self::Random { stream }
    }

    /// Picks the next victim frame, mutating whatever internal clock state the policy keeps.
    pub fn select_victim(
        &mut self,
        frame_table: &mut FrameTable,
        processes: &mut [Process],
        inst_count: u64,
    ) -> FrameId {
        match self {
            Self::Fifo { hand } => fifo::select_victim(hand, frame_table),
            Self::Clock { hand } => clock::select_victim(hand, frame_table, processes),
            Self::Nru { hand, daemon_clock } => {
                nru::select_victim(hand, daemon_clock, frame_table, processes, inst_count)
            }
            Self::Aging { hand } => aging::select_victim(hand, frame_table, processes),
            Self::WorkingSet { hand } => {
                working_set::select_victim(hand, frame_table, processes, inst_count)
            }
            Self::Random { stream } => random::select_victim(stream, frame_table),
        }
    }
}
