use crate::frame::{FrameId, FrameTable};
use crate::pte::Pte;
use crate::process::Process;

use super::pte_at;

/// Reference clock interval: the reference/modified bits of every valid frame are refreshed no
/// more often than this many instructions apart.
const DAEMON_INTERVAL: u64 = 50;

fn class_of(pte: &Pte) -> u8 {
    2 * u8::from(pte.referenced()) + u8::from(pte.modified())
}

/// Enhanced Second Chance / NRU victim selection.
///
/// Deliberately asymmetric: class 0 is accepted immediately if the starting hand already belongs
/// to it, but classes 1..3 always complete a full clock sweep before giving up and moving to the
/// next class.
pub(super) fn select_victim(
    hand: &mut u8,
    daemon_clock: &mut u64,
    frame_table: &FrameTable,
    processes: &mut [Process],
    inst_count: u64,
) -> FrameId {
    let len = frame_table.len() as u8;

    let mut victim = None;
    'classes: for class in 0..4u8 {
        let start = *hand;
        if class_of(pte_at(processes, frame_table, FrameId::new(start))) == class {
            victim = Some(FrameId::new(start));
            break 'classes;
        }

        loop {
            *hand = (*hand + 1) % len;
            if *hand == start {
                // Full revolution: no frame of this class exists.
                break;
            }
            let id = FrameId::new(*hand);
            if class_of(pte_at(processes, frame_table, id)) == class {
                victim = Some(id);
                break 'classes;
            }
        }
    }
    let victim = victim.expect("NRU must find a victim among a full frame table");
    *hand = (victim.get() + 1) % len;

    if inst_count.saturating_sub(*daemon_clock) >= DAEMON_INTERVAL {
        for (_, frame) in frame_table.iter() {
            if let Some((pid, vpage)) = frame.owner() {
                processes[pid.get() as usize]
                    .pte_mut(vpage)
                    .set_referenced(false);
            }
        }
        *daemon_clock = inst_count;
    }

    victim
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Pid;
    use crate::vma::Vma;

    fn process(pid: u32) -> Process {
        Process::new(Pid::new(pid), vec![Vma::new(0, 0, 63, false, false)])
    }

    #[test]
    fn prefers_class_zero_at_the_starting_hand() {
        let mut table = FrameTable::new(2);
        let mut processes = vec![process(0)];
        table.assign(FrameId::new(0), Pid::new(0), 0, 0);
        table.assign(FrameId::new(1), Pid::new(0), 1, 0);
        processes[0].pte_mut(1).set_referenced(true);
        processes[0].pte_mut(1).set_modified(true);

        let mut hand = 0;
        let mut daemon_clock = 0;
        let victim = select_victim(&mut hand, &mut daemon_clock, &table, &mut processes, 1);
        assert_eq!(victim.get(), 0);
        assert_eq!(hand, 1);
    }

    #[test]
    fn falls_back_to_lowest_nonempty_class() {
        let mut table = FrameTable::new(2);
        let mut processes = vec![process(0)];
        table.assign(FrameId::new(0), Pid::new(0), 0, 0);
        table.assign(FrameId::new(1), Pid::new(0), 1, 0);
        processes[0].pte_mut(0).set_referenced(true);
        processes[0].pte_mut(1).set_referenced(true);

        let mut hand = 0;
        let mut daemon_clock = 0;
        // Both frames are class 2 (R=1,M=0); class 0 and 1 are empty, so the scan must fall
        // through to class 2 and pick the frame at the starting hand.
        let victim = select_victim(&mut hand, &mut daemon_clock, &table, &mut processes, 1);
        assert_eq!(victim.get(), 0);
    }

    #[test]
    fn daemon_resets_reference_bits_after_fifty_instructions() {
        let mut table = FrameTable::new(1);
        let mut processes = vec![process(0)];
        table.assign(FrameId::new(0), Pid::new(0), 0, 0);
        processes[0].pte_mut(0).set_referenced(true);

        let mut hand = 0;
        let mut daemon_clock = 0;
        select_victim(&mut hand, &mut daemon_clock, &table, &mut processes, 50);
        assert_eq!(daemon_clock, 50);
        assert!(!processes[0].pte(0).referenced());
    }
}
