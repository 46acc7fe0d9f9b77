use crate::frame::{FrameId, FrameTable};

/// Ages every valid frame by one instruction cycle and returns the frame with the smallest age,
/// preferring the lowest frame id on ties.
///
/// Each tick shifts the frame's 32-bit age register right by one and, if the frame's PTE was
/// referenced, sets the top bit before clearing the reference bit. A single revolution of the
/// hand is enough since every frame is visited exactly once per selection.
pub(super) fn select_victim(
    hand: &mut u8,
    frame_table: &mut FrameTable,
    processes: &mut [crate::process::Process],
) -> FrameId {
    let len = frame_table.len() as u8;

    let mut best: Option<(FrameId, u32)> = None;
    for _ in 0..len {
        let id = FrameId::new(*hand);
        let frame = frame_table.get_mut(id);
        let (pid, vpage) = frame.owner().expect("frame table entries are always owned");

        let pte = processes[pid.get() as usize].pte_mut(vpage);
        let mut age = frame.age() >> 1;
        if pte.referenced() {
            age |= 0x8000_0000;
            pte.set_referenced(false);
        }
        frame.set_age(age);

        if best.map_or(true, |(_, best_age)| age < best_age) {
            best = Some((id, age));
        }

        *hand = (*hand + 1) % len;
    }

    let (victim, _) = best.expect("frame table is never empty");
    *hand = (victim.get() + 1) % len;
    victim
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{Pid, Process};
    use crate::vma::Vma;

    fn process(pid: u32) -> Process {
        Process::new(Pid::new(pid), vec![Vma::new(0, 0, 63, false, false)])
    }

    #[test]
    fn unreferenced_frames_age_toward_zero_and_win() {
        let mut table = FrameTable::new(3);
        let mut processes = vec![process(0)];
        for i in 0..3u8 {
            table.assign(FrameId::new(i), Pid::new(0), i, 0);
            table.get_mut(FrameId::new(i)).set_age(0xFFFF_FFFF);
        }
        processes[0].pte_mut(0).set_referenced(true);
        processes[0].pte_mut(1).set_referenced(true);
        // frame 2 is left unreferenced, so its age shifts to 0x7FFF_FFFF while 0 and 1 get the
        // top bit re-set to 0xFFFF_FFFF; frame 2 must win.

        let mut hand = 0;
        let victim = select_victim(&mut hand, &mut table, &mut processes);
        assert_eq!(victim.get(), 2);
    }

    #[test]
    fn ties_prefer_lowest_frame_id() {
        let mut table = FrameTable::new(2);
        let mut processes = vec![process(0)];
        table.assign(FrameId::new(0), Pid::new(0), 0, 0);
        table.assign(FrameId::new(1), Pid::new(0), 1, 0);

        let mut hand = 0;
        let victim = select_victim(&mut hand, &mut table, &mut processes);
        assert_eq!(victim.get(), 0);
    }
}
