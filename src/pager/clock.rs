use crate::frame::{FrameId, FrameTable};
use crate::process::Process;

use super::pte_at;

/// Advances the hand past every referenced frame, clearing `referenced` as it goes, and returns
/// the first frame found with `referenced == 0`.
pub(super) fn select_victim(
    hand: &mut u8,
    frame_table: &FrameTable,
    processes: &mut [Process],
) -> FrameId {
    let len = frame_table.len() as u8;
    loop {
        let id = FrameId::new(*hand);
        let pte = pte_at(processes, frame_table, id);
        if pte.referenced() {
            pte.set_referenced(false);
            *hand = (*hand + 1) % len;
        } else {
            *hand = (*hand + 1) % len;
            return id;
        }
    }
}
