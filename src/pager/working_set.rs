use crate::frame::{FrameId, FrameTable};
use crate::process::Process;

use super::pte_at;

/// Eligibility window, in instructions, below which a frame is considered still "in use" even if
/// unreferenced.
const TAU: i64 = 49;

/// WS-Clock victim selection.
///
/// Sweeps from the hand looking for the first frame that is both unreferenced and older than
/// [`TAU`] instructions. Referenced frames are given a second chance (their `last_used` is
/// refreshed and the bit cleared) as the scan passes them. By the end of a full failed
/// revolution every frame has had its reference bit cleared this way, so the fallback simply
/// picks the frame with the smallest `last_used` across the whole table.
pub(super) fn select_victim(
    hand: &mut u8,
    frame_table: &mut FrameTable,
    processes: &mut [Process],
    inst_count: u64,
) -> FrameId {
    let len = frame_table.len() as u8;
    let start = *hand;
    let mut cursor = start;
    let mut found = None;

    for _ in 0..len {
        let id = FrameId::new(cursor);
        if pte_at(processes, frame_table, id).referenced() {
            pte_at(processes, frame_table, id).set_referenced(false);
            frame_table.get_mut(id).set_last_used(inst_count - 1);
        } else {
            let age = inst_count as i64 - 2 - frame_table.get(id).last_used() as i64;
            if age >= TAU {
                found = Some(id);
                cursor = (cursor + 1) % len;
                break;
            }
        }
        cursor = (cursor + 1) % len;
    }

    let victim = found.unwrap_or_else(|| {
        let mut oldest: Option<(FrameId, u64)> = None;
        let mut probe = start;
        for _ in 0..len {
            let id = FrameId::new(probe);
            let last_used = frame_table.get(id).last_used();
            if oldest.map_or(true, |(_, best)| last_used < best) {
                oldest = Some((id, last_used));
            }
            probe = (probe + 1) % len;
        }
        oldest.map(|(id, _)| id).expect("frame table is never empty")
    });
    *hand = cursor;
    victim
}
