//! Fixed costs and limits that tune the simulation but never change at runtime.

/// Maximum frame table size accepted by `-f` (bounded by the PTE's 7-bit `phys_frame` field).
pub const MAX_FRAMES: usize = 128;

pub const COST_READ: u64 = 1;
pub const COST_WRITE: u64 = 1;
pub const COST_CTX_SWITCH: u64 = 130;
pub const COST_EXIT: u64 = 1250;
pub const COST_MAP: u64 = 300;
pub const COST_UNMAP: u64 = 400;
pub const COST_IN: u64 = 3100;
pub const COST_OUT: u64 = 2700;
pub const COST_FIN: u64 = 2800;
pub const COST_FOUT: u64 = 2400;
pub const COST_ZERO: u64 = 140;
pub const COST_SEGV: u64 = 340;
pub const COST_SEGPROT: u64 = 420;
