//! Per-virtual-page state.

use bitflags::bitflags;

/// Number of virtual pages in every process's address space.
pub const PAGES_PER_PROCESS: usize = 64;

bitflags! {
    /// The single-bit fields of a page table entry.
    ///
    /// Modeled as a `bitflags` register rather than individual `bool`s, the same idiom used for
    /// per-frame state elsewhere in this crate.
    #[derive(Default)]
    pub struct PteFlags: u8 {
        const NONE          = 0;
        const VALID         = 1 << 0;
        const REFERENCED    = 1 << 1;
        const MODIFIED      = 1 << 2;
        const WRITE_PROTECT = 1 << 3;
        const PAGEDOUT      = 1 << 4;
    }
}

/// A single page table entry.
///
/// `phys_frame` is kept out of [`PteFlags`] because `bitflags` only models single-bit flags; a
/// 7-bit frame index needs its own field. The combined footprint of `Pte` is reported verbatim by
/// the summary reporter as `sizeof_pte`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pte {
    flags: PteFlags,
    phys_frame: u8,
}

impl Pte {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            flags: PteFlags::NONE,
            phys_frame: 0,
        }
    }

    #[must_use]
    pub fn valid(&self) -> bool {
        self.flags.contains(PteFlags::VALID)
    }

    #[must_use]
    pub fn referenced(&self) -> bool {
        self.flags.contains(PteFlags::REFERENCED)
    }

    #[must_use]
    pub fn modified(&self) -> bool {
        self.flags.contains(PteFlags::MODIFIED)
    }

    #[must_use]
    pub fn write_protect(&self) -> bool {
        self.flags.contains(PteFlags::WRITE_PROTECT)
    }

    #[must_use]
    pub fn pagedout(&self) -> bool {
        self.flags.contains(PteFlags::PAGEDOUT)
    }

    /// Returns the frame this entry is mapped to.
    ///
    /// # Panics
    /// Panics if the entry is not valid; callers must check [`Pte::valid`] first.
    #[must_use]
    pub fn phys_frame(&self) -> u8 {
        debug_assert!(self.valid(), "reading phys_frame of an invalid PTE");
        self.phys_frame
    }

    pub fn set_referenced(&mut self, value: bool) {
        self.flags.set(PteFlags::REFERENCED, value);
    }

    pub fn set_modified(&mut self, value: bool) {
        self.flags.set(PteFlags::MODIFIED, value);
    }

    pub fn set_write_protect(&mut self, value: bool) {
        self.flags.set(PteFlags::WRITE_PROTECT, value);
    }

    pub fn set_pagedout(&mut self, value: bool) {
        self.flags.set(PteFlags::PAGEDOUT, value);
    }

    /// Maps this entry to `frame`, setting `valid`.
    pub fn map_to(&mut self, frame: u8) {
        self.flags.insert(PteFlags::VALID);
        self.phys_frame = frame;
    }

    /// Clears every bit and the frame index, as if the page had never been mapped.
    ///
    /// Clearing `referenced`/`modified` here alongside `valid` is never observable in the printed
    /// output: the page-table reporter branches on `valid` before it ever looks at `R`/`M`, so
    /// this just keeps the in-memory state easier to reason about.
    pub fn unmap(&mut self) {
        let pagedout = self.pagedout();
        self.flags = PteFlags::NONE;
        self.set_pagedout(pagedout);
        self.phys_frame = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_pte_is_not_valid() {
        let pte = Pte::empty();
        assert!(!pte.valid());
        assert!(!pte.referenced());
        assert!(!pte.modified());
        assert!(!pte.pagedout());
    }

    #[test]
    fn map_to_sets_valid_and_frame() {
        let mut pte = Pte::empty();
        pte.map_to(5);
        assert!(pte.valid());
        assert_eq!(pte.phys_frame(), 5);
    }

    #[test]
    fn unmap_clears_everything_but_preserves_pagedout() {
        let mut pte = Pte::empty();
        pte.map_to(3);
        pte.set_referenced(true);
        pte.set_modified(true);
        pte.set_pagedout(true);
        pte.unmap();
        assert!(!pte.valid());
        assert!(!pte.referenced());
        assert!(!pte.modified());
        assert!(pte.pagedout());
    }

    #[test]
    fn sizeof_pte_is_stable() {
        // The summary reporter prints this value verbatim as `sizeof_pte`.
        assert_eq!(core::mem::size_of::<Pte>(), 2);
    }
}
