//! Virtual memory area descriptors.

/// A contiguous range of virtual pages with uniform protection/mapping attributes.
///
/// Ranges within one process are assumed not to overlap; the reader does not validate this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vma {
    id: u32,
    start_vpage: u8,
    end_vpage: u8,
    write_protected: bool,
    file_mapped: bool,
}

impl Vma {
    /// Creates a new VMA covering `[start_vpage, end_vpage]` inclusive.
    ///
    /// # Panics
    /// Panics if `start_vpage > end_vpage` or either bound lies outside `0..PAGES_PER_PROCESS`.
    #[must_use]
    pub fn new(
        id: u32,
        start_vpage: u8,
        end_vpage: u8,
        write_protected: bool,
        file_mapped: bool,
    ) -> Self {
        assert!(start_vpage <= end_vpage, "VMA start must not exceed end");
        assert!(
            (end_vpage as usize) < crate::pte::PAGES_PER_PROCESS,
            "VMA end_vpage out of range"
        );
        Self {
            id,
            start_vpage,
            end_vpage,
            write_protected,
            file_mapped,
        }
    }

    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn contains(&self, vpage: u8) -> bool {
        (self.start_vpage..=self.end_vpage).contains(&vpage)
    }

    #[must_use]
    pub const fn write_protected(&self) -> bool {
        self.write_protected
    }

    #[must_use]
    pub const fn file_mapped(&self) -> bool {
        self.file_mapped
    }
}
