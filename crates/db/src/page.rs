use crate::table::StoreError;

/// One-based page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Both `page` and `size` must be at least 1.
    pub fn new(page: u32, size: u32) -> Result<Self, StoreError> {
        if page == 0 || size == 0 {
            return Err(StoreError::InvalidPage { page, size });
        }
        Ok(Self { page, size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of records skipped before this page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.size as usize
    }
}
