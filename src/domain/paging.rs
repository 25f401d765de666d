//! Offset pagination over an in-memory result set.

use std::num::NonZeroU32;
use std::ops::Range;

use super::error::DomainError;

/// Page sizes offered by the audit trail table.
pub const ROWS_PER_PAGE_OPTIONS: [u32; 3] = [5, 10, 25];
pub const DEFAULT_ROWS_PER_PAGE: NonZeroU32 = NonZeroU32::MIN.saturating_add(9);

/// Current page (1-based) and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    current_page: NonZeroU32,
    rows_per_page: NonZeroU32,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS_PER_PAGE)
    }
}

impl PageState {
    pub fn new(rows_per_page: NonZeroU32) -> Self {
        Self {
            current_page: NonZeroU32::MIN,
            rows_per_page,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page.get()
    }

    pub fn rows_per_page(&self) -> u32 {
        self.rows_per_page.get()
    }

    /// `ceil(len / rows_per_page)`; zero for an empty list.
    pub fn total_pages(&self, len: usize) -> u32 {
        let pages = len.div_ceil(self.rows_per_page.get() as usize);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Move to `page` when it lies within `[1, total_pages]`; otherwise the
    /// state is left untouched and the request is rejected. Page 1 is always
    /// valid, even for an empty list.
    pub fn go_to(&mut self, page: u32, len: usize) -> Result<(), DomainError> {
        let total_pages = self.total_pages(len);
        match NonZeroU32::new(page) {
            Some(target) if page <= total_pages.max(1) => {
                self.current_page = target;
                Ok(())
            }
            _ => Err(DomainError::PageOutOfRange {
                requested: page,
                total_pages,
            }),
        }
    }

    pub fn reset(&mut self) {
        self.current_page = NonZeroU32::MIN;
    }

    /// Change the page size; always lands back on page 1.
    pub fn set_rows_per_page(&mut self, rows_per_page: NonZeroU32) {
        self.rows_per_page = rows_per_page;
        self.reset();
    }

    pub fn has_previous(&self) -> bool {
        self.current_page.get() > 1
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.current_page.get() < self.total_pages(len)
    }

    /// Index range of the current page, clamped to `len`.
    pub fn range(&self, len: usize) -> Range<usize> {
        let rows = self.rows_per_page.get() as usize;
        let start = (self.current_page.get() as usize - 1).saturating_mul(rows);
        let end = start.saturating_add(rows);
        start.min(len)..end.min(len)
    }
}

/// Slice `[(p-1)*n, p*n)` of `items`, clamped to its length.
pub fn paginate<'a, T>(items: &'a [T], state: &PageState) -> &'a [T] {
    &items[state.range(items.len())]
}

/// Accept only the offered page sizes; anything else falls back to `fallback`.
pub fn rows_per_page_or(requested: Option<u32>, fallback: NonZeroU32) -> NonZeroU32 {
    requested
        .filter(|value| ROWS_PER_PAGE_OPTIONS.contains(value))
        .and_then(NonZeroU32::new)
        .unwrap_or(fallback)
}
