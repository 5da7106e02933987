//! Fixed-size pagination for chat lists.

use thiserror::Error;

/// Entries per page in list views.
pub const PAGE_SIZE: usize = 10;

/// One page of a list. Pages are numbered from 1.
#[derive(Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub number: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn has_prev(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("page numbers start at 1")]
    Zero,

    #[error("page {requested} is past the last page ({total_pages})")]
    OutOfRange { requested: usize, total_pages: usize },
}

/// Number of pages for `len` items. An empty list still has one (empty) page.
pub fn total_pages(len: usize, per_page: usize) -> usize {
    len.div_ceil(per_page).max(1)
}

/// Slice out page `number` (1-indexed). Page 0 and pages past the end are
/// rejected rather than clamped.
pub fn paginate<T>(items: &[T], number: usize, per_page: usize) -> Result<Page<'_, T>, PageError> {
    let total_pages = total_pages(items.len(), per_page);

    if number == 0 {
        return Err(PageError::Zero);
    }
    if number > total_pages {
        return Err(PageError::OutOfRange {
            requested: number,
            total_pages,
        });
    }

    let start = (number - 1) * per_page;
    let end = (start + per_page).min(items.len());

    Ok(Page {
        items: &items[start..end],
        number,
        total_pages,
    })
}
