//! Slice arithmetic for the two rendering strategies.

use std::ops::Range;

/// Cards per page in paginated mode.
pub const PAGE_SIZE: usize = 3;
/// Cards appended per load in incremental mode.
pub const LOAD_SIZE: usize = 5;

/// Number of pages needed for `total` items, zero when there are none.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Index range shown on 1-based `page`, clamped to `total`.
pub fn page_range(page: usize, page_size: usize, total: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    start..end
}

/// Next incremental batch after `loaded` items.
pub fn next_batch(loaded: usize, load_size: usize, total: usize) -> Range<usize> {
    let start = loaded.min(total);
    start..start.saturating_add(load_size).min(total)
}

/// Enabled state of the previous/next controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerState {
    pub page: usize,
    pub pages: usize,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl PagerState {
    pub fn new(page: usize, pages: usize) -> Self {
        Self {
            page,
            pages,
            prev_enabled: page > 1,
            next_enabled: page < pages,
        }
    }
}
