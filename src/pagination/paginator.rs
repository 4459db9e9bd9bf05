//! Offset paginator
//!
//! Pure functions of the iteration state: where the next window starts, how
//! large it is, and whether one is worth requesting at all.

use super::types::RequestWindow;
use crate::engine::IterationState;
use crate::types::SearchResults;

/// Offset/limit pagination over the query API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    /// Items requested per window
    pub page_size: usize,
    /// Cap on items handed out; 0 means unlimited
    pub total_limit: usize,
}

impl Paginator {
    pub fn new(page_size: usize, total_limit: usize) -> Self {
        Self {
            page_size,
            total_limit,
        }
    }

    /// Offset of the window following `prior`
    pub fn next_offset(&self, prior: Option<&SearchResults>) -> usize {
        prior.map_or(0, SearchResults::end_offset)
    }

    /// Window size, clamped so the limit is never overshot
    pub fn next_page_size(&self, total_consumed: usize) -> usize {
        if self.total_limit > 0 {
            let remaining = self.total_limit.saturating_sub(total_consumed);
            self.page_size.min(remaining)
        } else {
            self.page_size
        }
    }

    /// Whether another window might contain items
    pub fn might_have_more(&self, state: &IterationState) -> bool {
        let Some(last) = state.last_window.as_deref() else {
            return true;
        };

        if self.limit_reached(state.total_consumed) {
            return false;
        }
        if last.total_results > 0 && last.end_offset() >= last.total_results {
            return false;
        }
        // A short page means the server ran out
        last.len() >= self.page_size
    }

    /// Whether `total_consumed` has hit the item cap
    pub fn limit_reached(&self, total_consumed: usize) -> bool {
        self.total_limit > 0 && total_consumed >= self.total_limit
    }

    /// Window to request next
    pub fn next_window(&self, state: &IterationState) -> RequestWindow {
        RequestWindow::new(
            self.next_offset(state.last_window.as_deref()),
            self.next_page_size(state.total_consumed),
        )
    }
}
