//! Pagination types

use std::fmt;

/// One page request: `size` items starting at `offset`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RequestWindow {
    pub offset: usize,
    pub size: usize,
}

impl RequestWindow {
    pub fn new(offset: usize, size: usize) -> Self {
        Self { offset, size }
    }

    /// Offset just past the window
    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}

impl fmt::Display for RequestWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.offset, self.end())
    }
}
