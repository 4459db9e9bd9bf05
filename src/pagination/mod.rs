//! Pagination module
//!
//! The query API pages with `start`/`max_results`. [`Paginator`] turns the
//! iteration state into the next [`RequestWindow`] and decides when to stop.

mod paginator;
mod types;

pub use paginator::Paginator;
pub use types::RequestWindow;
