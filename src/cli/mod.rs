//! CLI module
//!
//! Command-line front end for the client.
//!
//! # Commands
//!
//! - `search` - Stream papers matching a query
//! - `get` - Fetch papers by identifier

mod commands;
mod runner;

pub use commands::{Cli, Commands, Direction, OutputFormat, SortField};
pub use runner::Runner;
