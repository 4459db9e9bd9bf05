//! Response decoder module
//!
//! Turns the Atom XML returned by the query API into [`SearchResults`].
//!
//! [`SearchResults`]: crate::types::SearchResults

mod atom;
mod types;
mod xml;

pub use atom::{extract_arxiv_id, AtomDecoder};
pub use types::FeedDecoder;
pub use xml::{parse_document, XmlElement};
