//! Atom feed decoder
//!
//! Maps the query API's Atom response onto [`SearchResults`]. The opensearch
//! extension elements carry the paging metadata; arXiv-specific elements
//! (`arxiv:doi`, `arxiv:comment`, ...) are optional.

use super::types::FeedDecoder;
use super::xml::{parse_document, XmlElement};
use crate::error::{Error, Result};
use crate::types::{Author, Link, Paper, SearchResults};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static ABS_URL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:export\.)?arxiv\.org/abs/").expect("static regex is valid")
});

/// Decoder for the arXiv Atom feed
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomDecoder;

impl AtomDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FeedDecoder for AtomDecoder {
    fn decode(&self, body: &str) -> Result<SearchResults> {
        let feed = parse_document(body)?;
        if feed.name != "feed" {
            return Err(Error::fatal(format!(
                "Expected an Atom <feed> root, found <{}>",
                feed.name
            )));
        }

        let papers = feed
            .children_named("entry")
            .enumerate()
            .map(|(i, entry)| {
                convert_entry(entry).map_err(|e| Error::fatal(format!("entry {i}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SearchResults {
            papers,
            total_results: parse_count(&feed, "totalResults")?,
            start_index: parse_count(&feed, "startIndex")?,
            items_per_page: parse_count(&feed, "itemsPerPage")?,
        })
    }
}

/// Strip the abstract-page URL prefix from an entry id
///
/// `http://arxiv.org/abs/1234.5678v1` becomes `1234.5678v1`; anything else
/// is returned unchanged.
pub fn extract_arxiv_id(full_id: &str) -> String {
    ABS_URL_PREFIX.replace(full_id.trim(), "").into_owned()
}

fn parse_count(feed: &XmlElement, name: &str) -> Result<usize> {
    match feed.child_text(name) {
        None | Some("") => Ok(0),
        Some(text) => text
            .parse()
            .map_err(|_| Error::fatal(format!("invalid {name} value '{text}'"))),
    }
}

fn parse_timestamp(entry: &XmlElement, name: &str) -> Result<DateTime<Utc>> {
    let text = entry.child_text(name).unwrap_or_default();
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::fatal(format!("failed to parse {name} date '{text}': {e}")))
}

fn optional_text(entry: &XmlElement, name: &str) -> Option<String> {
    entry
        .child_text(name)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn convert_entry(entry: &XmlElement) -> Result<Paper> {
    let raw_id = entry.child_text("id").unwrap_or_default();

    // The API reports query errors as a pseudo-entry
    if raw_id.contains("/api/errors") {
        let message = entry.child_text("summary").unwrap_or("unknown API error");
        return Err(Error::fatal(format!("API error: {message}")));
    }

    let authors = entry
        .children_named("author")
        .map(|a| Author {
            name: a.child_text("name").unwrap_or_default().to_string(),
            affiliation: optional_text(a, "affiliation"),
        })
        .collect();

    let categories = entry
        .children_named("category")
        .filter_map(|c| c.attr("term"))
        .map(str::to_string)
        .collect();

    let links = entry
        .children_named("link")
        .map(|l| Link {
            href: l.attr("href").unwrap_or_default().to_string(),
            rel: l.attr("rel").unwrap_or_default().to_string(),
            content_type: l.attr("type").map(str::to_string),
            title: l.attr("title").map(str::to_string),
        })
        .collect();

    Ok(Paper {
        id: extract_arxiv_id(raw_id),
        title: entry.child_text("title").unwrap_or_default().to_string(),
        abstract_text: entry.child_text("summary").unwrap_or_default().to_string(),
        authors,
        categories,
        published_at: parse_timestamp(entry, "published")?,
        updated_at: parse_timestamp(entry, "updated")?,
        doi: optional_text(entry, "doi"),
        journal_ref: optional_text(entry, "journal_ref"),
        comment: optional_text(entry, "comment"),
        links,
    })
}
