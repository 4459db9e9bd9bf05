//! Shared fixtures for unit tests

use crate::error::{Error, Result};
use crate::http::Transport;
use crate::pagination::RequestWindow;
use crate::query::Query;
use crate::types::{Paper, SearchResults};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Atom entry for a synthetic paper
pub fn entry_xml(id: &str) -> String {
    format!(
        r#"  <entry>
    <id>http://arxiv.org/abs/{id}</id>
    <updated>2023-01-02T00:00:00-05:00</updated>
    <published>2023-01-01T00:00:00-05:00</published>
    <title>Paper {id}</title>
    <summary>Abstract of {id}.</summary>
    <author><name>Ada Lovelace</name></author>
    <link href="http://arxiv.org/abs/{id}" rel="alternate" type="text/html"/>
    <category term="cs.AI" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
"#
    )
}

/// Atom feed wrapping synthetic entries
pub fn feed_xml(total: usize, start: usize, ids: &[String]) -> String {
    let entries: String = ids.iter().map(|id| entry_xml(id)).collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query</title>
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">{total}</opensearch:totalResults>
  <opensearch:startIndex xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">{start}</opensearch:startIndex>
  <opensearch:itemsPerPage xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">{count}</opensearch:itemsPerPage>
{entries}</feed>
"#,
        count = ids.len()
    )
}

/// Synthetic ids `p{offset}` .. `p{offset+count-1}`
pub fn ids(offset: usize, count: usize) -> Vec<String> {
    (offset..offset + count).map(|i| format!("p{i}")).collect()
}

pub fn paper(id: impl Into<String>) -> Paper {
    let ts = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    Paper {
        id: id.into(),
        title: "t".to_string(),
        abstract_text: "a".to_string(),
        authors: Vec::new(),
        categories: Vec::new(),
        published_at: ts,
        updated_at: ts,
        doi: None,
        journal_ref: None,
        comment: None,
        links: Vec::new(),
    }
}

pub fn page(start: usize, count: usize, total: usize) -> SearchResults {
    SearchResults {
        papers: (start..start + count).map(|i| paper(format!("p{i}"))).collect(),
        total_results: total,
        start_index: start,
        items_per_page: count,
    }
}

/// In-memory transport serving a fixed corpus, with scripted failures
#[derive(Debug, Default)]
pub struct StubTransport {
    /// Number of papers on the "server"; `None` means unlimited
    pub corpus: Option<usize>,
    /// Report the total count in responses
    pub report_total: bool,
    /// Calls that succeed before scripted failures kick in
    succeed_first: usize,
    failures: Mutex<VecDeque<Error>>,
    calls: Mutex<Vec<(RequestWindow, Instant)>>,
}

impl StubTransport {
    pub fn with_corpus(size: usize) -> Self {
        Self {
            corpus: Some(size),
            report_total: true,
            ..Self::default()
        }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Respond with a zero total, as the API does for some id lookups
    pub fn without_total(mut self) -> Self {
        self.report_total = false;
        self
    }

    /// Fail the next calls with these errors, in order
    pub fn fail_with(self, errors: impl IntoIterator<Item = Error>) -> Self {
        self.failures.lock().unwrap().extend(errors);
        self
    }

    /// Serve `successes` calls normally, then fail with these errors
    pub fn fail_after(mut self, successes: usize, errors: impl IntoIterator<Item = Error>) -> Self {
        self.succeed_first = successes;
        self.fail_with(errors)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn windows(&self) -> Vec<RequestWindow> {
        self.calls.lock().unwrap().iter().map(|(w, _)| *w).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn perform_request(
        &self,
        _query: &Query,
        window: RequestWindow,
        _cancel: &CancellationToken,
    ) -> Result<SearchResults> {
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((window, Instant::now()));
            calls.len() - 1
        };
        if call_index >= self.succeed_first {
            if let Some(err) = self.failures.lock().unwrap().pop_front() {
                return Err(err);
            }
        }

        let end = match self.corpus {
            Some(size) => (window.offset + window.size).min(size),
            None => window.offset + window.size,
        };
        let count = end.saturating_sub(window.offset);
        let total = if self.report_total {
            self.corpus.unwrap_or(0)
        } else {
            0
        };
        Ok(page(window.offset, count, total))
    }
}
