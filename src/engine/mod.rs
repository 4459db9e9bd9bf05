//! Iteration engine
//!
//! Lazy, pull-based iteration over paginated search results.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Fetcher` - one window request bound to a cancellation token
//! - `PaperIterator` - explicit cursor (`poll_next`) plus stream views
//! - `IterationState` / `Action` - the transition function behind both
//!
//! A `poll_next` call makes at most one window request. Failures are stored
//! in the state and returned again on every later poll until `reset`.

mod state;

pub use state::{Action, IterationState, Phase, StateMachine};

use crate::client::ArxivClient;
use crate::error::{Error, Result};
use crate::pagination::{Paginator, RequestWindow};
use crate::query::Query;
use crate::types::{Paper, SearchResults};
use futures::stream::{self, Stream};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Issues window requests for an iterator
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: ArxivClient,
    cancel: CancellationToken,
}

impl Fetcher {
    pub fn new(client: ArxivClient, cancel: CancellationToken) -> Self {
        Self { client, cancel }
    }

    /// Fetch one window, retried and rate limited by the client
    pub async fn fetch(&self, query: &Query, window: RequestWindow) -> Result<SearchResults> {
        self.client.fetch_window(query, window, &self.cancel).await
    }

    /// Same client, different cancellation token
    #[must_use]
    pub fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self {
            client: self.client.clone(),
            cancel,
        }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Lazy iterator over every paper matching a query
///
/// Created by [`ArxivClient::iter`].
#[derive(Debug)]
pub struct PaperIterator {
    fetcher: Fetcher,
    query: Arc<Query>,
    paginator: Paginator,
    machine: StateMachine,
}

impl PaperIterator {
    pub(crate) fn new(client: ArxivClient, query: Query, cancel: CancellationToken) -> Self {
        let paginator = client.paginator_for(&query);
        Self {
            fetcher: Fetcher::new(client, cancel),
            query: Arc::new(query),
            paginator,
            machine: StateMachine::new(),
        }
    }

    /// Advance by one paper
    ///
    /// `Ok(None)` means the results are exhausted. After a failure the same
    /// error is returned on every call until [`reset`](Self::reset).
    pub async fn poll_next(&mut self) -> Result<Option<Paper>> {
        if let Some(outcome) = self.take_buffered() {
            return outcome;
        }

        if !self.paginator.might_have_more(self.machine.state()) {
            self.machine.transition(Action::Exhaust);
            return Ok(None);
        }

        let window = self.paginator.next_window(self.machine.state());
        self.machine.transition(Action::FetchStarted);
        debug!(
            "Fetching page {} window {}",
            self.machine.state().page_index + 1,
            window
        );
        let result = self.fetcher.fetch(&self.query, window).await;
        self.machine.transition(Action::FetchCompleted(result));

        self.take_buffered().unwrap_or(Ok(None))
    }

    /// Resolve a poll from the current state alone
    ///
    /// `None` means a fetch is needed.
    fn take_buffered(&mut self) -> Option<Result<Option<Paper>>> {
        let state = self.machine.state();
        match state.phase {
            Phase::Failed => Some(Err(state
                .error
                .clone()
                .unwrap_or_else(|| Error::fatal("iteration failed")))),
            Phase::Exhausted => Some(Ok(None)),
            Phase::Ready if state.has_buffered_item() => {
                if self.paginator.limit_reached(state.total_consumed) {
                    self.machine.transition(Action::Exhaust);
                    return Some(Ok(None));
                }
                let paper = state
                    .last_window
                    .as_ref()
                    .and_then(|w| w.papers.get(state.cursor))
                    .cloned();
                self.machine.transition(Action::ItemConsumed);
                paper.map(|p| Ok(Some(p)))
            }
            _ => None,
        }
    }

    /// Papers handed out since creation or the last reset
    pub fn total_consumed(&self) -> usize {
        self.machine.state().total_consumed
    }

    /// Total matches reported by the server, once a window has completed
    pub fn total_available(&self) -> Option<usize> {
        self.machine.state().total_available()
    }

    /// 1-based index of the buffered window, 0 before the first
    pub fn current_page_index(&self) -> usize {
        self.machine.state().page_index
    }

    /// Snapshot of the current state
    pub fn state(&self) -> IterationState {
        self.machine.state().clone()
    }

    pub fn phase(&self) -> Phase {
        self.machine.state().phase
    }

    /// Stored failure, if the iterator has failed
    pub fn error(&self) -> Option<&Error> {
        self.machine.state().error.as_ref()
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Start over from the first window
    pub fn reset(&mut self) {
        self.machine.reset();
    }

    /// Fresh iterator over the same query and client, bound to `cancel`
    #[must_use]
    pub fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self {
            fetcher: self.fetcher.with_cancellation(cancel),
            query: Arc::clone(&self.query),
            paginator: self.paginator,
            machine: StateMachine::new(),
        }
    }

    /// Stream of papers that ends on exhaustion or failure
    ///
    /// A failure is kept for [`error`](Self::error) once the stream ends.
    pub fn stream(&mut self) -> impl Stream<Item = Paper> + '_ {
        stream::unfold(self, |it| async move {
            match it.poll_next().await {
                Ok(Some(paper)) => Some((paper, it)),
                Ok(None) | Err(_) => None,
            }
        })
    }

    /// Stream of results; a failure is yielded once and ends the stream
    pub fn try_stream(&mut self) -> impl Stream<Item = Result<Paper>> + '_ {
        stream::unfold(Some(self), |it| async move {
            let it = it?;
            match it.poll_next().await {
                Ok(Some(paper)) => Some((Ok(paper), Some(it))),
                Ok(None) => None,
                Err(err) => Some((Err(err), None)),
            }
        })
    }

    /// Drain every remaining paper
    pub async fn collect(&mut self) -> Result<Vec<Paper>> {
        let mut papers = Vec::new();
        while let Some(paper) = self.poll_next().await? {
            papers.push(paper);
        }
        Ok(papers)
    }

    /// Take up to `n` papers without fetching past them
    pub async fn collect_n(&mut self, n: usize) -> Result<Vec<Paper>> {
        let mut papers = Vec::with_capacity(n.min(self.paginator.page_size));
        while papers.len() < n {
            match self.poll_next().await? {
                Some(paper) => papers.push(paper),
                None => break,
            }
        }
        Ok(papers)
    }

    /// Call `f` for every remaining paper, stopping at the first error
    pub async fn for_each<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(Paper) -> Result<()>,
    {
        while let Some(paper) = self.poll_next().await? {
            f(paper)?;
        }
        Ok(())
    }
}
