//! Iteration state machine
//!
//! [`IterationState`] is an immutable value; [`IterationState::apply`] is the
//! whole transition function. [`StateMachine`] holds the current value for an
//! iterator.

use crate::error::{Error, Result};
use crate::types::SearchResults;
use std::fmt;
use std::sync::Arc;

/// Lifecycle phase of an iterator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Nothing fetched yet
    #[default]
    Initial,
    /// A window request is in flight
    Fetching,
    /// A window is buffered
    Ready,
    /// No more items will be produced
    Exhausted,
    /// A fetch failed; the error is stored
    Failed,
}

impl Phase {
    /// Exhausted and Failed absorb everything except a reset
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Exhausted | Self::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initial => "initial",
            Self::Fetching => "fetching",
            Self::Ready => "ready",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Snapshot of an iterator's progress
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IterationState {
    pub phase: Phase,
    /// 1-based index of the buffered window, 0 before any window
    pub page_index: usize,
    /// Position of the next item in `last_window`
    pub cursor: usize,
    /// Items handed out since the last reset
    pub total_consumed: usize,
    /// Most recent completed window
    pub last_window: Option<Arc<SearchResults>>,
    /// Failure that moved the state to [`Phase::Failed`]
    pub error: Option<Error>,
}

/// Input to the transition function
#[derive(Debug, Clone)]
pub enum Action {
    FetchStarted,
    FetchCompleted(Result<SearchResults>),
    ItemConsumed,
    Exhaust,
    Reset,
}

impl IterationState {
    /// Fresh state in [`Phase::Initial`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the successor state
    #[must_use]
    pub fn apply(&self, action: Action) -> Self {
        if let Action::Reset = action {
            return Self::new();
        }
        if self.phase.is_terminal() {
            return self.clone();
        }

        match action {
            Action::FetchStarted => Self {
                phase: Phase::Fetching,
                ..self.clone()
            },
            Action::FetchCompleted(Err(error)) => Self {
                phase: Phase::Failed,
                error: Some(error),
                ..self.clone()
            },
            Action::FetchCompleted(Ok(results)) if results.is_empty() => Self {
                phase: Phase::Exhausted,
                last_window: Some(Arc::new(results)),
                cursor: 0,
                ..self.clone()
            },
            Action::FetchCompleted(Ok(results)) => Self {
                phase: Phase::Ready,
                page_index: self.page_index + 1,
                cursor: 0,
                last_window: Some(Arc::new(results)),
                ..self.clone()
            },
            Action::ItemConsumed if self.has_buffered_item() => Self {
                cursor: self.cursor + 1,
                total_consumed: self.total_consumed + 1,
                ..self.clone()
            },
            Action::ItemConsumed => self.clone(),
            Action::Exhaust => Self {
                phase: Phase::Exhausted,
                ..self.clone()
            },
            Action::Reset => Self::new(),
        }
    }

    /// Whether a buffered item is waiting at the cursor
    pub fn has_buffered_item(&self) -> bool {
        self.phase == Phase::Ready
            && self
                .last_window
                .as_ref()
                .is_some_and(|w| self.cursor < w.papers.len())
    }

    /// Total matches reported by the last window, if any has completed
    pub fn total_available(&self) -> Option<usize> {
        self.last_window.as_ref().map(|w| w.total_results)
    }
}

/// Owner of the current [`IterationState`]
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    state: IterationState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &IterationState {
        &self.state
    }

    /// Apply an action and return the new state
    pub fn transition(&mut self, action: Action) -> &IterationState {
        self.state = self.state.apply(action);
        &self.state
    }

    pub fn reset(&mut self) {
        self.transition(Action::Reset);
    }
}

#[cfg(test)]
mod state_tests {
    use super::*;
    use crate::test_support::page;
    use pretty_assertions::assert_eq;

    fn ready(count: usize) -> IterationState {
        IterationState::new()
            .apply(Action::FetchStarted)
            .apply(Action::FetchCompleted(Ok(page(0, count, 100))))
    }

    #[test]
    fn test_fetch_cycle() {
        let fetching = IterationState::new().apply(Action::FetchStarted);
        assert_eq!(fetching.phase, Phase::Fetching);

        let state = fetching.apply(Action::FetchCompleted(Ok(page(0, 3, 100))));
        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(state.page_index, 1);
        assert_eq!(state.cursor, 0);
        assert_eq!(state.total_available(), Some(100));
    }

    #[test]
    fn test_consume_stops_at_window_end() {
        let mut state = ready(2);
        for _ in 0..5 {
            state = state.apply(Action::ItemConsumed);
        }
        assert_eq!(state.cursor, 2);
        assert_eq!(state.total_consumed, 2);
        assert!(!state.has_buffered_item());
    }

    #[test]
    fn test_consume_outside_ready_is_noop() {
        let state = IterationState::new().apply(Action::ItemConsumed);
        assert_eq!(state, IterationState::new());
    }

    #[test]
    fn test_empty_window_exhausts() {
        let state = ready(2)
            .apply(Action::ItemConsumed)
            .apply(Action::FetchStarted)
            .apply(Action::FetchCompleted(Ok(page(2, 0, 2))));
        assert_eq!(state.phase, Phase::Exhausted);
        assert_eq!(state.page_index, 1);
        assert_eq!(state.total_consumed, 1);
    }

    #[test]
    fn test_failure_preserves_counters() {
        let state = ready(2)
            .apply(Action::ItemConsumed)
            .apply(Action::FetchStarted)
            .apply(Action::FetchCompleted(Err(Error::network("boom"))));
        assert_eq!(state.phase, Phase::Failed);
        assert_eq!(state.total_consumed, 1);
        assert_eq!(state.page_index, 1);
        assert_eq!(state.error, Some(Error::network("boom")));
        assert_eq!(state.total_available(), Some(100));
    }

    #[test]
    fn test_terminal_phases_absorb_until_reset() {
        let failed = IterationState::new()
            .apply(Action::FetchStarted)
            .apply(Action::FetchCompleted(Err(Error::Cancelled)));
        for action in [
            Action::FetchStarted,
            Action::ItemConsumed,
            Action::Exhaust,
            Action::FetchCompleted(Ok(page(0, 1, 1))),
        ] {
            assert_eq!(failed.apply(action), failed);
        }

        let exhausted = ready(1).apply(Action::Exhaust);
        assert_eq!(exhausted.phase, Phase::Exhausted);
        assert_eq!(exhausted.apply(Action::FetchStarted), exhausted);

        assert_eq!(failed.apply(Action::Reset), IterationState::new());
        assert_eq!(exhausted.apply(Action::Reset), IterationState::new());
    }

    #[test]
    fn test_state_machine_transition_and_reset() {
        let mut machine = StateMachine::new();
        machine.transition(Action::FetchStarted);
        machine.transition(Action::FetchCompleted(Ok(page(0, 1, 1))));
        assert_eq!(machine.state().phase, Phase::Ready);

        machine.reset();
        assert_eq!(machine.state().phase, Phase::Initial);
        assert_eq!(machine.state().page_index, 0);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Failed.to_string(), "failed");
        assert!(Phase::Exhausted.is_terminal());
        assert!(!Phase::Ready.is_terminal());
    }
}
