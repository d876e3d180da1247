use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::backend::SearchBackend;
use super::debounce::DebounceSlot;
use super::sink::ResultSink;
use super::state::{Generation, Phase, QueryState, is_blank};
use crate::api::{ApiError, SearchResultSet};
use crate::config::SearchConfig;

pub const SUGGESTIONS_FAILED: &str = "Failed to fetch suggestions. Please try again.";
pub const SEARCH_FAILED: &str = "Search failed. Please try again.";

pub type SubmissionId = u64;

/// Completion notices posted by background work to the controller inbox.
#[derive(Debug)]
pub enum SearchEvent {
    DebounceElapsed {
        generation: Generation,
        text: String,
    },
    SuggestionsResolved {
        generation: Generation,
        outcome: Result<Vec<String>, ApiError>,
    },
    SearchResolved {
        submission: SubmissionId,
        outcome: Result<SearchResultSet, ApiError>,
    },
}

/// What [`SearchInputController::apply`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Displayed state changed.
    Updated,
    /// Results were handed to the sink.
    Delivered,
    /// Superseded by newer input; dropped without effect.
    Stale,
    /// The controller has been shut down.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Issued(SubmissionId),
    /// Blank text; nothing was sent.
    EmptyQuery,
    /// The controller has been shut down.
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTiming {
    pub debounce: Duration,
    pub suggest_timeout: Duration,
    pub search_timeout: Duration,
}

impl Default for SearchTiming {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchTiming {
    fn from(cfg: &SearchConfig) -> Self {
        Self {
            debounce: cfg.debounce(),
            suggest_timeout: cfg.suggest_timeout(),
            search_timeout: cfg.search_timeout(),
        }
    }
}

pub struct SearchInputController<B: SearchBackend, S: ResultSink> {
    backend: Arc<B>,
    sink: S,
    timing: SearchTiming,
    state: QueryState,
    debounce: DebounceSlot,
    inbox_tx: mpsc::UnboundedSender<SearchEvent>,
    inbox_rx: mpsc::UnboundedReceiver<SearchEvent>,
    last_submission: SubmissionId,
    /// The latest submission while its response is outstanding.
    pending_submission: Option<SubmissionId>,
    torn_down: bool,
}

impl<B: SearchBackend, S: ResultSink> SearchInputController<B, S> {
    pub fn new(backend: Arc<B>, sink: S, timing: SearchTiming) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            sink,
            debounce: DebounceSlot::new(timing.debounce),
            timing,
            state: QueryState::default(),
            inbox_tx,
            inbox_rx,
            last_submission: 0,
            pending_submission: None,
            torn_down: false,
        }
    }

    pub fn text(&self) -> &str {
        self.state.text()
    }

    pub fn suggestions(&self) -> &[String] {
        self.state.suggestions()
    }

    pub fn phase(&self) -> &Phase {
        self.state.phase()
    }

    /// Keystroke path. Records the text, clears any error and schedules a
    /// debounced suggestion lookup; blank text clears suggestions instead.
    pub fn set_query_text(&mut self, text: impl Into<String>) {
        if self.torn_down {
            return;
        }
        let text = text.into();
        let generation = self.state.set_text(text.clone());
        if matches!(
            self.state.phase(),
            Phase::Error(_) | Phase::FetchingSuggestions
        ) {
            self.settle_phase();
        }

        if is_blank(&text) {
            self.debounce.cancel();
            self.state.clear_suggestions();
            debug!(%generation, "blank query; suggestions cleared");
            return;
        }

        let tx = self.inbox_tx.clone();
        self.debounce.schedule(move || {
            let _ = tx.send(SearchEvent::DebounceElapsed { generation, text });
        });
    }

    /// Full search for `text`. Clears suggestions before anything is sent and
    /// makes any pending or in-flight suggestion lookup stale.
    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        if self.torn_down {
            return SubmitOutcome::Inactive;
        }
        if is_blank(text) {
            return SubmitOutcome::EmptyQuery;
        }

        self.debounce.cancel();
        self.state.advance();
        self.state.clear_suggestions();
        self.state.set_phase(Phase::Submitting);
        self.last_submission += 1;
        let submission = self.last_submission;
        self.pending_submission = Some(submission);
        info!(submission, query = %text, "submitting search");

        let backend = Arc::clone(&self.backend);
        let tx = self.inbox_tx.clone();
        let timeout = self.timing.search_timeout;
        let query = text.to_string();
        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, backend.search(&query)).await {
                Ok(res) => res,
                Err(_) => Err(ApiError::Timeout(timeout)),
            };
            let _ = tx.send(SearchEvent::SearchResolved {
                submission,
                outcome,
            });
        });
        SubmitOutcome::Issued(submission)
    }

    pub fn submit_current(&mut self) -> SubmitOutcome {
        let text = self.state.text().to_string();
        self.submit(&text)
    }

    /// Suggestion click: adopt the text and search right away, no debounce.
    pub fn select_suggestion(&mut self, suggestion: impl Into<String>) -> SubmitOutcome {
        if self.torn_down {
            return SubmitOutcome::Inactive;
        }
        let suggestion = suggestion.into();
        self.state.set_text(suggestion.clone());
        self.submit(&suggestion)
    }

    /// Retry affordance shown with an error: re-submits the current text.
    pub fn retry(&mut self) -> SubmitOutcome {
        self.submit_current()
    }

    pub fn dismiss_error(&mut self) {
        if matches!(self.state.phase(), Phase::Error(_)) {
            self.settle_phase();
        }
    }

    /// Resting phase: `Submitting` while the latest search is outstanding.
    fn settle_phase(&mut self) {
        let phase = if self.pending_submission.is_some() {
            Phase::Submitting
        } else {
            Phase::Idle
        };
        self.state.set_phase(phase);
    }

    pub async fn next_event(&mut self) -> Option<SearchEvent> {
        self.inbox_rx.recv().await
    }

    #[cfg(test)]
    pub fn try_next_event(&mut self) -> Option<SearchEvent> {
        self.inbox_rx.try_recv().ok()
    }

    /// Waits for the next event and applies it.
    #[cfg(test)]
    pub async fn step(&mut self) -> Option<Applied> {
        let event = self.next_event().await?;
        Some(self.apply(event))
    }

    pub fn apply(&mut self, event: SearchEvent) -> Applied {
        if self.torn_down {
            return Applied::Ignored;
        }
        match event {
            SearchEvent::DebounceElapsed { generation, text } => {
                if !self.state.is_current(generation) {
                    debug!(%generation, "debounce fired for superseded text");
                    return Applied::Stale;
                }
                // an outstanding search keeps showing as Submitting
                if self.pending_submission.is_none() {
                    self.state.set_phase(Phase::FetchingSuggestions);
                }
                self.spawn_suggestions(generation, text);
                Applied::Updated
            }
            SearchEvent::SuggestionsResolved {
                generation,
                outcome,
            } => {
                if !self.state.is_current(generation) {
                    debug!(%generation, current = %self.state.generation(), ok = outcome.is_ok(), "dropping stale suggestions");
                    return Applied::Stale;
                }
                match outcome {
                    Ok(list) => {
                        debug!(%generation, count = list.len(), "suggestions applied");
                        self.state.replace_suggestions(list);
                        self.settle_phase();
                    }
                    Err(e) => {
                        warn!(%generation, kind = ?e.kind(), err = %e, "suggestion lookup failed");
                        self.state.clear_suggestions();
                        self.state.set_phase(Phase::Error(SUGGESTIONS_FAILED.to_string()));
                    }
                }
                Applied::Updated
            }
            SearchEvent::SearchResolved {
                submission,
                outcome,
            } => {
                let latest = self.pending_submission == Some(submission);
                if latest {
                    self.pending_submission = None;
                }
                match outcome {
                    Ok(results) => {
                        info!(submission, count = results.len(), "search results delivered");
                        if latest && *self.state.phase() == Phase::Submitting {
                            self.state.set_phase(Phase::Idle);
                        }
                        self.sink.on_results(results);
                        Applied::Delivered
                    }
                    Err(e) => {
                        warn!(submission, kind = ?e.kind(), err = %e, "search failed");
                        if latest {
                            self.state.set_phase(Phase::Error(SEARCH_FAILED.to_string()));
                            Applied::Updated
                        } else {
                            Applied::Stale
                        }
                    }
                }
            }
        }
    }

    fn spawn_suggestions(&self, generation: Generation, text: String) {
        let backend = Arc::clone(&self.backend);
        let tx = self.inbox_tx.clone();
        let timeout = self.timing.suggest_timeout;
        debug!(%generation, query = %text, "fetching suggestions");
        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, backend.suggestions(&text)).await {
                Ok(res) => res,
                Err(_) => Err(ApiError::Timeout(timeout)),
            };
            let _ = tx.send(SearchEvent::SuggestionsResolved {
                generation,
                outcome,
            });
        });
    }

    /// Teardown. Pending timers are cleared and anything still in flight
    /// resolves into [`Applied::Ignored`].
    pub fn shutdown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.pending_submission = None;
        self.debounce.shutdown();
        self.state.advance();
        debug!("search controller shut down");
    }

    #[cfg(test)]
    pub fn is_shut_down(&self) -> bool {
        self.torn_down
    }
}
