use tokio::sync::mpsc;
use tracing::warn;

use crate::api::SearchResultSet;

/// Receives the results of each successful submission, exactly once.
///
/// Called from [`super::SearchInputController::apply`] on the owner's task,
/// so implementations must hand the results off rather than do slow work.
pub trait ResultSink: Send {
    fn on_results(&mut self, results: SearchResultSet);
}

impl<F> ResultSink for F
where
    F: FnMut(SearchResultSet) + Send,
{
    fn on_results(&mut self, results: SearchResultSet) {
        self(results)
    }
}

/// Forwards results into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink(pub mpsc::UnboundedSender<SearchResultSet>);

impl ResultSink for ChannelSink {
    fn on_results(&mut self, results: SearchResultSet) {
        if self.0.send(results).is_err() {
            warn!("result receiver dropped; discarding search results");
        }
    }
}
