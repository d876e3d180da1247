//! Incremental search-and-suggest input.
//!
//! [`SearchInputController`] owns the query text, the suggestion list and the
//! displayed [`Phase`]. Background work (debounce timers, network calls) never
//! mutates that state directly: it posts a [`SearchEvent`] to the controller's
//! inbox, and the owner applies events one at a time with
//! [`SearchInputController::apply`]. Suggestion responses carry the
//! [`Generation`] they were issued for and are dropped when it is no longer
//! current, whatever order they arrive in.

mod backend;
mod controller;
mod debounce;
mod sink;
mod state;

pub use backend::*;
pub use controller::*;
pub use sink::*;
pub use state::*;
