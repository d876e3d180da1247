//! Fetch-on-open, render-the-list panels: popular explorers and trending tags.

mod popular_users;
mod trending_tags;

pub use popular_users::*;
pub use trending_tags::*;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState<T> {
    #[default]
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(msg) => Some(msg.as_str()),
            _ => None,
        }
    }
}
