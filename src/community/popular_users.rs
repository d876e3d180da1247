use std::sync::Arc;
use tracing::{info, warn};

use super::FetchState;
use crate::api::{ApiClient, ApiError, PopularUser};
use crate::auth::{AuthError, SessionProvider};

pub const LOGIN_REQUIRED: &str = "Please log in to view popular explorers.";

pub struct PopularUsers {
    client: ApiClient,
    session: Arc<dyn SessionProvider>,
    limit: usize,
    state: FetchState<Vec<PopularUser>>,
}

impl PopularUsers {
    pub fn new(client: ApiClient, session: Arc<dyn SessionProvider>, limit: usize) -> Self {
        Self {
            client,
            session,
            limit,
            state: FetchState::Loading,
        }
    }

    pub fn state(&self) -> &FetchState<Vec<PopularUser>> {
        &self.state
    }

    /// Initial load and the retry / "see more" action.
    pub async fn refresh(&mut self) -> &FetchState<Vec<PopularUser>> {
        self.state = match self
            .client
            .popular_users(self.session.as_ref(), self.limit)
            .await
        {
            Ok(users) => {
                info!(count = users.len(), "popular users fetched");
                FetchState::Loaded(users)
            }
            Err(ApiError::Auth(AuthError::NoSession)) => FetchState::Failed(LOGIN_REQUIRED.into()),
            Err(e) => {
                warn!(err = %e, "fetching popular users failed");
                FetchState::Failed(format!("Failed to load popular users: {}", e.detail()))
            }
        };
        &self.state
    }

    pub fn render_lines(&self) -> Vec<String> {
        match &self.state {
            FetchState::Loading => vec!["Loading popular explorers...".into()],
            FetchState::Failed(msg) => vec![msg.clone(), "[retry]".into()],
            FetchState::Loaded(users) if users.is_empty() => {
                vec!["No popular explorers found.".into()]
            }
            FetchState::Loaded(users) => users
                .iter()
                .map(|u| {
                    format!(
                        "{}: {} posts, {} followers",
                        u.username, u.posts, u.followers
                    )
                })
                .collect(),
        }
    }
}
