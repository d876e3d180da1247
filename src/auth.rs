//! Session provider seam for the authenticated collaborator calls.
//!
//! The search box itself is unauthenticated; popular users and trending tags
//! attach `Authorization: Bearer <token>` obtained from a [`SessionProvider`]
//! that is injected at construction.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no active session")]
    NoSession,

    #[error("session provider failed: {0}")]
    Provider(String),
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn get_token(&self) -> Result<String, AuthError>;
}

/// Session backed by a token known up front (CLI flag, env or config file).
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    token: Option<String>,
}

impl StaticSession {
    pub fn new(token: Option<String>) -> Self {
        // blank tokens count as signed out
        let token = token.filter(|t| !t.trim().is_empty());
        Self { token }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn get_token(&self) -> Result<String, AuthError> {
        self.token.clone().ok_or(AuthError::NoSession)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_session_yields_token() {
        let s = StaticSession::new(Some("abc".into()));
        assert_eq!(s.get_token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn blank_token_means_no_session() {
        let s = StaticSession::new(Some("   ".into()));
        assert_eq!(s.get_token().await.unwrap_err(), AuthError::NoSession);
        let s = StaticSession::default();
        assert_eq!(s.get_token().await.unwrap_err(), AuthError::NoSession);
    }
}
