use std::sync::Arc;
use tracing::warn;

use super::FetchState;
use crate::api::{ApiClient, TrendingTag};
use crate::auth::SessionProvider;

pub struct TrendingTags {
    client: ApiClient,
    session: Arc<dyn SessionProvider>,
    limit: usize,
    state: FetchState<Vec<TrendingTag>>,
}

impl TrendingTags {
    pub fn new(client: ApiClient, session: Arc<dyn SessionProvider>, limit: usize) -> Self {
        Self {
            client,
            session,
            limit,
            state: FetchState::Loading,
        }
    }

    pub fn state(&self) -> &FetchState<Vec<TrendingTag>> {
        &self.state
    }

    pub async fn refresh(&mut self) -> &FetchState<Vec<TrendingTag>> {
        self.state = match self
            .client
            .trending_tags(self.session.as_ref(), self.limit)
            .await
        {
            Ok(tags) => FetchState::Loaded(tags),
            Err(e) => {
                warn!(err = %e, "fetching trending tags failed");
                FetchState::Failed(format!("Failed to load trending tags: {}", e.detail()))
            }
        };
        &self.state
    }

    pub fn render_lines(&self) -> Vec<String> {
        match &self.state {
            FetchState::Loading => vec!["Loading trending tags...".into()],
            FetchState::Failed(msg) => vec![msg.clone(), "[retry]".into()],
            FetchState::Loaded(tags) if tags.is_empty() => {
                vec!["No trending tags available.".into()]
            }
            FetchState::Loaded(tags) => tags
                .iter()
                .map(|t| format!("#{} ({})", t.name, t.count))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticSession;
    use httptest::{Expectation, Server, matchers::*, responders::*};
    use serde_json::json;

    #[tokio::test]
    async fn anonymous_fetch_renders_tags() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/api/community/tags/trending"),
                request::query(url_decoded(contains(("limit", "10")))),
                not(request::headers(contains(key("authorization")))),
            ])
            .respond_with(json_encoded(json!([
                {"name": "waterfalls", "count": 31},
                {"name": "caves", "count": 7}
            ]))),
        );
        let client = ApiClient::new(server.url_str("/")).unwrap();
        let mut t = TrendingTags::new(client, Arc::new(StaticSession::default()), 10);
        t.refresh().await;
        assert_eq!(
            t.render_lines(),
            vec!["#waterfalls (31)".to_string(), "#caves (7)".to_string()]
        );
    }

    #[tokio::test]
    async fn failure_uses_server_message_field() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/community/tags/trending"))
                .respond_with(status_code(500).body(r#"{"message":"cache cold"}"#)),
        );
        let client = ApiClient::new(server.url_str("/")).unwrap();
        let mut t = TrendingTags::new(client, Arc::new(StaticSession::new(Some("t".into()))), 3);
        assert_eq!(
            t.refresh().await.error(),
            Some("Failed to load trending tags: cache cold")
        );
    }
}
