use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use super::ApiError;
use super::types::{
    ChatReply, ChatRequest, PopularUser, SEARCH_FIELD, SUGGESTIONS_FIELD, SearchResultSet,
    TAGS_FIELD, TrendingTag, bare_list, normalize_list,
};
use crate::auth::SessionProvider;
use crate::config::{HttpConfig, SearchConfig};
use crate::search::SearchBackend;

const POPULAR_USERS_PATH: &str = "/api/users/popular";
const TRENDING_TAGS_PATH: &str = "/api/community/tags/trending";
const COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared HTTP client for the Waydown backend. Cheap to clone; constructed
/// once and handed to whoever needs it.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub base_url: String,
    pub(crate) inner: reqwest::Client,
    pub http_cfg: HttpConfig,
    pub search_cfg: SearchConfig,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let inner = reqwest::Client::builder().build()?;
        Ok(Self {
            base_url: base_url.into(),
            inner,
            http_cfg: HttpConfig::default(),
            search_cfg: SearchConfig::default(),
        })
    }

    pub fn with_http_config(mut self, cfg: HttpConfig) -> Self {
        let builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
            .timeout(Duration::from_millis(cfg.request_timeout_ms));
        // keep the default client if the builder rejects the settings
        match builder.build() {
            Ok(c) => self.inner = c,
            Err(e) => error!(err=%e, "rebuild http client failed; keeping defaults"),
        }
        self.http_cfg = cfg;
        self
    }

    pub fn with_search_config(mut self, cfg: SearchConfig) -> Self {
        self.search_cfg = cfg;
        self
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    async fn send_json(
        &self,
        req: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<Value, ApiError> {
        let resp = req
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_transport(e, timeout))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| classify_transport(e, timeout))?;
        if !status.is_success() {
            error!(status=%status.as_u16(), body=%text, "backend non-success status");
            return Err(ApiError::Status { status, body: text });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
        bearer: Option<&str>,
        timeout: Duration,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(path);
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = bearer {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| crate::auth::AuthError::Provider("token is not a valid header".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        debug!(endpoint=%url, ?query, authenticated = bearer.is_some(), "GET");
        let req = self.inner.get(&url).headers(headers).query(query);
        self.send_json(req, timeout).await
    }

    pub async fn fetch_suggestions(&self, query: &str) -> Result<Vec<String>, ApiError> {
        let body = self
            .get_json(
                &self.search_cfg.suggestions_path,
                &[("q", query.to_string())],
                None,
                self.search_cfg.suggest_timeout(),
            )
            .await?;
        Ok(normalize_list(body, SUGGESTIONS_FIELD)?)
    }

    pub async fn search_spots(&self, query: &str) -> Result<SearchResultSet, ApiError> {
        let body = self
            .get_json(
                &self.search_cfg.search_path,
                &[("query", query.to_string())],
                None,
                self.search_cfg.search_timeout(),
            )
            .await?;
        Ok(normalize_list(body, SEARCH_FIELD)?)
    }

    /// Requires an active session; the token is mandatory here.
    pub async fn popular_users(
        &self,
        session: &dyn SessionProvider,
        limit: usize,
    ) -> Result<Vec<PopularUser>, ApiError> {
        let token = session.get_token().await?;
        let body = self
            .get_json(
                POPULAR_USERS_PATH,
                &[("limit", limit.to_string())],
                Some(&token),
                COLLABORATOR_TIMEOUT,
            )
            .await?;
        Ok(bare_list(body)?)
    }

    /// Sends the bearer token when a session exists, anonymously otherwise.
    pub async fn trending_tags(
        &self,
        session: &dyn SessionProvider,
        limit: usize,
    ) -> Result<Vec<TrendingTag>, ApiError> {
        let token = session.get_token().await.ok();
        let body = self
            .get_json(
                TRENDING_TAGS_PATH,
                &[("limit", limit.to_string())],
                token.as_deref(),
                COLLABORATOR_TIMEOUT,
            )
            .await?;
        Ok(normalize_list(body, TAGS_FIELD)?)
    }

    /// Posts one chat turn to an absolute webhook URL (outside the API base).
    pub async fn post_chat(&self, webhook_url: &str, text: &str) -> Result<ChatReply, ApiError> {
        let req = self.inner.post(webhook_url).json(&ChatRequest {
            chat_input: text.to_string(),
        });
        let timeout = Duration::from_millis(self.http_cfg.request_timeout_ms);
        let body = self.send_json(req, timeout).await?;
        if body.is_null() {
            return Ok(ChatReply::default());
        }
        Ok(serde_json::from_value(body)?)
    }
}

fn classify_transport(e: reqwest::Error, timeout: Duration) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout(timeout)
    } else {
        ApiError::Transport(e)
    }
}

#[async_trait]
impl SearchBackend for ApiClient {
    async fn suggestions(&self, query: &str) -> Result<Vec<String>, ApiError> {
        self.fetch_suggestions(query).await
    }

    async fn search(&self, query: &str) -> Result<SearchResultSet, ApiError> {
        self.search_spots(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;
    use crate::auth::StaticSession;
    use httptest::{Expectation, Server, matchers::*, responders::*};
    use serde_json::json;

    fn client_for(server: &Server) -> ApiClient {
        ApiClient::new(server.url_str("/")).unwrap()
    }

    #[test]
    fn endpoint_normalization() {
        let c = ApiClient::new("https://api.example.com/").unwrap();
        assert_eq!(
            c.endpoint("/api/spots/search"),
            "https://api.example.com/api/spots/search"
        );
        let c = ApiClient::new("https://api.example.com").unwrap();
        assert_eq!(c.endpoint("api/users/popular"), "https://api.example.com/api/users/popular");
    }

    #[tokio::test]
    async fn suggestions_accept_bare_array() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/api/spots/search/suggestions"),
                request::query(url_decoded(contains(("q", "wat")))),
            ])
            .respond_with(json_encoded(json!(["waterfall", "water hole"]))),
        );
        let got = client_for(&server).fetch_suggestions("wat").await.unwrap();
        assert_eq!(got, vec!["waterfall", "water hole"]);
    }

    #[tokio::test]
    async fn suggestions_accept_wrapper_object() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/spots/search/suggestions"))
                .respond_with(json_encoded(json!({"suggestions": ["beach cave"]}))),
        );
        let got = client_for(&server).fetch_suggestions("bea").await.unwrap();
        assert_eq!(got, vec!["beach cave"]);
    }

    #[tokio::test]
    async fn search_unwraps_spots_and_is_unauthenticated() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/api/spots/search"),
                request::query(url_decoded(contains(("query", "waterfall")))),
                not(request::headers(contains(key("authorization")))),
            ])
            .respond_with(json_encoded(json!({"spots": [{"name": "Hidden Falls"}]}))),
        );
        let got = client_for(&server).search_spots("waterfall").await.unwrap();
        assert_eq!(got, vec![json!({"name": "Hidden Falls"})]);
    }

    #[tokio::test]
    async fn non_success_status_is_network_failure() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/spots/search"))
                .respond_with(status_code(502).body("bad gateway")),
        );
        let err = client_for(&server).search_spots("x").await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::NetworkFailure);
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn slow_backend_surfaces_as_timeout() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/spots/search/suggestions"))
                .respond_with(delay_and_then(
                    Duration::from_millis(500),
                    json_encoded(json!([])),
                )),
        );
        let cfg = SearchConfig {
            suggest_timeout_ms: 50,
            ..SearchConfig::default()
        };
        let err = client_for(&server)
            .with_search_config(cfg)
            .fetch_suggestions("slow")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::NetworkTimeout);
    }

    #[tokio::test]
    async fn popular_users_sends_bearer_token() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/api/users/popular"),
                request::headers(contains(("authorization", "Bearer tok-1"))),
                request::query(url_decoded(contains(("limit", "4")))),
            ])
            .respond_with(json_encoded(json!([
                {"_id": "u1", "username": "mara", "posts": 3, "followers": 10}
            ]))),
        );
        let session = StaticSession::new(Some("tok-1".into()));
        let users = client_for(&server).popular_users(&session, 4).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "mara");
        assert_eq!(users[0].followers, 10);
    }

    #[tokio::test]
    async fn popular_users_non_array_body_is_empty() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/users/popular")).respond_with(
                json_encoded(json!({"users": [{"_id": "u1", "username": "mara"}]})),
            ),
        );
        let session = StaticSession::new(Some("tok-1".into()));
        let users = client_for(&server).popular_users(&session, 4).await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn popular_users_without_session_makes_no_request() {
        let server = Server::run();
        let session = StaticSession::default();
        let err = client_for(&server)
            .popular_users(&session, 4)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Unauthenticated);
    }

    #[tokio::test]
    async fn trending_tags_null_body_is_empty() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/community/tags/trending"))
                .respond_with(json_encoded(serde_json::Value::Null)),
        );
        let tags = client_for(&server)
            .trending_tags(&StaticSession::default(), 10)
            .await
            .unwrap();
        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn post_chat_sends_chat_input() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/webhook/chat"),
                request::body(json_decoded(eq(json!({"chatInput": "hello"})))),
            ])
            .respond_with(json_encoded(json!({"response": "hi there"}))),
        );
        let client = client_for(&server);
        let reply = client
            .post_chat(&server.url_str("/webhook/chat"), "hello")
            .await
            .unwrap();
        assert_eq!(reply.response.as_deref(), Some("hi there"));
    }
}
