//! HTTP client for the panel's login and inbound endpoints.

use reqwest::StatusCode;
use reqwest::header::COOKIE;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::{ApiResponse, RawInbound};
use crate::config::PanelConfig;

const LOGIN_PATH: &str = "/login/";
const INBOUND_LIST_PATH: &str = "/xui/inbound/list";

/// Errors that can occur while talking to the panel.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("Panel request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Panel returned HTTP {0}")]
    Status(StatusCode),

    #[error("Panel rejected the request: {0}")]
    Rejected(String),

    #[error("Not logged in to the panel")]
    NotLoggedIn,

    #[error("Login response carried no '{0}' cookie")]
    MissingSessionCookie(String),

    #[error("Unexpected panel response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for PanelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}

impl PanelError {
    /// Whether the panel refused our session rather than failing to answer.
    #[must_use]
    pub fn is_session_rejection(&self) -> bool {
        match self {
            Self::Rejected(_) | Self::NotLoggedIn => true,
            Self::Status(status) => {
                *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
            }
            _ => false,
        }
    }
}

/// Client for a single panel, owning its HTTP connection pool and session.
pub struct PanelClient {
    http: reqwest::Client,
    config: PanelConfig,
    session: Option<String>,
}

impl PanelClient {
    /// Creates a client for the configured panel. No request is made yet.
    pub fn new(config: PanelConfig) -> Result<Self, PanelError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("xui_usage_bot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config,
            session: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Whether a session token has been captured.
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Forgets the current session so the next cycle logs in again.
    pub fn clear_session(&mut self) {
        self.session = None;
    }

    /// Logs in and stores the session token.
    ///
    /// Never fails loudly: any error is logged and reported as `false`, and
    /// the previously stored session is kept untouched.
    pub async fn login(&mut self) -> bool {
        match self.establish_session().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Panel login failed: {}", e);
                false
            }
        }
    }

    /// Logs in and stores the session token, reporting why it failed.
    pub async fn establish_session(&mut self) -> Result<(), PanelError> {
        let token = self.request_session().await?;
        self.session = Some(token);
        info!("Logged in to panel at {}", self.config.address);
        Ok(())
    }

    /// Submits the credentials and returns the session token on success.
    async fn request_session(&self) -> Result<String, PanelError> {
        debug!("Logging in to panel as {}", self.config.username);

        let response = self
            .http
            .post(self.url(LOGIN_PATH))
            .form(&[
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .timeout(self.config.login_timeout())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PanelError::Status(status));
        }

        let token = response
            .cookies()
            .find(|cookie| cookie.name() == self.config.session_cookie)
            .map(|cookie| cookie.value().to_owned());

        let body = response.text().await?;
        let envelope: ApiResponse<serde_json::Value> = serde_json::from_str(&body)?;
        if !envelope.success {
            return Err(PanelError::Rejected(rejection_message(envelope.msg)));
        }

        token.ok_or_else(|| PanelError::MissingSessionCookie(self.config.session_cookie.clone()))
    }

    /// Fetches every inbound together with its client statistics.
    ///
    /// Does not retry and does not log in again on failure.
    pub async fn fetch_inbounds(&self) -> Result<Vec<RawInbound>, PanelError> {
        let session = self.session.as_deref().ok_or(PanelError::NotLoggedIn)?;

        let response = self
            .http
            .post(self.url(INBOUND_LIST_PATH))
            .header(COOKIE, format!("{}={}", self.config.session_cookie, session))
            .timeout(self.config.fetch_timeout())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PanelError::Status(status));
        }

        let body = response.text().await?;
        let envelope: ApiResponse<Vec<RawInbound>> = serde_json::from_str(&body)?;
        if !envelope.success {
            return Err(PanelError::Rejected(rejection_message(envelope.msg)));
        }

        let inbounds = envelope.obj.unwrap_or_default();
        debug!("Fetched {} inbounds", inbounds.len());
        Ok(inbounds)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.address, path)
    }
}

fn rejection_message(msg: String) -> String {
    if msg.is_empty() {
        "success flag was false".to_owned()
    } else {
        msg
    }
}

impl std::fmt::Debug for PanelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelClient")
            .field("address", &self.config.address)
            .field("has_session", &self.has_session())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::prelude::*;

    use super::*;

    const LIST_BODY: &str = r#"{
        "success": true,
        "msg": "",
        "obj": [{
            "id": 1,
            "port": 443,
            "settings": "{\"clients\":[{\"id\":\"u1\",\"email\":\"a@x\"}]}",
            "clientStats": [{"email": "a@x", "up": 1, "down": 2, "enable": true, "expiryTime": 0}]
        }]
    }"#;

    fn client_for(server: &MockServer) -> PanelClient {
        let config = PanelConfig::new(&server.base_url(), "admin".to_owned(), "secret".to_owned());
        PanelClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_login_captures_session_cookie() {
        let server = MockServer::start_async().await;
        let login = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/login/")
                    .body_contains("username=admin")
                    .body_contains("password=secret");
                then.status(200)
                    .header("content-type", "application/json")
                    .header("set-cookie", "session=tok123; Path=/; HttpOnly")
                    .body(r#"{"success":true,"msg":"ok","obj":null}"#);
            })
            .await;

        let mut client = client_for(&server);
        assert!(!client.has_session());
        assert!(client.login().await);
        assert!(client.has_session());
        login.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_rejected_by_panel() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/login/");
                then.status(200)
                    .header("set-cookie", "session=tok123; Path=/")
                    .body(r#"{"success":false,"msg":"wrong password"}"#);
            })
            .await;

        let mut client = client_for(&server);
        assert!(!client.login().await);
        assert!(!client.has_session());
    }

    #[tokio::test]
    async fn test_login_without_session_cookie() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/login/");
                then.status(200).body(r#"{"success":true}"#);
            })
            .await;

        let mut client = client_for(&server);
        let err = client.establish_session().await.unwrap_err();
        assert!(matches!(err, PanelError::MissingSessionCookie(name) if name == "session"));
    }

    #[tokio::test]
    async fn test_login_server_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/login/");
                then.status(500);
            })
            .await;

        let mut client = client_for(&server);
        let err = client.establish_session().await.unwrap_err();
        assert!(matches!(err, PanelError::Status(StatusCode::INTERNAL_SERVER_ERROR)));
        assert!(!client.has_session());
    }

    #[tokio::test]
    async fn test_login_unreachable_panel() {
        let config = PanelConfig::new("http://127.0.0.1:1", "admin".to_owned(), "secret".to_owned());
        let mut client = PanelClient::new(config).unwrap();
        assert!(!client.login().await);
    }

    #[tokio::test]
    async fn test_login_timeout_reports_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/login/");
                then.status(200)
                    .header("set-cookie", "session=late; Path=/")
                    .body(r#"{"success":true}"#)
                    .delay(Duration::from_secs(2));
            })
            .await;

        let mut config = PanelConfig::new(&server.base_url(), "admin".to_owned(), "secret".to_owned());
        config.login_timeout_secs = 1;
        let mut client = PanelClient::new(config).unwrap();

        let err = client.establish_session().await.unwrap_err();
        assert!(matches!(err, PanelError::Timeout));
        assert!(!client.login().await);
        assert!(!client.has_session());
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/login/");
                then.status(200)
                    .header("set-cookie", "session=tok; Path=/")
                    .body(r#"{"success":true}"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/xui/inbound/list");
                then.status(200).body(LIST_BODY).delay(Duration::from_secs(2));
            })
            .await;

        let mut config = PanelConfig::new(&server.base_url(), "admin".to_owned(), "secret".to_owned());
        config.fetch_timeout_secs = 1;
        let mut client = PanelClient::new(config).unwrap();
        assert!(client.login().await);

        let err = client.fetch_inbounds().await.unwrap_err();
        assert!(matches!(err, PanelError::Timeout));
        assert!(!err.is_session_rejection());
    }

    #[tokio::test]
    async fn test_fetch_without_session() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);
        let err = client.fetch_inbounds().await.unwrap_err();
        assert!(matches!(err, PanelError::NotLoggedIn));
    }

    #[tokio::test]
    async fn test_fetch_sends_session_cookie() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/login/");
                then.status(200)
                    .header("set-cookie", "session=tok123; Path=/")
                    .body(r#"{"success":true}"#);
            })
            .await;
        let list = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/xui/inbound/list")
                    .header("cookie", "session=tok123");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(LIST_BODY);
            })
            .await;

        let mut client = client_for(&server);
        assert!(client.login().await);

        let inbounds = client.fetch_inbounds().await.unwrap();
        assert_eq!(inbounds.len(), 1);
        assert_eq!(inbounds[0].port, 443);
        list.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_rejected_is_session_rejection() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/login/");
                then.status(200)
                    .header("set-cookie", "session=old; Path=/")
                    .body(r#"{"success":true}"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/xui/inbound/list");
                then.status(200).body(r#"{"success":false,"msg":"session expired"}"#);
            })
            .await;

        let mut client = client_for(&server);
        assert!(client.login().await);

        let err = client.fetch_inbounds().await.unwrap_err();
        assert!(err.is_session_rejection());
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/login/");
                then.status(200)
                    .header("set-cookie", "session=tok; Path=/")
                    .body(r#"{"success":true}"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/xui/inbound/list");
                then.status(200).body("<html>login</html>");
            })
            .await;

        let mut client = client_for(&server);
        assert!(client.login().await);

        let err = client.fetch_inbounds().await.unwrap_err();
        assert!(matches!(err, PanelError::Decode(_)));
        assert!(!err.is_session_rejection());
    }
}
