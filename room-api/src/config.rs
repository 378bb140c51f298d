//! Configuration for the HTTP room client
//!
//! The request timeout configured here is the only bound on how long a room
//! request may take; sessions built on top never add a timeout of their own.

use std::time::Duration;

/// Environment variable holding the backend base URL
pub const API_URL_ENV: &str = "ROOM_API_URL";

/// Environment variable holding a session cookie (`name=value`)
pub const API_COOKIE_ENV: &str = "ROOM_API_COOKIE";

/// Configuration for [`HttpRoomClient`](crate::HttpRoomClient)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, without the `/rooms` path
    /// Default: http://localhost:8080
    pub base_url: String,

    /// Timeout for establishing a connection
    /// Default: 5 seconds
    pub connect_timeout: Duration,

    /// Timeout for a whole request, including the body
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// Session cookie sent with every request, when the login flow happened elsewhere
    /// Default: none
    pub session_cookie: Option<String>,

    /// User agent header
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            session_cookie: None,
            user_agent: format!("shared-playlist/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `ROOM_API_URL` and `ROOM_API_COOKIE` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }
        if let Ok(cookie) = std::env::var(API_COOKIE_ENV) {
            if !cookie.trim().is_empty() {
                config.session_cookie = Some(cookie.trim().to_string());
            }
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }
}
