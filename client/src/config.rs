// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

/// DAV server configuration.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DavConfig {
    /// Base URL of the DAV server, e.g. `https://dav.example.com/`.
    pub base_url: String,

    /// Principal identifier used for path resolution, usually a username.
    ///
    /// When unset the session username is used, and when that is also
    /// absent the principal is discovered from the server
    /// (`DAV:current-user-principal`).
    #[serde(default)]
    pub principal: Option<String>,

    /// Scheme preference order for answering `401` challenges.
    #[serde(default = "default_auth_preference")]
    pub auth_preference: Vec<AuthScheme>,

    /// Send Basic credentials before any challenge is seen.
    #[serde(default = "default_preemptive_auth")]
    pub preemptive_auth: bool,

    /// Follow HTTP redirects instead of surfacing 3xx statuses.
    #[serde(default)]
    pub follow_redirects: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl DavConfig {
    /// Configuration for a server at `base_url` with all defaults.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for DavConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            principal: None,
            auth_preference: default_auth_preference(),
            preemptive_auth: default_preemptive_auth(),
            follow_redirects: false,
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_auth_preference() -> Vec<AuthScheme> {
    vec![AuthScheme::Digest, AuthScheme::Basic]
}

const fn default_preemptive_auth() -> bool {
    true
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("davbridge-client/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Challenge-answerable authentication schemes, used in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
pub enum AuthScheme {
    /// HTTP Digest (RFC 7616, MD5 with `qop=auth`).
    #[serde(rename = "digest")]
    Digest,
    /// HTTP Basic.
    #[serde(rename = "basic")]
    Basic,
}

/// Client credentials, consumed when a session begins.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(tag = "type")]
pub enum Credentials {
    /// No authentication.
    #[serde(rename = "none")]
    #[default]
    None,
    /// Username and password, negotiated per [`AuthScheme`] preference.
    #[serde(rename = "user-password")]
    UserPassword {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
    /// Static bearer token, sent on every request.
    #[serde(rename = "bearer")]
    Bearer {
        /// OAuth bearer token.
        token: String,
    },
}
