// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Authenticated HTTP session shared by all operations of one client.

use std::sync::{Mutex, PoisonError};

use davbridge_xml::ETag;
use reqwest::header::{AUTHORIZATION, ETAG, HeaderMap, WWW_AUTHENTICATE};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::auth::{self, DigestChallenge, DigestState};
use crate::config::{AuthScheme, Credentials, DavConfig};
use crate::error::DavError;

/// One request about to be sent. Headers are appended in order; repeated
/// names are sent as repeated headers.
#[derive(Debug)]
pub(crate) struct DavRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl DavRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Attaches an XML document body.
    pub fn xml_body(self, xml: String) -> Self {
        self.raw_body(xml, "application/xml; charset=utf-8")
    }

    pub fn raw_body(mut self, body: String, content_type: &str) -> Self {
        self.headers.push(("Content-Type", content_type.to_string()));
        self.body = Some(body);
        self
    }

    /// Request-URI as used in digest computations: path plus query.
    fn request_uri(&self) -> String {
        let path = self.url.path();
        match self.url.query() {
            Some(query) => format!("{path}?{query}"),
            None => path.to_string(),
        }
    }
}

/// A completed exchange: status, headers, and the full response body.
#[derive(Debug)]
pub(crate) struct DavResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl DavResponse {
    /// Entity tag from the response headers.
    pub fn etag(&self) -> Option<ETag> {
        self.headers
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(|value| ETag::new(value.to_string()))
    }

    fn challenges(&self) -> Vec<String> {
        self.headers
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect()
    }
}

/// Connection state behind a client: the HTTP connection pool, the server
/// endpoint, and credential state for answering challenges.
#[derive(Debug)]
pub(crate) struct Session {
    http: reqwest::Client,
    endpoint: Url,
    credentials: Credentials,
    preference: Vec<AuthScheme>,
    preemptive: bool,
    digest: Mutex<Option<DigestState>>,
}

impl Session {
    pub fn new(config: &DavConfig, credentials: Credentials) -> Result<Self, DavError> {
        let endpoint = Url::parse(&config.base_url)
            .map_err(|e| DavError::Config(format!("invalid base URL: {e}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(DavError::Config(format!(
                "unsupported URL scheme: {}",
                endpoint.scheme()
            )));
        }

        let mut builder = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent);
        if !config.follow_redirects {
            builder = builder.redirect(reqwest::redirect::Policy::none());
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            endpoint,
            credentials,
            preference: config.auth_preference.clone(),
            preemptive: config.preemptive_auth,
            digest: Mutex::new(None),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Username of the configured credentials, if they carry one.
    pub fn username(&self) -> Option<&str> {
        match &self.credentials {
            Credentials::UserPassword { username, .. } => Some(username),
            Credentials::None | Credentials::Bearer { .. } => None,
        }
    }

    /// Resolves a resource path against the session endpoint. Absolute
    /// `http(s)` URLs pass through unchanged.
    pub fn url_for(&self, path: &str) -> Result<Url, DavError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Url::parse(path)
                .map_err(|e| DavError::Config(format!("invalid resource URL: {e}")));
        }
        self.endpoint
            .join(path)
            .map_err(|e| DavError::Config(format!("invalid resource path: {e}")))
    }

    /// Sends a request, answering at most one `401` challenge.
    ///
    /// With user-password credentials the first attempt carries cached
    /// digest state when present, otherwise preemptive Basic when enabled.
    /// On a `401` the first offered scheme matching the preference order is
    /// answered and the request retried exactly once; the retry outcome is
    /// returned as-is.
    pub async fn send(&self, request: DavRequest) -> Result<DavResponse, DavError> {
        let authorization = self.initial_authorization(&request)?;
        let response = self.execute(&request, authorization.as_deref()).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Credentials::UserPassword { username, password } = &self.credentials else {
            return Ok(response);
        };
        let offered = response.challenges();
        tracing::debug!(
            url = %request.url,
            offered = offered.len(),
            "answering authentication challenge"
        );
        let answer = self.answer_challenge(&request, &offered, username, password)?;
        self.execute(&request, Some(&answer)).await
    }

    /// Authorization header for the first attempt, before any challenge.
    fn initial_authorization(&self, request: &DavRequest) -> Result<Option<String>, DavError> {
        match &self.credentials {
            Credentials::None => Ok(None),
            Credentials::Bearer { token } => Ok(Some(format!("Bearer {token}"))),
            Credentials::UserPassword { username, password } => {
                let mut digest = self.digest.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(state) = digest.as_mut() {
                    let header = state.authorization(
                        request.method.as_str(),
                        &request.request_uri(),
                        username,
                        password,
                    )?;
                    return Ok(Some(header));
                }
                drop(digest);
                if self.preemptive {
                    Ok(Some(auth::basic_authorization(username, password)))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Picks the first preferred scheme the server offered and computes the
    /// header for it. A successful digest answer is cached for later
    /// requests.
    fn answer_challenge(
        &self,
        request: &DavRequest,
        offered: &[String],
        username: &str,
        password: &str,
    ) -> Result<String, DavError> {
        for scheme in &self.preference {
            let Some(challenge) = auth::find_challenge(offered, *scheme) else {
                continue;
            };
            match scheme {
                AuthScheme::Basic => return Ok(auth::basic_authorization(username, password)),
                AuthScheme::Digest => {
                    let mut state = DigestState::new(DigestChallenge::parse(challenge)?);
                    let header = state.authorization(
                        request.method.as_str(),
                        &request.request_uri(),
                        username,
                        password,
                    )?;
                    *self.digest.lock().unwrap_or_else(PoisonError::into_inner) = Some(state);
                    return Ok(header);
                }
            }
        }
        Err(DavError::Auth(
            "server offered no acceptable authentication scheme".to_string(),
        ))
    }

    async fn execute(
        &self,
        request: &DavRequest,
        authorization: Option<&str>,
    ) -> Result<DavResponse, DavError> {
        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone());
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        tracing::trace!(method = %request.method, url = %request.url, "sending request");
        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        tracing::trace!(status = %status, bytes = body.len(), "received response");
        Ok(DavResponse {
            status,
            headers,
            body,
        })
    }
}
