// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP authentication: Basic headers and Digest challenge handling
//! (RFC 7616, MD5 with `qop=auth`).

use base64::Engine as _;

use crate::config::AuthScheme;
use crate::error::DavError;

/// `Authorization` header value for Basic authentication.
pub(crate) fn basic_authorization(username: &str, password: &str) -> String {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}

/// First `WWW-Authenticate` value whose scheme matches, case-insensitively.
pub(crate) fn find_challenge<'a>(offered: &'a [String], scheme: AuthScheme) -> Option<&'a str> {
    let prefix = match scheme {
        AuthScheme::Digest => "Digest",
        AuthScheme::Basic => "Basic",
    };
    offered.iter().map(String::as_str).find(|value| {
        value
            .split_whitespace()
            .next()
            .unwrap_or("")
            .eq_ignore_ascii_case(prefix)
    })
}

/// Parsed fields of a `WWW-Authenticate: Digest` challenge.
#[derive(Debug, Clone)]
pub(crate) struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    pub qop: Option<String>,
    pub algorithm: Option<String>,
}

impl DigestChallenge {
    /// Parses a challenge header value. `realm` and `nonce` are required.
    pub fn parse(header: &str) -> Result<Self, DavError> {
        let (scheme, params) = header
            .split_once(char::is_whitespace)
            .ok_or_else(|| DavError::Auth(format!("malformed digest challenge: {header}")))?;
        if !scheme.eq_ignore_ascii_case("Digest") {
            return Err(DavError::Auth(format!("not a digest challenge: {scheme}")));
        }

        let mut realm = None;
        let mut nonce = None;
        let mut opaque = None;
        let mut qop = None;
        let mut algorithm = None;
        for (key, value) in challenge_params(params) {
            match key.as_str() {
                "realm" => realm = Some(value),
                "nonce" => nonce = Some(value),
                "opaque" => opaque = Some(value),
                "qop" => qop = Some(value),
                "algorithm" => algorithm = Some(value),
                _ => {}
            }
        }

        Ok(Self {
            realm: realm.ok_or_else(|| DavError::Auth("digest challenge without realm".into()))?,
            nonce: nonce.ok_or_else(|| DavError::Auth("digest challenge without nonce".into()))?,
            opaque,
            qop,
            algorithm,
        })
    }
}

/// Splits `key="value", key=value, …` pairs; quoted values may contain commas.
fn challenge_params(input: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut rest = input.trim_start_matches([',', ' ']);
    while !rest.is_empty() {
        let Some((key, after)) = rest.split_once('=') else {
            break;
        };
        let key = key.trim().to_ascii_lowercase();
        let after = after.trim_start();
        if let Some(quoted) = after.strip_prefix('"') {
            let (value, tail) = quoted.split_once('"').unwrap_or((quoted, ""));
            params.push((key, value.to_string()));
            rest = tail.trim_start_matches([',', ' ']);
        } else {
            let (value, tail) = after.split_once(',').unwrap_or((after, ""));
            params.push((key, value.trim().to_string()));
            rest = tail.trim_start_matches([',', ' ']);
        }
    }
    params
}

/// Session-cached digest state. Reuses the server nonce across requests,
/// incrementing the nonce count each time.
#[derive(Debug)]
pub(crate) struct DigestState {
    challenge: DigestChallenge,
    nc: u32,
}

impl DigestState {
    pub fn new(challenge: DigestChallenge) -> Self {
        Self { challenge, nc: 0 }
    }

    /// `Authorization` header value for one request. Bumps the nonce count.
    pub fn authorization(
        &mut self,
        method: &str,
        uri: &str,
        username: &str,
        password: &str,
    ) -> Result<String, DavError> {
        if let Some(algorithm) = &self.challenge.algorithm {
            if !algorithm.eq_ignore_ascii_case("MD5") {
                return Err(DavError::Auth(format!(
                    "unsupported digest algorithm: {algorithm}"
                )));
            }
        }
        let qop = match self.challenge.qop.as_deref() {
            None => None,
            Some(offered) if offered.split(',').any(|q| q.trim() == "auth") => Some("auth"),
            Some(offered) => {
                return Err(DavError::Auth(format!(
                    "unsupported digest qop: {offered}"
                )));
            }
        };

        self.nc += 1;
        let cnonce = uuid::Uuid::new_v4().simple().to_string();
        let response = digest_response(
            username,
            &self.challenge.realm,
            password,
            method,
            uri,
            &self.challenge.nonce,
            self.nc,
            &cnonce,
            qop,
        );

        let mut header = format!(
            "Digest username=\"{username}\", realm=\"{realm}\", nonce=\"{nonce}\"",
            realm = self.challenge.realm,
            nonce = self.challenge.nonce,
        );
        header.push_str(&format!(", uri=\"{uri}\", response=\"{response}\""));
        if qop.is_some() {
            header.push_str(&format!(
                ", qop=auth, nc={nc:08x}, cnonce=\"{cnonce}\"",
                nc = self.nc
            ));
        }
        if let Some(opaque) = &self.challenge.opaque {
            header.push_str(&format!(", opaque=\"{opaque}\""));
        }
        if self.challenge.algorithm.is_some() {
            header.push_str(", algorithm=MD5");
        }
        Ok(header)
    }
}

/// RFC 7616 response digest. Without a qop the legacy RFC 2069 form is used.
#[allow(clippy::too_many_arguments)]
fn digest_response(
    username: &str,
    realm: &str,
    password: &str,
    method: &str,
    uri: &str,
    nonce: &str,
    nc: u32,
    cnonce: &str,
    qop: Option<&str>,
) -> String {
    let ha1 = md5_hex(&format!("{username}:{realm}:{password}"));
    let ha2 = md5_hex(&format!("{method}:{uri}"));
    match qop {
        Some(qop) => md5_hex(&format!("{ha1}:{nonce}:{nc:08x}:{cnonce}:{qop}:{ha2}")),
        None => md5_hex(&format!("{ha1}:{nonce}:{ha2}")),
    }
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}
