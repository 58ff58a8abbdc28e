// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

use davbridge_xml::{Href, XmlError};

/// DAV client errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DavError {
    /// Network-level fault (connection refused, timeout, DNS, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server response could not be parsed as WebDAV XML.
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// A DAV method returned a status its success predicate rejects.
    #[error("operation failed with {status} {reason}")]
    FailedOperation {
        /// HTTP status code.
        status: u16,
        /// Reason phrase, empty if the server sent none.
        reason: String,
    },

    /// A well-formed response shows the resource or property does not
    /// exist. Distinct from a protocol failure; callers may react to it
    /// (e.g. by creating the resource).
    #[error("resource not found: {0}")]
    NotFound(Href),

    /// Explicit capability gap. No network call was made.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// A challenge could not be satisfied with the configured credentials
    /// and scheme preferences.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Invalid configuration or client construction failure.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DavError {
    /// Failed-operation error from a response status line.
    pub(crate) fn failed(status: reqwest::StatusCode) -> Self {
        Self::FailedOperation {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }
}
