// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::Deref;

use crate::error::XmlError;

/// Resource href (path).
///
/// A `Href` is the path of a resource on a DAV server, such as
/// `/calendars/alice/work/meeting.ics` or `/principals/users/alice/`.
/// It is kept exactly as the server sent it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Href(String);

impl Href {
    /// Creates a new `Href` from a string.
    #[must_use]
    pub const fn new(href: String) -> Self {
        Self(href)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Href {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Href {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Href {
    fn from(href: String) -> Self {
        Self(href)
    }
}

impl From<&str> for Href {
    fn from(href: &str) -> Self {
        Self(href.to_string())
    }
}

/// Entity tag for change detection.
///
/// An `ETag` is the entity tag a DAV server assigns to one revision of a
/// resource, used for conditional requests and change detection. The value
/// includes the surrounding quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ETag(String);

impl ETag {
    /// Creates a new `ETag` from a string.
    #[must_use]
    pub const fn new(etag: String) -> Self {
        Self(etag)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ETag {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ETag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ETag {
    fn from(etag: String) -> Self {
        Self(etag)
    }
}

impl From<&str> for ETag {
    fn from(etag: &str) -> Self {
        Self(etag.to_string())
    }
}

/// Value of the `Depth` request header (RFC 4918 section 10.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    /// The resource itself only.
    #[default]
    Zero,
    /// The resource and its direct members.
    One,
    /// The resource and all members, recursively.
    Infinity,
}

impl Depth {
    /// Returns the header value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
            Self::Infinity => "infinity",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed status line from a multi-status document.
///
/// Multi-status bodies carry status lines such as `HTTP/1.1 404 Not Found`
/// per propstat group. Parsing them into a numeric code lets callers tell a
/// missing property (404) from a returned one (200) instead of matching on
/// substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// HTTP status code.
    pub code: u16,
    /// Reason phrase, possibly empty.
    pub reason: String,
}

impl Status {
    /// Parses a status line, with or without the `HTTP/x.y` prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if no numeric status code is found.
    pub fn parse(line: &str) -> Result<Self, XmlError> {
        let mut parts = line.split_whitespace();
        let first = parts
            .next()
            .ok_or_else(|| XmlError::InvalidStatus(line.to_string()))?;
        let code = if first.starts_with("HTTP/") {
            parts
                .next()
                .ok_or_else(|| XmlError::InvalidStatus(line.to_string()))?
        } else {
            first
        };
        let code = code
            .parse::<u16>()
            .map_err(|_| XmlError::InvalidStatus(line.to_string()))?;
        let reason = parts.collect::<Vec<_>>().join(" ");
        Ok(Self { code, reason })
    }

    /// Whether the code is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, self.reason)
        }
    }
}
