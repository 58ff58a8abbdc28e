// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

/// Errors from building or parsing WebDAV XML documents.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// Low-level XML read/write error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document is not valid UTF-8 or otherwise malformed.
    #[error("malformed XML: {0}")]
    Malformed(String),

    /// The document ended inside an open element.
    #[error("unexpected end of document")]
    UnexpectedEof,

    /// The document is well-formed XML but not the expected DAV structure.
    #[error("unexpected document structure: {0}")]
    UnexpectedStructure(&'static str),

    /// A status line could not be parsed.
    #[error("invalid status line: {0:?}")]
    InvalidStatus(String),
}

impl From<std::io::Error> for XmlError {
    fn from(err: std::io::Error) -> Self {
        Self::Xml(quick_xml::Error::from(err))
    }
}

impl From<quick_xml::encoding::EncodingError> for XmlError {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        Self::Xml(quick_xml::Error::from(err))
    }
}
