// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! WebDAV XML vocabulary shared by the davbridge crates: namespaced property
//! names, request body builders, and multi-status response parsing for
//! `CalDAV` (RFC 4791), `CardDAV` (RFC 6352) and scheduling (RFC 6638).
//!
//! This crate is pure data-in/data-out. It never touches the network; the
//! protocol client lives in `davbridge-client`.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(clippy::similar_names, clippy::single_match_else)]

mod error;
mod names;
mod request;
mod response;
mod types;

pub use crate::error::XmlError;
pub use crate::names::{PropertyName, ResourceKind, ns, props};
pub use crate::request::{
    CalendarQueryRequest, ExpandPropertyRequest, FreeBusyQueryRequest, MkCalendarRequest,
    MkColRequest, MultiGetRequest, PrincipalPropertySearchRequest, PropFindMode, PropFindRequest,
    PropertyChange, PropertyUpdateRequest,
};
pub use crate::response::{
    MultiStatus, PropStat, PropertySet, PropertyValue, Response, ScheduleResponse,
};
pub use crate::types::{Depth, ETag, Href, Status};
