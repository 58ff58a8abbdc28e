// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! `CalDAV` (RFC 4791) and `CardDAV` (RFC 6352) protocol client.
//!
//! A [`DavConnector`] is configured once and consumed by
//! [`begin`](DavConnector::begin), which authenticates against the server,
//! probes its capabilities, and hands back a connected [`DavClient`]. On
//! top of the client sit [`CalendarStore`] and [`AddressBookStore`], which
//! discover the account's home collections and expose [`Collection`]
//! handles for object access.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use davbridge_client::{
//!     CalendarStore, Credentials, DavConfig, DavConnector, GenericResolver,
//! };
//!
//! # async fn run() -> Result<(), davbridge_client::DavError> {
//! let config = DavConfig::new("https://dav.example.com/");
//! let credentials = Credentials::UserPassword {
//!     username: "alice".to_string(),
//!     password: "secret".to_string(),
//! };
//! let (client, features) = DavConnector::new(config).begin(credentials).await?;
//! println!("server speaks: {features:?}");
//!
//! let store = CalendarStore::new(client, Arc::new(GenericResolver));
//! for calendar in store.collections().await? {
//!     println!("{} {:?}", calendar.path(), calendar.display_name());
//! }
//! # Ok(())
//! # }
//! ```

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

mod auth;
mod client;
mod collection;
mod config;
mod discovery;
mod error;
mod interpret;
mod locator;
mod session;
mod store;

pub use crate::client::{DavClient, DavConnector, DavFeature, Precondition, Principal};
pub use crate::collection::{Collection, DavObject, ObjectSummary};
pub use crate::config::{AuthScheme, Credentials, DavConfig};
pub use crate::discovery::{
    Delegation, DelegationAccess, HomeSet, ScheduleUrls, current_user_principal,
    delegated_principals, find_home_set, list_collections, schedule_urls,
};
pub use crate::error::DavError;
pub use crate::locator::{BaikalResolver, GenericResolver, PathResolver, RadicaleResolver};
pub use crate::store::{AddressBookStore, CalendarStore, CollectionProperties, StoreKind};

/// The XML vocabulary crate, re-exported for building requests and reading
/// responses without a separate dependency declaration.
pub use davbridge_xml as xml;

pub use davbridge_xml::{
    CalendarQueryRequest, Depth, ETag, Href, MkCalendarRequest, MkColRequest, MultiGetRequest,
    PrincipalPropertySearchRequest, PropFindMode, PropertyName, PropertySet,
    PropertyUpdateRequest, ResourceKind,
};
