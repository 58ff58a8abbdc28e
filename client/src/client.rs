// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! WebDAV method execution: the connector handshake and the transport
//! operations everything else is built from.

use std::fmt;
use std::sync::Arc;

use davbridge_xml::{
    Depth, ETag, Href, MkCalendarRequest, MkColRequest, MultiStatus, PrincipalPropertySearchRequest,
    PropFindMode, PropFindRequest, PropertyName, PropertySet, PropertyUpdateRequest, Response,
    ResourceKind, ScheduleResponse, props,
};
use reqwest::{Method, StatusCode};

use crate::config::{Credentials, DavConfig};
use crate::error::DavError;
use crate::interpret;
use crate::session::{DavRequest, DavResponse, Session};

/// Protocol features a server advertises in its `DAV` response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DavFeature {
    /// WebDAV class 1 (RFC 4918).
    Class1,
    /// WebDAV class 2, locking.
    Class2,
    /// WebDAV class 3.
    Class3,
    /// Access control (RFC 3744).
    AccessControl,
    /// `CalDAV` calendar access (RFC 4791).
    CalendarAccess,
    /// `CalDAV` scheduling (RFC 6638).
    CalendarSchedule,
    /// `CalDAV` automatic scheduling.
    CalendarAutoSchedule,
    /// CalendarServer proxy delegation.
    CalendarProxy,
    /// `CardDAV` address books (RFC 6352).
    Addressbook,
    /// Extended MKCOL (RFC 5689).
    ExtendedMkcol,
    /// Collection synchronization (RFC 6578).
    SyncCollection,
    /// A token this client has no name for.
    Other(String),
}

impl DavFeature {
    pub(crate) fn from_token(token: &str) -> Self {
        match token {
            "1" => Self::Class1,
            "2" => Self::Class2,
            "3" => Self::Class3,
            "access-control" => Self::AccessControl,
            "calendar-access" => Self::CalendarAccess,
            "calendar-schedule" => Self::CalendarSchedule,
            "calendar-auto-schedule" => Self::CalendarAutoSchedule,
            "calendar-proxy" => Self::CalendarProxy,
            "addressbook" => Self::Addressbook,
            "extended-mkcol" => Self::ExtendedMkcol,
            "sync-collection" => Self::SyncCollection,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DavFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Class1 => "1",
            Self::Class2 => "2",
            Self::Class3 => "3",
            Self::AccessControl => "access-control",
            Self::CalendarAccess => "calendar-access",
            Self::CalendarSchedule => "calendar-schedule",
            Self::CalendarAutoSchedule => "calendar-auto-schedule",
            Self::CalendarProxy => "calendar-proxy",
            Self::Addressbook => "addressbook",
            Self::ExtendedMkcol => "extended-mkcol",
            Self::SyncCollection => "sync-collection",
            Self::Other(token) => token,
        })
    }
}

/// DAV methods this client issues, with per-method success predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DavMethod {
    PropFind,
    PropPatch,
    Report,
    MkCalendar,
    MkCol,
    Put,
    Get,
    Head,
    Post,
    Copy,
    Move,
    Delete,
}

impl DavMethod {
    pub fn name(self) -> &'static str {
        match self {
            Self::PropFind => "PROPFIND",
            Self::PropPatch => "PROPPATCH",
            Self::Report => "REPORT",
            Self::MkCalendar => "MKCALENDAR",
            Self::MkCol => "MKCOL",
            Self::Put => "PUT",
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Copy => "COPY",
            Self::Move => "MOVE",
            Self::Delete => "DELETE",
        }
    }

    pub fn http(self) -> Result<Method, DavError> {
        match self {
            Self::Put => Ok(Method::PUT),
            Self::Get => Ok(Method::GET),
            Self::Head => Ok(Method::HEAD),
            Self::Post => Ok(Method::POST),
            Self::Delete => Ok(Method::DELETE),
            other => Method::from_bytes(other.name().as_bytes())
                .map_err(|e| DavError::Config(format!("invalid method: {e}"))),
        }
    }

    /// Whether a status counts as success for this method.
    pub fn is_success(self, status: StatusCode) -> bool {
        match self {
            Self::PropFind | Self::PropPatch | Self::Report => {
                matches!(status.as_u16(), 200 | 207)
            }
            Self::MkCalendar | Self::MkCol => status == StatusCode::CREATED,
            Self::Put => matches!(status.as_u16(), 200 | 201 | 204),
            Self::Get | Self::Head | Self::Post => status == StatusCode::OK,
            Self::Copy | Self::Move => matches!(status.as_u16(), 201 | 204),
            Self::Delete => matches!(status.as_u16(), 200 | 202 | 204),
        }
    }
}

/// Concurrency guard for writes (RFC 4918 preconditions).
#[derive(Debug, Clone)]
pub enum Precondition {
    /// Apply only if the server copy still carries this entity tag.
    Match(ETag),
    /// Apply only if the resource does not exist yet.
    NotExists,
}

impl Precondition {
    pub(crate) fn header(&self) -> (&'static str, String) {
        match self {
            Self::Match(etag) => ("If-Match", etag.as_str().to_string()),
            Self::NotExists => ("If-None-Match", "*".to_string()),
        }
    }
}

/// A principal matched by a principal search.
#[derive(Debug, Clone)]
pub struct Principal {
    /// Principal resource path.
    pub href: Href,
    /// Display name, if the server reported one.
    pub display_name: Option<String>,
    /// Calendar user addresses (`mailto:` or principal URLs).
    pub addresses: Vec<Href>,
    /// Calendar user type (`INDIVIDUAL`, `ROOM`, ...).
    pub user_type: Option<String>,
}

/// A configured but not yet connected client.
///
/// [`begin`](DavConnector::begin) consumes the connector, fixes the
/// credentials for the lifetime of the session, and probes the server. A
/// connector cannot be reused; build a new one to reconnect.
#[derive(Debug)]
pub struct DavConnector {
    config: DavConfig,
}

impl DavConnector {
    /// Creates a connector for the given configuration.
    #[must_use]
    pub const fn new(config: DavConfig) -> Self {
        Self { config }
    }

    /// Opens the session and probes server capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the server is
    /// unreachable, or the capability probe is rejected.
    pub async fn begin(
        self,
        credentials: Credentials,
    ) -> Result<(DavClient, Vec<DavFeature>), DavError> {
        let session = Session::new(&self.config, credentials)?;
        let client = DavClient {
            session: Arc::new(session),
            config: self.config,
        };
        let features = client.supported_features().await?;
        tracing::debug!(features = features.len(), "session established");
        Ok((client, features))
    }
}

/// Connected DAV client.
///
/// Cheap to clone; clones share the HTTP connection pool and cached
/// authentication state.
#[derive(Debug, Clone)]
pub struct DavClient {
    session: Arc<Session>,
    config: DavConfig,
}

impl DavClient {
    pub(crate) fn configured_principal(&self) -> Option<&str> {
        self.config.principal.as_deref()
    }

    pub(crate) fn username(&self) -> Option<&str> {
        self.session.username()
    }

    /// Path component of the configured base URL.
    pub(crate) fn endpoint_path(&self) -> String {
        self.session.endpoint().path().to_string()
    }

    fn dav_request(&self, method: DavMethod, path: &str) -> Result<DavRequest, DavError> {
        let url = self.session.url_for(path)?;
        Ok(DavRequest::new(method.http()?, url))
    }

    async fn execute_checked(
        &self,
        method: DavMethod,
        request: DavRequest,
    ) -> Result<DavResponse, DavError> {
        let response = self.session.send(request).await?;
        if method.is_success(response.status) {
            Ok(response)
        } else {
            tracing::debug!(method = method.name(), status = %response.status, "operation failed");
            Err(DavError::failed(response.status))
        }
    }

    async fn execute_with<T>(
        &self,
        request: DavRequest,
        interpret: impl FnOnce(&DavResponse) -> Result<T, DavError>,
    ) -> Result<T, DavError> {
        let response = self.session.send(request).await?;
        interpret(&response)
    }

    /// Probes the base URL with a depth-0 PROPFIND and returns the protocol
    /// features advertised in the `DAV` response header.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe request itself is rejected.
    pub async fn supported_features(&self) -> Result<Vec<DavFeature>, DavError> {
        let body =
            PropFindRequest::properties([props::RESOURCE_TYPE, props::GET_CTAG, props::OWNER])
                .build()?;
        let request = DavRequest::new(DavMethod::PropFind.http()?, self.session.endpoint().clone())
            .header("Depth", Depth::Zero.as_str())
            .xml_body(body);
        let response = self.execute_checked(DavMethod::PropFind, request).await?;
        Ok(interpret::supported_features(&response))
    }

    /// Fetches named properties of a single resource (PROPFIND, depth 0).
    ///
    /// # Errors
    ///
    /// Returns [`DavError::NotFound`] when the multi-status carries no
    /// entry for the resource.
    pub async fn prop_find(
        &self,
        path: &str,
        names: impl IntoIterator<Item = PropertyName>,
    ) -> Result<PropertySet, DavError> {
        let body = PropFindRequest::properties(names).build()?;
        let request = self
            .dav_request(DavMethod::PropFind, path)?
            .header("Depth", Depth::Zero.as_str())
            .xml_body(body);
        let response = self.execute_checked(DavMethod::PropFind, request).await?;
        interpret::single_property_set(&response, path)
    }

    /// PROPFIND with an explicit depth and request mode, returning one
    /// property set per reported resource.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-multistatus reply.
    pub async fn prop_find_mode(
        &self,
        path: &str,
        depth: Depth,
        mode: PropFindMode,
    ) -> Result<Vec<(Href, PropertySet)>, DavError> {
        let builder = match mode {
            PropFindMode::Prop(names) => PropFindRequest::properties(names),
            PropFindMode::AllProp => PropFindRequest::allprop(),
            PropFindMode::PropName => PropFindRequest::propname(),
        };
        let request = self
            .dav_request(DavMethod::PropFind, path)?
            .header("Depth", depth.as_str())
            .xml_body(builder.build()?);
        let response = self.execute_checked(DavMethod::PropFind, request).await?;
        let multi = MultiStatus::parse(&response.body)?;
        Ok(interpret::properties_by_resource(&multi))
    }

    /// Lists the members of a collection that carry one of the wanted
    /// resource types (PROPFIND, depth 1).
    ///
    /// `DAV:resourcetype` is added to the requested properties when absent,
    /// since the filter needs it.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-multistatus reply.
    pub async fn prop_find_resources(
        &self,
        path: &str,
        names: impl IntoIterator<Item = PropertyName>,
        kinds: &[ResourceKind],
    ) -> Result<Vec<(Href, PropertySet)>, DavError> {
        let mut wanted: Vec<PropertyName> = names.into_iter().collect();
        if !wanted.contains(&props::RESOURCE_TYPE) {
            wanted.push(props::RESOURCE_TYPE);
        }
        let body = PropFindRequest::properties(wanted).build()?;
        let request = self
            .dav_request(DavMethod::PropFind, path)?
            .header("Depth", Depth::One.as_str())
            .xml_body(body);
        let response = self.execute_checked(DavMethod::PropFind, request).await?;
        interpret::resources_of_kind(&response, kinds)
    }

    /// Runs a REPORT and parses the multi-status reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the report is rejected or the reply is not a
    /// multi-status document.
    pub async fn report(
        &self,
        path: &str,
        depth: Depth,
        body: String,
    ) -> Result<MultiStatus, DavError> {
        let request = self
            .dav_request(DavMethod::Report, path)?
            .header("Depth", depth.as_str())
            .xml_body(body);
        self.execute_with(request, interpret::multi_status).await
    }

    /// Runs a REPORT and returns one property set per reported resource.
    ///
    /// # Errors
    ///
    /// Same conditions as [`report`](Self::report).
    pub async fn report_properties(
        &self,
        path: &str,
        depth: Depth,
        body: String,
    ) -> Result<Vec<(Href, PropertySet)>, DavError> {
        let multi = self.report(path, depth, body).await?;
        Ok(interpret::properties_by_resource(&multi))
    }

    /// Runs a REPORT that replies with a plain body instead of a
    /// multi-status document (`free-busy-query`).
    ///
    /// # Errors
    ///
    /// Returns an error if the report is rejected.
    pub async fn report_raw(
        &self,
        path: &str,
        depth: Depth,
        body: String,
    ) -> Result<String, DavError> {
        let request = self
            .dav_request(DavMethod::Report, path)?
            .header("Depth", depth.as_str())
            .xml_body(body);
        let response = self.execute_checked(DavMethod::Report, request).await?;
        Ok(response.body)
    }

    /// Creates a calendar collection (MKCALENDAR). An empty request is sent
    /// without a body.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers `201 Created`.
    pub async fn mk_calendar(
        &self,
        path: &str,
        request: &MkCalendarRequest,
    ) -> Result<(), DavError> {
        let mut dav = self.dav_request(DavMethod::MkCalendar, path)?;
        if !request.is_empty() {
            dav = dav.xml_body(request.build()?);
        }
        self.execute_checked(DavMethod::MkCalendar, dav).await?;
        Ok(())
    }

    /// Creates a collection with an extended MKCOL body (RFC 5689).
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers `201 Created`.
    pub async fn mk_col(&self, path: &str, request: &MkColRequest) -> Result<(), DavError> {
        let body = request.build()?;
        let dav = self.dav_request(DavMethod::MkCol, path)?.xml_body(body);
        self.execute_checked(DavMethod::MkCol, dav).await?;
        Ok(())
    }

    /// Plain MKCOL without a resource-type body.
    ///
    /// Not implemented by this client generation; fails without touching
    /// the network.
    ///
    /// # Errors
    ///
    /// Always returns [`DavError::Unsupported`].
    pub fn mk_col_plain(&self, _path: &str) -> Result<(), DavError> {
        Err(DavError::Unsupported("MKCOL without collection properties"))
    }

    /// Stores a resource body (PUT), optionally guarded by a precondition.
    /// Returns the new entity tag when the server reports one.
    ///
    /// # Errors
    ///
    /// A failed precondition surfaces as [`DavError::FailedOperation`]
    /// with status 412.
    pub async fn put(
        &self,
        path: &str,
        body: String,
        content_type: &str,
        precondition: Option<&Precondition>,
    ) -> Result<Option<ETag>, DavError> {
        let mut request = self
            .dav_request(DavMethod::Put, path)?
            .raw_body(body, content_type);
        if let Some(precondition) = precondition {
            let (name, value) = precondition.header();
            request = request.header(name, value);
        }
        let response = self.execute_checked(DavMethod::Put, request).await?;
        Ok(response.etag())
    }

    /// Fetches a resource body and its entity tag.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::NotFound`] on `404`.
    pub async fn get(
        &self,
        path: &str,
        accept: Option<&str>,
    ) -> Result<(String, Option<ETag>), DavError> {
        let mut request = self.dav_request(DavMethod::Get, path)?;
        if let Some(accept) = accept {
            request = request.header("Accept", accept.to_string());
        }
        let response = self.session.send(request).await?;
        if response.status == StatusCode::NOT_FOUND {
            return Err(DavError::NotFound(Href::from(path)));
        }
        if !DavMethod::Get.is_success(response.status) {
            return Err(DavError::failed(response.status));
        }
        let etag = response.etag();
        Ok((response.body, etag))
    }

    /// Whether a resource exists (HEAD). `404` means `false`; any other
    /// failure is an error.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or unexpected statuses.
    pub async fn head(&self, path: &str) -> Result<bool, DavError> {
        let request = self.dav_request(DavMethod::Head, path)?;
        let response = self.session.send(request).await?;
        match response.status {
            StatusCode::NOT_FOUND => Ok(false),
            status if DavMethod::Head.is_success(status) => Ok(true),
            status => Err(DavError::failed(status)),
        }
    }

    /// Copies a resource server-side (COPY).
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers `201` or `204`.
    pub async fn copy(
        &self,
        source: &str,
        destination: &str,
        overwrite: bool,
    ) -> Result<(), DavError> {
        let request = self.destination_request(DavMethod::Copy, source, destination, overwrite)?;
        self.execute_checked(DavMethod::Copy, request).await?;
        Ok(())
    }

    /// Moves a resource server-side (MOVE).
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers `201` or `204`.
    pub async fn move_resource(
        &self,
        source: &str,
        destination: &str,
        overwrite: bool,
    ) -> Result<(), DavError> {
        let request = self.destination_request(DavMethod::Move, source, destination, overwrite)?;
        self.execute_checked(DavMethod::Move, request).await?;
        Ok(())
    }

    fn destination_request(
        &self,
        method: DavMethod,
        source: &str,
        destination: &str,
        overwrite: bool,
    ) -> Result<DavRequest, DavError> {
        let destination = self.session.url_for(destination)?;
        Ok(self
            .dav_request(method, source)?
            .header("Destination", destination.to_string())
            .header("Overwrite", if overwrite { "T" } else { "F" }))
    }

    /// Deletes a resource, optionally guarded by a precondition.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers `200`, `202` or `204`.
    pub async fn delete(
        &self,
        path: &str,
        precondition: Option<&Precondition>,
    ) -> Result<(), DavError> {
        let mut request = self.dav_request(DavMethod::Delete, path)?;
        if let Some(precondition) = precondition {
            let (name, value) = precondition.header();
            request = request.header(name, value);
        }
        self.execute_checked(DavMethod::Delete, request).await?;
        Ok(())
    }

    /// Applies property changes (PROPPATCH) and returns the multi-status
    /// entry for the resource.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::NotFound`] when the reply carries no entry.
    pub async fn prop_patch(
        &self,
        path: &str,
        changes: &PropertyUpdateRequest,
    ) -> Result<Response, DavError> {
        let body = changes.build()?;
        let request = self
            .dav_request(DavMethod::PropPatch, path)?
            .xml_body(body);
        let response = self.execute_checked(DavMethod::PropPatch, request).await?;
        interpret::first_response(&response, path)
    }

    /// Searches principals by property match
    /// (`DAV:principal-property-search` REPORT).
    ///
    /// # Errors
    ///
    /// Returns an error if the report is rejected.
    pub async fn find_principals(
        &self,
        path: &str,
        search: &PrincipalPropertySearchRequest,
    ) -> Result<Vec<Principal>, DavError> {
        let request = self
            .dav_request(DavMethod::Report, path)?
            .header("Depth", Depth::Zero.as_str())
            .xml_body(search.build()?);
        self.execute_with(request, interpret::principals).await
    }

    /// Posts a free-busy request to a scheduling outbox (RFC 6638) and
    /// returns one response per recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the outbox rejects the request.
    pub async fn free_busy(
        &self,
        outbox: &str,
        ics: String,
        originator: &str,
        recipients: &[String],
    ) -> Result<Vec<ScheduleResponse>, DavError> {
        let mut request = self
            .dav_request(DavMethod::Post, outbox)?
            .raw_body(ics, "text/calendar; charset=utf-8")
            .header("Originator", originator.to_string());
        for recipient in recipients {
            request = request.header("Recipient", recipient.clone());
        }
        self.execute_with(request, interpret::schedule_responses)
            .await
    }
}
