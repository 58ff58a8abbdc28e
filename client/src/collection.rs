// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! A collection handle: cached properties plus the object operations
//! scoped to one calendar or address book.

use davbridge_xml::{
    CalendarQueryRequest, Depth, ETag, FreeBusyQueryRequest, Href, MultiGetRequest, MultiStatus,
    PropFindMode, PropertySet, props,
};

use crate::client::{DavClient, Precondition};
use crate::error::DavError;
use crate::interpret;
use crate::store::StoreKind;

/// A calendar or address-book collection on the server.
///
/// Carries the properties fetched when the handle was created; they are a
/// snapshot, refreshed explicitly with [`refresh`](Collection::refresh).
#[derive(Debug, Clone)]
pub struct Collection {
    client: DavClient,
    kind: StoreKind,
    path: Href,
    properties: PropertySet,
}

/// Summary of one member object, from a collection listing.
#[derive(Debug, Clone)]
pub struct ObjectSummary {
    /// Object path.
    pub href: Href,
    /// Entity tag, if the server reported one.
    pub etag: Option<ETag>,
    /// Content type, if the server reported one.
    pub content_type: Option<String>,
}

/// A fetched object: the serialized iCalendar or vCard body plus the
/// entity tag it was fetched at.
#[derive(Debug, Clone)]
pub struct DavObject {
    /// Object path.
    pub href: Href,
    /// Entity tag at fetch time, if reported.
    pub etag: Option<ETag>,
    /// Serialized object body.
    pub data: String,
}

impl Collection {
    pub(crate) fn new(
        client: DavClient,
        kind: StoreKind,
        path: Href,
        properties: PropertySet,
    ) -> Self {
        Self {
            client,
            kind,
            path,
            properties,
        }
    }

    /// Collection path on the server.
    #[must_use]
    pub fn path(&self) -> &Href {
        &self.path
    }

    /// Store kind this collection belongs to.
    #[must_use]
    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    /// `DAV:displayname`, from the cached properties.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.properties.text(&props::DISPLAY_NAME)
    }

    /// Collection description, from the cached properties.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.properties.text(&self.kind.description_property())
    }

    /// Collection tag for cheap change detection, from the cached
    /// properties.
    #[must_use]
    pub fn ctag(&self) -> Option<&str> {
        self.properties.text(&props::GET_CTAG)
    }

    /// Component types the collection accepts (`VEVENT`, `VTODO`, ...).
    /// Empty for address books and servers that do not advertise the set.
    #[must_use]
    pub fn supported_components(&self) -> &[String] {
        self.properties
            .components(&props::SUPPORTED_CALENDAR_COMPONENT_SET)
    }

    /// All cached properties.
    #[must_use]
    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    /// Re-fetches the cached properties from the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub async fn refresh(&mut self) -> Result<(), DavError> {
        self.properties = self
            .client
            .prop_find(self.path.as_str(), self.kind.collection_properties())
            .await?;
        Ok(())
    }

    /// Lists the member objects with their entity tags (PROPFIND, depth 1).
    /// Sub-collections and the collection itself are excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be listed.
    pub async fn objects(&self) -> Result<Vec<ObjectSummary>, DavError> {
        let entries = self
            .client
            .prop_find_mode(
                self.path.as_str(),
                Depth::One,
                PropFindMode::Prop(vec![
                    props::GET_ETAG,
                    props::GET_CONTENT_TYPE,
                    props::RESOURCE_TYPE,
                ]),
            )
            .await?;
        Ok(entries
            .into_iter()
            .filter(|(href, properties)| {
                !interpret::same_resource(href.as_str(), self.path.as_str())
                    && properties.resource_kinds().is_empty()
            })
            .map(|(href, properties)| ObjectSummary {
                href,
                etag: properties.etag(),
                content_type: properties
                    .text(&props::GET_CONTENT_TYPE)
                    .map(str::to_string),
            })
            .collect())
    }

    /// Fetches one object by name.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::NotFound`] when the object does not exist.
    pub async fn object(&self, name: &str) -> Result<DavObject, DavError> {
        let path = self.object_path(name);
        let (data, etag) = self
            .client
            .get(&path, Some(self.kind.content_type()))
            .await?;
        Ok(DavObject {
            href: Href::new(path),
            etag,
            data,
        })
    }

    /// Stores an object body. Without an `etag` the write is guarded
    /// against overwriting an existing object (`If-None-Match: *`); with
    /// one it is guarded against concurrent modification (`If-Match`).
    ///
    /// Returns the new entity tag when the server reports one; servers
    /// that rewrite bodies on import do not.
    ///
    /// # Errors
    ///
    /// A lost guard surfaces as [`DavError::FailedOperation`] with
    /// status 412.
    pub async fn put_object(
        &self,
        name: &str,
        body: impl Into<String>,
        etag: Option<&ETag>,
    ) -> Result<Option<ETag>, DavError> {
        let path = self.object_path(name);
        let precondition = match etag {
            Some(etag) => Precondition::Match(etag.clone()),
            None => Precondition::NotExists,
        };
        self.client
            .put(
                &path,
                body.into(),
                self.kind.content_type(),
                Some(&precondition),
            )
            .await
    }

    /// Deletes an object by name, optionally guarded by its entity tag.
    ///
    /// # Errors
    ///
    /// A lost guard surfaces as [`DavError::FailedOperation`] with
    /// status 412.
    pub async fn delete_object(&self, name: &str, etag: Option<&ETag>) -> Result<(), DavError> {
        let path = self.object_path(name);
        let precondition = etag.map(|etag| Precondition::Match(etag.clone()));
        self.client.delete(&path, precondition.as_ref()).await
    }

    /// Whether an object with this name exists (HEAD).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or unexpected statuses.
    pub async fn exists(&self, name: &str) -> Result<bool, DavError> {
        self.client.head(&self.object_path(name)).await
    }

    /// Runs a `calendar-query` REPORT against the collection and returns
    /// the matching objects with their data.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::Unsupported`] on address books.
    pub async fn calendar_query(
        &self,
        query: &CalendarQueryRequest,
    ) -> Result<Vec<DavObject>, DavError> {
        if self.kind != StoreKind::Calendar {
            return Err(DavError::Unsupported("calendar-query on an address book"));
        }
        let multi = self
            .client
            .report(self.path.as_str(), Depth::One, query.build()?)
            .await?;
        Ok(self.objects_with_data(multi))
    }

    /// Fetches several objects by name in one `multiget` REPORT. Names
    /// the server did not report back are absent from the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the report is rejected.
    pub async fn multiget(&self, names: &[String]) -> Result<Vec<DavObject>, DavError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let mut request = match self.kind {
            StoreKind::Calendar => MultiGetRequest::calendar(),
            StoreKind::AddressBook => MultiGetRequest::address_book(),
        };
        for name in names {
            request.add_href(self.object_path(name));
        }
        let multi = self
            .client
            .report(self.path.as_str(), Depth::One, request.build()?)
            .await?;
        Ok(self.objects_with_data(multi))
    }

    /// Runs a `free-busy-query` REPORT and returns the raw `VFREEBUSY`
    /// reply.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::Unsupported`] on address books.
    pub async fn free_busy_query(&self, start: &str, end: &str) -> Result<String, DavError> {
        if self.kind != StoreKind::Calendar {
            return Err(DavError::Unsupported("free-busy-query on an address book"));
        }
        let body = FreeBusyQueryRequest::new(start, end).build()?;
        self.client
            .report_raw(self.path.as_str(), Depth::One, body)
            .await
    }

    /// Deletes the collection on the server, consuming the handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the server refuses the delete.
    pub async fn delete(self) -> Result<(), DavError> {
        tracing::debug!(path = %self.path, "deleting collection");
        self.client.delete(self.path.as_str(), None).await
    }

    /// Path of a member object, from its name.
    fn object_path(&self, name: &str) -> String {
        let base = self.path.as_str().trim_end_matches('/');
        format!("{base}/{name}")
    }

    fn objects_with_data(&self, multi: MultiStatus) -> Vec<DavObject> {
        let data_property = self.kind.data_property();
        multi
            .responses
            .into_iter()
            .filter_map(|response| {
                let properties = response.ok_props();
                let data = properties.text(&data_property)?.to_string();
                let etag = properties.etag();
                Some(DavObject {
                    href: response.href,
                    etag,
                    data,
                })
            })
            .collect()
    }
}
