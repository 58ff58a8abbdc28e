// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Stores tie discovery, path resolution and collection access together
//! for one account on one server.

use std::sync::Arc;

use davbridge_xml::{
    Href, MkCalendarRequest, MkColRequest, PropertyName, PropertySet, ResourceKind, props,
};

use crate::client::DavClient;
use crate::collection::Collection;
use crate::discovery::{self, HomeSet, ScheduleUrls};
use crate::error::DavError;
use crate::locator::PathResolver;

const DEFAULT_PROD_ID: &str = concat!("-//davbridge//client ", env!("CARGO_PKG_VERSION"), "//EN");

/// Which flavor of DAV store a handle works against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// `CalDAV` calendars.
    Calendar,
    /// `CardDAV` address books.
    AddressBook,
}

impl StoreKind {
    /// Home-set property advertised on principal resources.
    pub(crate) fn home_set_property(self) -> PropertyName {
        match self {
            Self::Calendar => props::CALENDAR_HOME_SET,
            Self::AddressBook => props::ADDRESSBOOK_HOME_SET,
        }
    }

    /// Resource type marking collections of this kind.
    pub(crate) fn resource_kind(self) -> ResourceKind {
        match self {
            Self::Calendar => ResourceKind::Calendar,
            Self::AddressBook => ResourceKind::AddressBook,
        }
    }

    /// Property carrying object data in REPORT replies.
    pub(crate) fn data_property(self) -> PropertyName {
        match self {
            Self::Calendar => props::CALENDAR_DATA,
            Self::AddressBook => props::ADDRESS_DATA,
        }
    }

    /// Description property of collections of this kind.
    pub(crate) fn description_property(self) -> PropertyName {
        match self {
            Self::Calendar => props::CALENDAR_DESCRIPTION,
            Self::AddressBook => props::ADDRESSBOOK_DESCRIPTION,
        }
    }

    /// Media type of member objects.
    pub(crate) const fn content_type(self) -> &'static str {
        match self {
            Self::Calendar => "text/calendar; charset=utf-8",
            Self::AddressBook => "text/vcard; charset=utf-8",
        }
    }

    /// Properties fetched for collection handles of this kind.
    pub(crate) fn collection_properties(self) -> Vec<PropertyName> {
        let mut names = vec![
            props::DISPLAY_NAME,
            props::RESOURCE_TYPE,
            props::GET_CTAG,
            self.description_property(),
        ];
        if self == Self::Calendar {
            names.push(props::SUPPORTED_CALENDAR_COMPONENT_SET);
        }
        names
    }
}

/// Initial properties for a new collection.
#[derive(Debug, Clone, Default)]
pub struct CollectionProperties {
    /// `DAV:displayname`.
    pub display_name: Option<String>,
    /// Collection description.
    pub description: Option<String>,
    /// iCalendar `VTIMEZONE` object. Calendars only; ignored for address
    /// books.
    pub timezone: Option<String>,
}

/// Shared store internals behind [`CalendarStore`] and
/// [`AddressBookStore`].
#[derive(Debug, Clone)]
struct DavStore {
    client: DavClient,
    resolver: Arc<dyn PathResolver>,
    kind: StoreKind,
    prod_id: String,
}

impl DavStore {
    fn new(client: DavClient, resolver: Arc<dyn PathResolver>, kind: StoreKind) -> Self {
        Self {
            client,
            resolver,
            kind,
            prod_id: DEFAULT_PROD_ID.to_string(),
        }
    }

    /// Principal path: the configured principal, the session username, or
    /// whatever the server reports for the authenticated user.
    async fn principal_path(&self) -> Result<String, DavError> {
        if let Some(principal) = self.client.configured_principal() {
            return Ok(self.resolver.principal_path(principal));
        }
        if let Some(username) = self.client.username() {
            return Ok(self.resolver.principal_path(username));
        }
        let href = discovery::current_user_principal(&self.client).await?;
        Ok(href.as_str().to_string())
    }

    async fn home(&self) -> Result<HomeSet, DavError> {
        let principal = self.principal_path().await?;
        discovery::find_home_set(&self.client, self.kind, &principal).await
    }

    async fn collection_path(&self, id: &str) -> Result<String, DavError> {
        let home = self.home().await?;
        Ok(self.resolver.collection_path(home.href.as_str(), id))
    }

    async fn add_collection(
        &self,
        id: &str,
        properties: &CollectionProperties,
    ) -> Result<Collection, DavError> {
        let path = self.collection_path(id).await?;
        tracing::debug!(path, kind = ?self.kind, "creating collection");
        match self.kind {
            StoreKind::Calendar => {
                let mut request = MkCalendarRequest::new();
                if let Some(name) = properties.display_name.as_deref() {
                    request = request.display_name(name);
                }
                if let Some(description) = properties.description.as_deref() {
                    request = request.description(description);
                }
                if let Some(timezone) = properties.timezone.as_deref() {
                    request = request.timezone(timezone);
                }
                self.client.mk_calendar(&path, &request).await?;
            }
            StoreKind::AddressBook => {
                let mut request = MkColRequest::address_book();
                if let Some(name) = properties.display_name.as_deref() {
                    request = request.display_name(name);
                }
                if let Some(description) = properties.description.as_deref() {
                    request = request.property(props::ADDRESSBOOK_DESCRIPTION, description);
                }
                self.client.mk_col(&path, &request).await?;
            }
        }
        // fresh collections start with an empty snapshot; refresh() fills it
        Ok(Collection::new(
            self.client.clone(),
            self.kind,
            Href::new(path),
            PropertySet::default(),
        ))
    }

    /// Fetches a collection handle by identifier. A reply without a
    /// matching entry, or one whose resource type does not carry the
    /// store's kind, is reported as not-found.
    async fn collection(&self, id: &str) -> Result<Collection, DavError> {
        let path = self.collection_path(id).await?;
        let properties = self
            .client
            .prop_find(&path, self.kind.collection_properties())
            .await?;
        if !properties.resource_kinds().contains(&self.kind.resource_kind()) {
            return Err(DavError::NotFound(Href::new(path)));
        }
        Ok(Collection::new(
            self.client.clone(),
            self.kind,
            Href::new(path),
            properties,
        ))
    }

    async fn collections(&self) -> Result<Vec<Collection>, DavError> {
        let home = self.home().await?;
        discovery::list_collections(&self.client, self.kind, home.href.as_str()).await
    }

    /// Collections other principals delegated to the session user.
    /// Delegates without a home set of this kind are skipped.
    async fn delegated_collections(&self) -> Result<Vec<Collection>, DavError> {
        let principal = self.principal_path().await?;
        let delegations = discovery::delegated_principals(&self.client, &principal).await?;
        let mut collections = Vec::new();
        for delegation in delegations {
            match discovery::find_home_set(&self.client, self.kind, delegation.principal.as_str())
                .await
            {
                Ok(home) => {
                    collections.extend(
                        discovery::list_collections(&self.client, self.kind, home.href.as_str())
                            .await?,
                    );
                }
                Err(DavError::NotFound(_)) => {
                    tracing::debug!(principal = %delegation.principal, "delegate has no home set");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(collections)
    }

    async fn remove_collection(&self, id: &str) -> Result<(), DavError> {
        let collection = self.collection(id).await?;
        collection.delete().await
    }
}

/// Store of calendar collections for one account.
#[derive(Debug, Clone)]
pub struct CalendarStore {
    inner: DavStore,
}

impl CalendarStore {
    /// Creates a calendar store over a connected client.
    #[must_use]
    pub fn new(client: DavClient, resolver: Arc<dyn PathResolver>) -> Self {
        Self {
            inner: DavStore::new(client, resolver, StoreKind::Calendar),
        }
    }

    /// Replaces the application product identifier.
    #[must_use]
    pub fn with_prod_id(mut self, prod_id: impl Into<String>) -> Self {
        self.inner.prod_id = prod_id.into();
        self
    }

    /// Application product identifier, for callers stamping the iCalendar
    /// objects they store.
    #[must_use]
    pub fn prod_id(&self) -> &str {
        &self.inner.prod_id
    }

    /// Underlying transport client.
    #[must_use]
    pub fn client(&self) -> &DavClient {
        &self.inner.client
    }

    /// Creates a calendar with default properties (MKCALENDAR).
    ///
    /// The returned handle starts with an empty property snapshot; call
    /// [`Collection::refresh`] to load the server-assigned properties.
    ///
    /// # Errors
    ///
    /// Returns an error if the home set cannot be resolved or the server
    /// refuses the create.
    pub async fn add_collection(&self, id: &str) -> Result<Collection, DavError> {
        self.inner
            .add_collection(id, &CollectionProperties::default())
            .await
    }

    /// Creates a calendar with initial properties (MKCALENDAR).
    ///
    /// # Errors
    ///
    /// Same conditions as [`add_collection`](Self::add_collection).
    pub async fn add_collection_with(
        &self,
        id: &str,
        properties: &CollectionProperties,
    ) -> Result<Collection, DavError> {
        self.inner.add_collection(id, properties).await
    }

    /// Fetches a calendar by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::NotFound`] when no calendar with this
    /// identifier exists.
    pub async fn collection(&self, id: &str) -> Result<Collection, DavError> {
        self.inner.collection(id).await
    }

    /// Lists the calendars in the account's home collection.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery or the listing fails.
    pub async fn collections(&self) -> Result<Vec<Collection>, DavError> {
        self.inner.collections().await
    }

    /// Lists calendars other principals delegated to this account.
    ///
    /// # Errors
    ///
    /// Returns an error if the delegation lookup fails.
    pub async fn delegated_collections(&self) -> Result<Vec<Collection>, DavError> {
        self.inner.delegated_collections().await
    }

    /// Deletes a calendar by identifier. The calendar is fetched first, so
    /// deleting an absent calendar reports not-found.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::NotFound`] when no calendar with this
    /// identifier exists.
    pub async fn remove_collection(&self, id: &str) -> Result<(), DavError> {
        self.inner.remove_collection(id).await
    }

    /// Merging a calendar into an existing collection.
    ///
    /// Not implemented by this client generation; fails without touching
    /// the network.
    ///
    /// # Errors
    ///
    /// Always returns [`DavError::Unsupported`].
    pub fn merge(&self, _id: &str, _data: &str) -> Result<(), DavError> {
        Err(DavError::Unsupported("merging into a calendar collection"))
    }

    /// The account's calendar home collection.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::NotFound`] when the principal advertises no
    /// calendar home.
    pub async fn home_set(&self) -> Result<HomeSet, DavError> {
        self.inner.home().await
    }

    /// The account's scheduling inbox and outbox locations.
    ///
    /// # Errors
    ///
    /// Returns an error if the principal resource cannot be read.
    pub async fn schedule_urls(&self) -> Result<ScheduleUrls, DavError> {
        let principal = self.inner.principal_path().await?;
        discovery::schedule_urls(&self.inner.client, &principal).await
    }
}

/// Store of address-book collections for one account.
#[derive(Debug, Clone)]
pub struct AddressBookStore {
    inner: DavStore,
}

impl AddressBookStore {
    /// Creates an address-book store over a connected client.
    #[must_use]
    pub fn new(client: DavClient, resolver: Arc<dyn PathResolver>) -> Self {
        Self {
            inner: DavStore::new(client, resolver, StoreKind::AddressBook),
        }
    }

    /// Replaces the application product identifier.
    #[must_use]
    pub fn with_prod_id(mut self, prod_id: impl Into<String>) -> Self {
        self.inner.prod_id = prod_id.into();
        self
    }

    /// Application product identifier, for callers stamping the vCard
    /// objects they store.
    #[must_use]
    pub fn prod_id(&self) -> &str {
        &self.inner.prod_id
    }

    /// Underlying transport client.
    #[must_use]
    pub fn client(&self) -> &DavClient {
        &self.inner.client
    }

    /// Creates an address book with default properties (extended MKCOL).
    ///
    /// The returned handle starts with an empty property snapshot; call
    /// [`Collection::refresh`] to load the server-assigned properties.
    ///
    /// # Errors
    ///
    /// Returns an error if the home set cannot be resolved or the server
    /// refuses the create.
    pub async fn add_collection(&self, id: &str) -> Result<Collection, DavError> {
        self.inner
            .add_collection(id, &CollectionProperties::default())
            .await
    }

    /// Creates an address book with initial properties (extended MKCOL).
    ///
    /// # Errors
    ///
    /// Same conditions as [`add_collection`](Self::add_collection).
    pub async fn add_collection_with(
        &self,
        id: &str,
        properties: &CollectionProperties,
    ) -> Result<Collection, DavError> {
        self.inner.add_collection(id, properties).await
    }

    /// Fetches an address book by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::NotFound`] when no address book with this
    /// identifier exists.
    pub async fn collection(&self, id: &str) -> Result<Collection, DavError> {
        self.inner.collection(id).await
    }

    /// Lists the address books in the account's home collection.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery or the listing fails.
    pub async fn collections(&self) -> Result<Vec<Collection>, DavError> {
        self.inner.collections().await
    }

    /// Lists address books other principals delegated to this account.
    ///
    /// # Errors
    ///
    /// Returns an error if the delegation lookup fails.
    pub async fn delegated_collections(&self) -> Result<Vec<Collection>, DavError> {
        self.inner.delegated_collections().await
    }

    /// Deletes an address book by identifier. The address book is fetched
    /// first, so deleting an absent one reports not-found.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::NotFound`] when no address book with this
    /// identifier exists.
    pub async fn remove_collection(&self, id: &str) -> Result<(), DavError> {
        self.inner.remove_collection(id).await
    }

    /// Merging an address book into an existing collection.
    ///
    /// Not implemented by this client generation; fails without touching
    /// the network.
    ///
    /// # Errors
    ///
    /// Always returns [`DavError::Unsupported`].
    pub fn merge(&self, _id: &str, _data: &str) -> Result<(), DavError> {
        Err(DavError::Unsupported(
            "merging into an address-book collection",
        ))
    }

    /// The account's address-book home collection.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::NotFound`] when the principal advertises no
    /// address-book home.
    pub async fn home_set(&self) -> Result<HomeSet, DavError> {
        self.inner.home().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_properties() {
        assert_eq!(
            StoreKind::Calendar.home_set_property(),
            props::CALENDAR_HOME_SET
        );
        assert_eq!(
            StoreKind::AddressBook.home_set_property(),
            props::ADDRESSBOOK_HOME_SET
        );
        assert_eq!(StoreKind::Calendar.resource_kind(), ResourceKind::Calendar);
        assert_eq!(
            StoreKind::AddressBook.resource_kind(),
            ResourceKind::AddressBook
        );
        assert!(StoreKind::Calendar.content_type().starts_with("text/calendar"));
        assert!(StoreKind::AddressBook.content_type().starts_with("text/vcard"));
    }

    #[test]
    fn calendar_fetches_component_set() {
        let names = StoreKind::Calendar.collection_properties();
        assert!(names.contains(&props::SUPPORTED_CALENDAR_COMPONENT_SET));
        let names = StoreKind::AddressBook.collection_properties();
        assert!(!names.contains(&props::SUPPORTED_CALENDAR_COMPONENT_SET));
        assert!(names.contains(&props::ADDRESSBOOK_DESCRIPTION));
    }

    #[test]
    fn default_prod_id_carries_version() {
        assert!(DEFAULT_PROD_ID.starts_with("-//davbridge//client "));
        assert!(DEFAULT_PROD_ID.ends_with("//EN"));
    }
}
