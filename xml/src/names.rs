// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Namespaces and property names used by `CalDAV`/`CardDAV` clients.

use std::borrow::Cow;
use std::fmt;

/// XML namespaces used in WebDAV and its calendaring/contact extensions.
pub mod ns {
    /// `WebDAV` namespace.
    pub const DAV: &str = "DAV:";

    /// `CalDAV` namespace.
    pub const CALDAV: &str = "urn:ietf:params:xml:ns:caldav";

    /// `CardDAV` namespace.
    pub const CARDDAV: &str = "urn:ietf:params:xml:ns:carddav";

    /// CalendarServer extensions namespace (ctag, proxy delegation).
    pub const CALENDARSERVER: &str = "http://calendarserver.org/ns/";
}

/// A namespaced XML property name.
///
/// The well-known names live in [`props`]; arbitrary names can be built with
/// [`PropertyName::new`] for server-specific properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyName {
    namespace: Cow<'static, str>,
    local: Cow<'static, str>,
}

impl PropertyName {
    /// A property in the `DAV:` namespace.
    #[must_use]
    pub const fn dav(local: &'static str) -> Self {
        Self {
            namespace: Cow::Borrowed(ns::DAV),
            local: Cow::Borrowed(local),
        }
    }

    /// A property in the `CalDAV` namespace.
    #[must_use]
    pub const fn caldav(local: &'static str) -> Self {
        Self {
            namespace: Cow::Borrowed(ns::CALDAV),
            local: Cow::Borrowed(local),
        }
    }

    /// A property in the `CardDAV` namespace.
    #[must_use]
    pub const fn carddav(local: &'static str) -> Self {
        Self {
            namespace: Cow::Borrowed(ns::CARDDAV),
            local: Cow::Borrowed(local),
        }
    }

    /// A property in the CalendarServer extensions namespace.
    #[must_use]
    pub const fn calendar_server(local: &'static str) -> Self {
        Self {
            namespace: Cow::Borrowed(ns::CALENDARSERVER),
            local: Cow::Borrowed(local),
        }
    }

    /// A property in an arbitrary namespace.
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Cow::Owned(namespace.into()),
            local: Cow::Owned(local.into()),
        }
    }

    /// Returns the namespace URI.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the local element name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for PropertyName {
    /// Clark notation, e.g. `{DAV:}displayname`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local)
    }
}

/// Well-known property names.
pub mod props {
    use super::PropertyName;

    /// `DAV:` displayname.
    pub const DISPLAY_NAME: PropertyName = PropertyName::dav("displayname");
    /// `DAV:` resourcetype.
    pub const RESOURCE_TYPE: PropertyName = PropertyName::dav("resourcetype");
    /// `DAV:` getetag.
    pub const GET_ETAG: PropertyName = PropertyName::dav("getetag");
    /// `DAV:` getcontenttype.
    pub const GET_CONTENT_TYPE: PropertyName = PropertyName::dav("getcontenttype");
    /// `DAV:` owner.
    pub const OWNER: PropertyName = PropertyName::dav("owner");
    /// `DAV:` current-user-principal (RFC 5397).
    pub const CURRENT_USER_PRINCIPAL: PropertyName = PropertyName::dav("current-user-principal");
    /// `DAV:` principal-URL (RFC 3744).
    pub const PRINCIPAL_URL: PropertyName = PropertyName::dav("principal-URL");
    /// `DAV:` supported-report-set (RFC 3253).
    pub const SUPPORTED_REPORT_SET: PropertyName = PropertyName::dav("supported-report-set");

    /// `CalDAV` calendar-home-set.
    pub const CALENDAR_HOME_SET: PropertyName = PropertyName::caldav("calendar-home-set");
    /// `CalDAV` calendar-description.
    pub const CALENDAR_DESCRIPTION: PropertyName = PropertyName::caldav("calendar-description");
    /// `CalDAV` calendar-timezone.
    pub const CALENDAR_TIMEZONE: PropertyName = PropertyName::caldav("calendar-timezone");
    /// `CalDAV` supported-calendar-component-set.
    pub const SUPPORTED_CALENDAR_COMPONENT_SET: PropertyName =
        PropertyName::caldav("supported-calendar-component-set");
    /// `CalDAV` calendar-data.
    pub const CALENDAR_DATA: PropertyName = PropertyName::caldav("calendar-data");
    /// `CalDAV` schedule-inbox-URL (RFC 6638).
    pub const SCHEDULE_INBOX_URL: PropertyName = PropertyName::caldav("schedule-inbox-URL");
    /// `CalDAV` schedule-outbox-URL (RFC 6638).
    pub const SCHEDULE_OUTBOX_URL: PropertyName = PropertyName::caldav("schedule-outbox-URL");
    /// `CalDAV` schedule-calendar-transp (RFC 6638).
    pub const SCHEDULE_CALENDAR_TRANSP: PropertyName =
        PropertyName::caldav("schedule-calendar-transp");
    /// `CalDAV` schedule-default-calendar-URL (RFC 6638).
    pub const SCHEDULE_DEFAULT_CALENDAR_URL: PropertyName =
        PropertyName::caldav("schedule-default-calendar-URL");
    /// `CalDAV` calendar-user-address-set (RFC 6638).
    pub const CALENDAR_USER_ADDRESS_SET: PropertyName =
        PropertyName::caldav("calendar-user-address-set");
    /// `CalDAV` calendar-user-type (RFC 6638).
    pub const CALENDAR_USER_TYPE: PropertyName = PropertyName::caldav("calendar-user-type");

    /// `CardDAV` addressbook-home-set.
    pub const ADDRESSBOOK_HOME_SET: PropertyName = PropertyName::carddav("addressbook-home-set");
    /// `CardDAV` addressbook-description.
    pub const ADDRESSBOOK_DESCRIPTION: PropertyName =
        PropertyName::carddav("addressbook-description");
    /// `CardDAV` address-data.
    pub const ADDRESS_DATA: PropertyName = PropertyName::carddav("address-data");

    /// CalendarServer collection tag.
    pub const GET_CTAG: PropertyName = PropertyName::calendar_server("getctag");
    /// CalendarServer calendar-proxy-read-for delegation property.
    pub const PROXY_READ_FOR: PropertyName =
        PropertyName::calendar_server("calendar-proxy-read-for");
    /// CalendarServer calendar-proxy-write-for delegation property.
    pub const PROXY_WRITE_FOR: PropertyName =
        PropertyName::calendar_server("calendar-proxy-write-for");
}

/// Resource types appearing inside a `DAV:resourcetype` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// `DAV:` collection.
    Collection,
    /// `DAV:` principal (RFC 3744).
    Principal,
    /// `CalDAV` calendar collection.
    Calendar,
    /// `CalDAV` schedule-inbox collection (RFC 6638).
    ScheduleInbox,
    /// `CalDAV` schedule-outbox collection (RFC 6638).
    ScheduleOutbox,
    /// `CardDAV` addressbook collection.
    AddressBook,
}

impl ResourceKind {
    /// Maps a namespaced element name to a resource kind, if known.
    #[must_use]
    pub fn from_name(namespace: &str, local: &str) -> Option<Self> {
        match (namespace, local) {
            (ns::DAV, "collection") => Some(Self::Collection),
            (ns::DAV, "principal") => Some(Self::Principal),
            (ns::CALDAV, "calendar") => Some(Self::Calendar),
            (ns::CALDAV, "schedule-inbox") => Some(Self::ScheduleInbox),
            (ns::CALDAV, "schedule-outbox") => Some(Self::ScheduleOutbox),
            (ns::CARDDAV, "addressbook") => Some(Self::AddressBook),
            _ => None,
        }
    }

    /// Returns the namespace URI of the element.
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            Self::Collection | Self::Principal => ns::DAV,
            Self::Calendar | Self::ScheduleInbox | Self::ScheduleOutbox => ns::CALDAV,
            Self::AddressBook => ns::CARDDAV,
        }
    }

    /// Returns the local element name.
    #[must_use]
    pub const fn local_name(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Principal => "principal",
            Self::Calendar => "calendar",
            Self::ScheduleInbox => "schedule-inbox",
            Self::ScheduleOutbox => "schedule-outbox",
            Self::AddressBook => "addressbook",
        }
    }
}
