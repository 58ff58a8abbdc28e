// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Server topology discovery: who the session user is, where their home
//! collections live, and who delegated access to them.

use davbridge_xml::{Depth, ExpandPropertyRequest, Href, PropertyName, PropertySet, props};

use crate::client::DavClient;
use crate::collection::Collection;
use crate::error::DavError;
use crate::interpret;
use crate::store::StoreKind;

/// A discovered home collection.
#[derive(Debug, Clone)]
pub struct HomeSet {
    /// Home collection path, exactly as the server reported it.
    pub href: Href,
    /// Display name of the principal resource, if reported.
    pub display_name: Option<String>,
}

/// Access level another principal granted to the session user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegationAccess {
    /// Read-only proxy access.
    Read,
    /// Read-write proxy access.
    ReadWrite,
}

/// A principal who delegated collection access to the session user.
#[derive(Debug, Clone)]
pub struct Delegation {
    /// Principal path of the delegating user.
    pub principal: Href,
    /// Display name of the delegating user, if reported.
    pub display_name: Option<String>,
    /// Granted access level.
    pub access: DelegationAccess,
}

/// Scheduling inbox and outbox locations (RFC 6638).
#[derive(Debug, Clone)]
pub struct ScheduleUrls {
    /// `schedule-inbox-URL`, if the server advertises one.
    pub inbox: Option<Href>,
    /// `schedule-outbox-URL`, if the server advertises one.
    pub outbox: Option<Href>,
}

/// Resolves the principal path of the authenticated user
/// (`DAV:current-user-principal`, RFC 5397) from the base URL.
///
/// # Errors
///
/// Returns [`DavError::NotFound`] when the server does not report the
/// property.
pub async fn current_user_principal(client: &DavClient) -> Result<Href, DavError> {
    let path = client.endpoint_path();
    let properties = client
        .prop_find(&path, [props::CURRENT_USER_PRINCIPAL])
        .await?;
    properties
        .href(&props::CURRENT_USER_PRINCIPAL)
        .cloned()
        .ok_or_else(|| DavError::NotFound(Href::new(path)))
}

/// Looks up the home collection of a principal for calendars or address
/// books. The reported href is returned untrimmed.
///
/// # Errors
///
/// Returns [`DavError::NotFound`] when the principal does not advertise a
/// home set of the wanted kind.
pub async fn find_home_set(
    client: &DavClient,
    kind: StoreKind,
    principal_path: &str,
) -> Result<HomeSet, DavError> {
    let home_property = kind.home_set_property();
    let properties = client
        .prop_find(principal_path, [home_property.clone(), props::DISPLAY_NAME])
        .await?;
    let href = properties
        .href(&home_property)
        .cloned()
        .ok_or_else(|| DavError::NotFound(Href::from(principal_path)))?;
    tracing::debug!(principal = principal_path, home = %href, "resolved home set");
    Ok(HomeSet {
        href,
        display_name: properties.text(&props::DISPLAY_NAME).map(str::to_string),
    })
}

/// Lists the collections of the wanted kind inside a home collection.
/// The home itself is excluded from the result.
///
/// # Errors
///
/// Returns an error if the home collection cannot be listed.
pub async fn list_collections(
    client: &DavClient,
    kind: StoreKind,
    home: &str,
) -> Result<Vec<Collection>, DavError> {
    let entries = client
        .prop_find_resources(home, kind.collection_properties(), &[kind.resource_kind()])
        .await?;
    Ok(entries
        .into_iter()
        .filter(|(href, _)| !interpret::same_resource(href.as_str(), home))
        .map(|(href, properties)| Collection::new(client.clone(), kind, href, properties))
        .collect())
}

/// Principals who delegated collection access to the session user, via the
/// CalendarServer `calendar-proxy-write-for` / `calendar-proxy-read-for`
/// properties. Write delegations come first.
///
/// Servers without delegation support yield an empty list, not an error.
///
/// # Errors
///
/// Returns an error on transport failures or malformed replies.
pub async fn delegated_principals(
    client: &DavClient,
    principal_path: &str,
) -> Result<Vec<Delegation>, DavError> {
    let nested = vec![
        props::DISPLAY_NAME,
        props::PRINCIPAL_URL,
        props::CALENDAR_USER_ADDRESS_SET,
    ];
    let request = ExpandPropertyRequest::new()
        .property(props::PROXY_WRITE_FOR, nested.clone())
        .property(props::PROXY_READ_FOR, nested);

    let multi = match client
        .report(principal_path, Depth::Zero, request.build()?)
        .await
    {
        Ok(multi) => multi,
        // expand-property not implemented or forbidden: no delegation
        Err(DavError::FailedOperation { status, .. })
            if matches!(status, 400 | 403 | 404 | 501) =>
        {
            tracing::debug!(principal = principal_path, status, "no delegation support");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut delegations = Vec::new();
    for response in &multi.responses {
        let properties = response.ok_props();
        collect_delegates(
            &properties,
            &props::PROXY_WRITE_FOR,
            DelegationAccess::ReadWrite,
            &mut delegations,
        );
        collect_delegates(
            &properties,
            &props::PROXY_READ_FOR,
            DelegationAccess::Read,
            &mut delegations,
        );
    }
    Ok(delegations)
}

fn collect_delegates(
    properties: &PropertySet,
    name: &PropertyName,
    access: DelegationAccess,
    out: &mut Vec<Delegation>,
) {
    for nested in properties.responses(name) {
        let nested_properties = nested.ok_props();
        let principal = nested_properties
            .href(&props::PRINCIPAL_URL)
            .cloned()
            .unwrap_or_else(|| nested.href.clone());
        out.push(Delegation {
            principal,
            display_name: nested_properties
                .text(&props::DISPLAY_NAME)
                .map(str::to_string),
            access,
        });
    }
}

/// Scheduling inbox and outbox of a principal. Missing properties are
/// reported as `None`; servers without scheduling support yield both as
/// `None`.
///
/// # Errors
///
/// Returns an error if the principal resource cannot be read.
pub async fn schedule_urls(
    client: &DavClient,
    principal_path: &str,
) -> Result<ScheduleUrls, DavError> {
    let properties = client
        .prop_find(principal_path, [props::SCHEDULE_INBOX_URL, props::SCHEDULE_OUTBOX_URL])
        .await?;
    Ok(ScheduleUrls {
        inbox: properties.href(&props::SCHEDULE_INBOX_URL).cloned(),
        outbox: properties.href(&props::SCHEDULE_OUTBOX_URL).cloned(),
    })
}
