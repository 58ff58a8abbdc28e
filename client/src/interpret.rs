// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Pure translation from HTTP exchanges to domain values. Nothing in this
//! module performs I/O, which keeps response handling testable offline.

use davbridge_xml::{
    Href, MultiStatus, PropertySet, Response, ResourceKind, ScheduleResponse, props,
};
use reqwest::StatusCode;

use crate::client::{DavFeature, Principal};
use crate::error::DavError;
use crate::session::DavResponse;

/// Parses a multi-status reply, rejecting other statuses first.
pub(crate) fn multi_status(response: &DavResponse) -> Result<MultiStatus, DavError> {
    if !matches!(response.status.as_u16(), 200 | 207) {
        return Err(DavError::failed(response.status));
    }
    Ok(MultiStatus::parse(&response.body)?)
}

/// Property set of the first multi-status entry, or not-found when the
/// reply carries none.
pub(crate) fn single_property_set(
    response: &DavResponse,
    path: &str,
) -> Result<PropertySet, DavError> {
    let multi = MultiStatus::parse(&response.body)?;
    multi
        .responses
        .first()
        .map(Response::ok_props)
        .ok_or_else(|| DavError::NotFound(Href::from(path)))
}

/// First multi-status entry, or not-found when the reply carries none.
pub(crate) fn first_response(response: &DavResponse, path: &str) -> Result<Response, DavError> {
    let multi = MultiStatus::parse(&response.body)?;
    multi
        .responses
        .into_iter()
        .next()
        .ok_or_else(|| DavError::NotFound(Href::from(path)))
}

/// One `(href, properties)` pair per multi-status entry, in document order.
pub(crate) fn properties_by_resource(multi: &MultiStatus) -> Vec<(Href, PropertySet)> {
    multi
        .responses
        .iter()
        .map(|response| (response.href.clone(), response.ok_props()))
        .collect()
}

/// Multi-status entries whose `DAV:resourcetype` carries one of the wanted
/// kinds. Entries without a resource type are dropped.
pub(crate) fn resources_of_kind(
    response: &DavResponse,
    kinds: &[ResourceKind],
) -> Result<Vec<(Href, PropertySet)>, DavError> {
    let multi = MultiStatus::parse(&response.body)?;
    Ok(multi
        .responses
        .iter()
        .filter_map(|entry| {
            let properties = entry.ok_props();
            let wanted = kinds
                .iter()
                .any(|kind| properties.resource_kinds().contains(kind));
            wanted.then(|| (entry.href.clone(), properties))
        })
        .collect())
}

/// Principals from a `principal-property-search` reply.
pub(crate) fn principals(response: &DavResponse) -> Result<Vec<Principal>, DavError> {
    let multi = multi_status(response)?;
    Ok(multi
        .responses
        .iter()
        .map(|entry| {
            let properties = entry.ok_props();
            Principal {
                href: entry.href.clone(),
                display_name: properties.text(&props::DISPLAY_NAME).map(str::to_string),
                addresses: properties.hrefs(&props::CALENDAR_USER_ADDRESS_SET).to_vec(),
                user_type: properties
                    .text(&props::CALENDAR_USER_TYPE)
                    .map(str::to_string),
            }
        })
        .collect())
}

/// Per-recipient schedule responses from a free-busy POST.
pub(crate) fn schedule_responses(
    response: &DavResponse,
) -> Result<Vec<ScheduleResponse>, DavError> {
    if response.status != StatusCode::OK {
        return Err(DavError::failed(response.status));
    }
    Ok(ScheduleResponse::parse_all(&response.body)?)
}

/// Feature tokens from the `DAV` response header. Absent header means an
/// empty set, not an error.
pub(crate) fn supported_features(response: &DavResponse) -> Vec<DavFeature> {
    response
        .headers
        .get_all("DAV")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(DavFeature::from_token)
        .collect()
}

/// Path equality ignoring a trailing slash, for self-exclusion in depth-1
/// listings.
pub(crate) fn same_resource(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderMap;

    use super::*;

    fn response(status: u16, body: &str) -> DavResponse {
        DavResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: body.to_string(),
        }
    }

    const HOME_MULTISTATUS: &str = "\
        <D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\" \
            xmlns:CS=\"http://calendarserver.org/ns/\">\
          <D:response>\
            <D:href>/calendars/alice/</D:href>\
            <D:propstat>\
              <D:prop>\
                <D:resourcetype><D:collection/></D:resourcetype>\
                <D:displayname>alice</D:displayname>\
              </D:prop>\
              <D:status>HTTP/1.1 200 OK</D:status>\
            </D:propstat>\
          </D:response>\
          <D:response>\
            <D:href>/calendars/alice/work/</D:href>\
            <D:propstat>\
              <D:prop>\
                <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>\
                <D:displayname>Work</D:displayname>\
                <CS:getctag>ctag-1</CS:getctag>\
              </D:prop>\
              <D:status>HTTP/1.1 200 OK</D:status>\
            </D:propstat>\
          </D:response>\
          <D:response>\
            <D:href>/calendars/alice/inbox/</D:href>\
            <D:propstat>\
              <D:prop>\
                <D:resourcetype><D:collection/><C:schedule-inbox/></D:resourcetype>\
              </D:prop>\
              <D:status>HTTP/1.1 200 OK</D:status>\
            </D:propstat>\
          </D:response>\
        </D:multistatus>";

    #[test]
    fn filters_resources_by_kind() {
        let calendars =
            resources_of_kind(&response(207, HOME_MULTISTATUS), &[ResourceKind::Calendar])
                .unwrap();
        assert_eq!(calendars.len(), 1);
        assert_eq!(calendars[0].0.as_str(), "/calendars/alice/work/");
        assert_eq!(calendars[0].1.text(&props::DISPLAY_NAME), Some("Work"));

        let inboxes = resources_of_kind(
            &response(207, HOME_MULTISTATUS),
            &[ResourceKind::ScheduleInbox],
        )
        .unwrap();
        assert_eq!(inboxes.len(), 1);
        assert_eq!(inboxes[0].0.as_str(), "/calendars/alice/inbox/");
    }

    #[test]
    fn filter_with_two_kinds_keeps_both() {
        let found = resources_of_kind(
            &response(207, HOME_MULTISTATUS),
            &[ResourceKind::Calendar, ResourceKind::ScheduleInbox],
        )
        .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn single_set_from_first_entry() {
        let properties =
            single_property_set(&response(207, HOME_MULTISTATUS), "/calendars/alice/").unwrap();
        assert_eq!(properties.text(&props::DISPLAY_NAME), Some("alice"));
    }

    #[test]
    fn empty_multistatus_is_not_found() {
        let empty = "<D:multistatus xmlns:D=\"DAV:\"></D:multistatus>";
        let result = single_property_set(&response(207, empty), "/calendars/alice/missing/");
        assert!(
            matches!(result, Err(DavError::NotFound(href)) if href.as_str().ends_with("/missing/"))
        );

        let result = first_response(&response(207, empty), "/x/");
        assert!(matches!(result, Err(DavError::NotFound(_))));
    }

    #[test]
    fn multi_status_rejects_other_statuses() {
        let result = multi_status(&response(403, ""));
        assert!(matches!(
            result,
            Err(DavError::FailedOperation { status: 403, .. })
        ));
    }

    #[test]
    fn features_from_dav_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "DAV",
            "1, 2, access-control, calendar-access, calendar-proxy"
                .parse()
                .unwrap(),
        );
        let response = DavResponse {
            status: StatusCode::MULTI_STATUS,
            headers,
            body: String::new(),
        };
        let features = supported_features(&response);
        assert_eq!(
            features,
            vec![
                DavFeature::Class1,
                DavFeature::Class2,
                DavFeature::AccessControl,
                DavFeature::CalendarAccess,
                DavFeature::CalendarProxy,
            ]
        );
    }

    #[test]
    fn missing_dav_header_means_no_features() {
        assert!(supported_features(&response(207, "")).is_empty());
    }

    #[test]
    fn principal_entries() {
        let body = "\
            <D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\">\
              <D:response>\
                <D:href>/principals/users/bob/</D:href>\
                <D:propstat>\
                  <D:prop>\
                    <D:displayname>Bob</D:displayname>\
                    <C:calendar-user-address-set>\
                      <D:href>mailto:bob@example.com</D:href>\
                    </C:calendar-user-address-set>\
                    <C:calendar-user-type>INDIVIDUAL</C:calendar-user-type>\
                  </D:prop>\
                  <D:status>HTTP/1.1 200 OK</D:status>\
                </D:propstat>\
              </D:response>\
            </D:multistatus>";
        let found = principals(&response(207, body)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].href.as_str(), "/principals/users/bob/");
        assert_eq!(found[0].display_name.as_deref(), Some("Bob"));
        assert_eq!(found[0].addresses[0].as_str(), "mailto:bob@example.com");
        assert_eq!(found[0].user_type.as_deref(), Some("INDIVIDUAL"));
    }

    #[test]
    fn schedule_responses_require_ok() {
        let result = schedule_responses(&response(403, ""));
        assert!(matches!(
            result,
            Err(DavError::FailedOperation { status: 403, .. })
        ));
    }

    #[test]
    fn trailing_slash_equality() {
        assert!(same_resource("/calendars/alice", "/calendars/alice/"));
        assert!(same_resource("/calendars/alice/", "/calendars/alice/"));
        assert!(!same_resource("/calendars/alice/", "/calendars/bob/"));
    }
}
