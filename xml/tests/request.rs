// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Request building tests.

use davbridge_xml::{
    CalendarQueryRequest, ExpandPropertyRequest, FreeBusyQueryRequest, MkCalendarRequest,
    MkColRequest, MultiGetRequest, PrincipalPropertySearchRequest, PropFindRequest, PropertyName,
    PropertyUpdateRequest, ResourceKind, props,
};

#[test]
fn request_propfind_builds_xml() {
    let mut request = PropFindRequest::new();
    request.add_property(props::DISPLAY_NAME);
    request.add_property(props::GET_ETAG);
    request.add_property(props::RESOURCE_TYPE);

    let xml = request.build().expect("Failed to build PROPFIND XML");

    assert!(xml.contains("<D:propfind"));
    assert!(xml.contains("xmlns:D=\"DAV:\""));
    assert!(xml.contains("<D:prop>"));
    assert!(xml.contains("<D:displayname/>"));
    assert!(xml.contains("<D:getetag/>"));
    assert!(xml.contains("<D:resourcetype/>"));
    assert!(xml.contains("</D:prop>"));
    assert!(xml.contains("</D:propfind>"));
}

#[test]
fn request_propfind_caldav_properties_include_namespace() {
    let request = PropFindRequest::properties([props::CALENDAR_HOME_SET, props::GET_CTAG]);

    let xml = request.build().expect("Failed to build PROPFIND XML");

    assert!(xml.contains("xmlns:D=\"DAV:\""));
    assert!(xml.contains("xmlns:C=\"urn:ietf:params:xml:ns:caldav\""));
    assert!(xml.contains("xmlns:CS=\"http://calendarserver.org/ns/\""));
    assert!(xml.contains("<C:calendar-home-set/>"));
    assert!(xml.contains("<CS:getctag/>"));
}

#[test]
fn request_propfind_carddav_properties_include_namespace() {
    let request = PropFindRequest::properties([props::ADDRESSBOOK_HOME_SET]);

    let xml = request.build().expect("Failed to build PROPFIND XML");

    assert!(xml.contains("xmlns:CARD=\"urn:ietf:params:xml:ns:carddav\""));
    assert!(xml.contains("<CARD:addressbook-home-set/>"));
    assert!(!xml.contains("xmlns:C=\"urn:ietf:params:xml:ns:caldav\""));
}

#[test]
fn request_propfind_custom_namespace_declares_itself() {
    let request = PropFindRequest::properties([PropertyName::new(
        "http://example.com/ns/",
        "custom-prop",
    )]);

    let xml = request.build().expect("Failed to build PROPFIND XML");

    assert!(xml.contains("<custom-prop xmlns=\"http://example.com/ns/\"/>"));
}

#[test]
fn request_propfind_allprop_builds_xml() {
    let xml = PropFindRequest::allprop()
        .build()
        .expect("Failed to build PROPFIND XML");

    assert!(xml.contains("<D:allprop/>"));
    assert!(!xml.contains("<D:prop>"));
}

#[test]
fn request_propfind_propname_builds_xml() {
    let xml = PropFindRequest::propname()
        .build()
        .expect("Failed to build PROPFIND XML");

    assert!(xml.contains("<D:propname/>"));
}

#[test]
fn request_property_update_keeps_document_order() {
    let request = PropertyUpdateRequest::new()
        .set(props::DISPLAY_NAME, "Work")
        .remove(props::CALENDAR_DESCRIPTION)
        .set(props::CALENDAR_TIMEZONE, "BEGIN:VCALENDAR");

    let xml = request.build().expect("Failed to build PROPPATCH XML");

    assert!(xml.contains("<D:propertyupdate"));
    assert!(xml.contains("<D:displayname>Work</D:displayname>"));
    assert!(xml.contains("<C:calendar-description/>"));
    assert!(xml.contains("<C:calendar-timezone>BEGIN:VCALENDAR</C:calendar-timezone>"));

    let set_first = xml.find("<D:set>").expect("missing set block");
    let remove = xml.find("<D:remove>").expect("missing remove block");
    let set_second = xml.rfind("<D:set>").expect("missing second set block");
    assert!(set_first < remove);
    assert!(remove < set_second);
}

#[test]
fn request_mkcalendar_builds_xml() {
    let request = MkCalendarRequest::new()
        .display_name("Team Calendar")
        .description("Shared planning");

    let xml = request.build().expect("Failed to build MKCALENDAR XML");

    assert!(xml.contains("<C:mkcalendar"));
    assert!(xml.contains("xmlns:C=\"urn:ietf:params:xml:ns:caldav\""));
    assert!(xml.contains("<D:set>"));
    assert!(xml.contains("<D:displayname>Team Calendar</D:displayname>"));
    assert!(xml.contains("<C:calendar-description>Shared planning</C:calendar-description>"));
    assert!(xml.contains("</C:mkcalendar>"));
}

#[test]
fn request_mkcalendar_without_properties_is_empty() {
    assert!(MkCalendarRequest::new().is_empty());
    assert!(!MkCalendarRequest::new().display_name("X").is_empty());
}

#[test]
fn request_mkcol_declares_resource_types() {
    let request = MkColRequest::address_book().display_name("Contacts");

    let xml = request.build().expect("Failed to build MKCOL XML");

    assert!(xml.contains("<D:mkcol"));
    assert!(xml.contains("xmlns:CARD=\"urn:ietf:params:xml:ns:carddav\""));
    assert!(xml.contains("<D:resourcetype>"));
    assert!(xml.contains("<D:collection/>"));
    assert!(xml.contains("<CARD:addressbook/>"));
    assert!(xml.contains("</D:resourcetype>"));
    assert!(xml.contains("<D:displayname>Contacts</D:displayname>"));

    let collection = xml.find("<D:collection/>").expect("missing collection");
    let addressbook = xml.find("<CARD:addressbook/>").expect("missing addressbook");
    assert!(collection < addressbook);
}

#[test]
fn request_mkcol_deduplicates_collection_kind() {
    let request = MkColRequest::new([ResourceKind::Collection, ResourceKind::Calendar]);

    let xml = request.build().expect("Failed to build MKCOL XML");

    assert_eq!(xml.matches("<D:collection/>").count(), 1);
    assert!(xml.contains("<C:calendar/>"));
}

#[test]
fn request_calendar_query_builds_xml() {
    let request = CalendarQueryRequest::new().component("VEVENT").time_range(
        "20260101T000000Z",
        Some("20260131T235959Z".to_string()),
    );

    let xml = request.build().expect("Failed to build calendar-query XML");

    assert!(xml.contains("<C:calendar-query"));
    assert!(xml.contains("<D:getetag/>"));
    assert!(xml.contains("<C:calendar-data/>"));
    assert!(xml.contains("<C:filter>"));
    assert!(xml.contains("<C:comp-filter name=\"VCALENDAR\">"));
    assert!(xml.contains("<C:comp-filter name=\"VEVENT\">"));
    assert!(xml.contains("<C:time-range start=\"20260101T000000Z\" end=\"20260131T235959Z\"/>"));
}

#[test]
fn request_calendar_query_without_filters_matches_everything() {
    let xml = CalendarQueryRequest::new()
        .build()
        .expect("Failed to build calendar-query XML");

    assert!(xml.contains("<C:comp-filter name=\"VCALENDAR\">"));
    assert!(!xml.contains("C:time-range"));
    assert_eq!(xml.matches("<C:comp-filter").count(), 1);
}

#[test]
fn request_calendar_multiget_lists_hrefs() {
    let mut request = MultiGetRequest::calendar();
    request.add_href("/calendars/alice/work/1.ics");
    request.add_href("/calendars/alice/work/2.ics");

    let xml = request.build().expect("Failed to build multiget XML");

    assert!(xml.contains("<C:calendar-multiget"));
    assert!(xml.contains("<C:calendar-data/>"));
    assert!(xml.contains("<D:href>/calendars/alice/work/1.ics</D:href>"));
    assert!(xml.contains("<D:href>/calendars/alice/work/2.ics</D:href>"));
}

#[test]
fn request_addressbook_multiget_uses_carddav_namespace() {
    let mut request = MultiGetRequest::address_book();
    request.add_href("/addressbooks/alice/contacts/bob.vcf");

    let xml = request.build().expect("Failed to build multiget XML");

    assert!(xml.contains("<CARD:addressbook-multiget"));
    assert!(xml.contains("xmlns:CARD=\"urn:ietf:params:xml:ns:carddav\""));
    assert!(xml.contains("<CARD:address-data/>"));
    assert!(xml.contains("<D:href>/addressbooks/alice/contacts/bob.vcf</D:href>"));
}

#[test]
fn request_free_busy_query_builds_xml() {
    let request = FreeBusyQueryRequest::new("20260301T000000Z", "20260302T000000Z");

    let xml = request.build().expect("Failed to build free-busy-query XML");

    assert!(xml.contains("<C:free-busy-query"));
    assert!(xml.contains("<C:time-range start=\"20260301T000000Z\" end=\"20260302T000000Z\"/>"));
    assert!(xml.contains("</C:free-busy-query>"));
}

#[test]
fn request_expand_property_nests_targets() {
    let request = ExpandPropertyRequest::new().property(
        props::PROXY_WRITE_FOR,
        vec![props::DISPLAY_NAME, props::PRINCIPAL_URL],
    );

    let xml = request
        .build()
        .expect("Failed to build expand-property XML");

    assert!(xml.contains("<D:expand-property"));
    assert!(xml.contains(
        "<D:property name=\"calendar-proxy-write-for\" \
         namespace=\"http://calendarserver.org/ns/\">"
    ));
    assert!(xml.contains("<D:property name=\"displayname\" namespace=\"DAV:\"/>"));
    assert!(xml.contains("<D:property name=\"principal-URL\" namespace=\"DAV:\"/>"));
    assert!(xml.contains("</D:expand-property>"));
}

#[test]
fn request_principal_property_search_builds_xml() {
    let request = PrincipalPropertySearchRequest::new()
        .search(props::DISPLAY_NAME, "ali")
        .return_property(props::DISPLAY_NAME)
        .return_property(props::CALENDAR_USER_ADDRESS_SET);

    let xml = request
        .build()
        .expect("Failed to build principal-property-search XML");

    assert!(xml.contains("<D:principal-property-search"));
    assert!(xml.contains("<D:property-search>"));
    assert!(xml.contains("<D:displayname/>"));
    assert!(xml.contains("<D:match>ali</D:match>"));
    assert!(xml.contains("<C:calendar-user-address-set/>"));
    assert!(xml.contains("</D:principal-property-search>"));
}
