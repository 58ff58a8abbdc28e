// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Store and collection tests with wiremock.

use std::sync::Arc;

use davbridge_client::{
    AddressBookStore, CalendarStore, Credentials, DavClient, DavConfig, DavConnector, DavError,
    DelegationAccess, ETag, GenericResolver, StoreKind,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_probe(server: &MockServer) {
    Mock::given(method("PROPFIND"))
        .and(path("/"))
        .and(header("Depth", "0"))
        .and(body_string_contains("getctag"))
        .respond_with(
            ResponseTemplate::new(207)
                .insert_header("DAV", "1, 2, access-control, calendar-access, addressbook"),
        )
        .mount(server)
        .await;
}

// Mock the principal lookup that resolves the calendar home.
async fn mount_calendar_home(server: &MockServer) {
    Mock::given(method("PROPFIND"))
        .and(path("/principals/users/alice/"))
        .and(header("Depth", "0"))
        .and(body_string_contains("calendar-home-set"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\">
  <D:response>
    <D:href>/principals/users/alice/</D:href>
    <D:propstat>
      <D:prop>
        <C:calendar-home-set><D:href>/calendars/alice/</D:href></C:calendar-home-set>
        <D:displayname>Alice</D:displayname>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(server)
        .await;
}

// Mock the depth-0 lookup of the work calendar.
async fn mount_work_calendar(server: &MockServer) {
    Mock::given(method("PROPFIND"))
        .and(path("/calendars/alice/work/"))
        .and(header("Depth", "0"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\"
               xmlns:CS=\"http://calendarserver.org/ns/\">
  <D:response>
    <D:href>/calendars/alice/work/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
        <D:displayname>Work</D:displayname>
        <CS:getctag>ctag-1</CS:getctag>
        <C:supported-calendar-component-set>
          <C:comp name=\"VEVENT\"/>
          <C:comp name=\"VTODO\"/>
        </C:supported-calendar-component-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(server)
        .await;
}

async fn connect(server: &MockServer) -> DavClient {
    mount_probe(server).await;
    let mut config = DavConfig::new(server.uri());
    config.principal = Some("alice".to_string());
    let (client, _features) = DavConnector::new(config)
        .begin(Credentials::None)
        .await
        .expect("Failed to begin session");
    client
}

fn calendar_store(client: DavClient) -> CalendarStore {
    CalendarStore::new(client, Arc::new(GenericResolver))
}

#[tokio::test]
#[ignore = "require network"]
async fn lists_calendar_collections() {
    let mock_server = MockServer::start().await;
    mount_calendar_home(&mock_server).await;

    Mock::given(method("PROPFIND"))
        .and(path("/calendars/alice/"))
        .and(header("Depth", "1"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\"
               xmlns:CS=\"http://calendarserver.org/ns/\">
  <D:response>
    <D:href>/calendars/alice/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/calendars/alice/work/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
        <D:displayname>Work</D:displayname>
        <CS:getctag>ctag-1</CS:getctag>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/calendars/alice/inbox/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/><C:schedule-inbox/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let store = calendar_store(connect(&mock_server).await);
    let collections = store.collections().await.expect("Failed to list calendars");

    assert_eq!(collections.len(), 1);
    let work = &collections[0];
    assert_eq!(work.path().as_str(), "/calendars/alice/work/");
    assert_eq!(work.kind(), StoreKind::Calendar);
    assert_eq!(work.display_name(), Some("Work"));
    assert_eq!(work.ctag(), Some("ctag-1"));
}

#[tokio::test]
#[ignore = "require network"]
async fn fetches_collection_by_identifier() {
    let mock_server = MockServer::start().await;
    mount_calendar_home(&mock_server).await;
    mount_work_calendar(&mock_server).await;

    let store = calendar_store(connect(&mock_server).await);
    let work = store
        .collection("work")
        .await
        .expect("Failed to fetch calendar");

    assert_eq!(work.path().as_str(), "/calendars/alice/work/");
    assert_eq!(work.display_name(), Some("Work"));
    assert_eq!(work.supported_components(), ["VEVENT", "VTODO"]);
}

#[tokio::test]
#[ignore = "require network"]
async fn missing_collection_is_not_found() {
    let mock_server = MockServer::start().await;
    mount_calendar_home(&mock_server).await;

    // The path exists but is a plain collection, not a calendar.
    Mock::given(method("PROPFIND"))
        .and(path("/calendars/alice/attic/"))
        .and(header("Depth", "0"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\">
  <D:response>
    <D:href>/calendars/alice/attic/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let store = calendar_store(connect(&mock_server).await);
    let result = store.collection("attic").await;
    assert!(matches!(result, Err(DavError::NotFound(_))));
}

#[tokio::test]
#[ignore = "require network"]
async fn empty_reply_is_not_found() {
    let mock_server = MockServer::start().await;
    mount_calendar_home(&mock_server).await;

    Mock::given(method("PROPFIND"))
        .and(path("/calendars/alice/void/"))
        .and(header("Depth", "0"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n\
             <D:multistatus xmlns:D=\"DAV:\"></D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let store = calendar_store(connect(&mock_server).await);
    let result = store.collection("void").await;
    assert!(matches!(result, Err(DavError::NotFound(_))));
}

#[tokio::test]
#[ignore = "require network"]
async fn add_calendar_sends_mkcalendar() {
    let mock_server = MockServer::start().await;
    mount_calendar_home(&mock_server).await;

    Mock::given(method("MKCALENDAR"))
        .and(path("/calendars/alice/fresh/"))
        .and(body_string_contains("<D:displayname>Fresh</D:displayname>"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = calendar_store(connect(&mock_server).await);
    let properties = davbridge_client::CollectionProperties {
        display_name: Some("Fresh".to_string()),
        ..Default::default()
    };
    let fresh = store
        .add_collection_with("fresh", &properties)
        .await
        .expect("Failed to create calendar");

    assert_eq!(fresh.path().as_str(), "/calendars/alice/fresh/");
    assert!(fresh.properties().is_empty());
}

#[tokio::test]
#[ignore = "require network"]
async fn add_address_book_uses_extended_mkcol() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .and(path("/principals/users/alice/"))
        .and(header("Depth", "0"))
        .and(body_string_contains("addressbook-home-set"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:A=\"urn:ietf:params:xml:ns:carddav\">
  <D:response>
    <D:href>/principals/users/alice/</D:href>
    <D:propstat>
      <D:prop>
        <A:addressbook-home-set><D:href>/addressbooks/alice/</D:href></A:addressbook-home-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("MKCOL"))
        .and(path("/addressbooks/alice/team/"))
        .and(body_string_contains("addressbook"))
        .and(body_string_contains("<D:displayname>Team</D:displayname>"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = AddressBookStore::new(connect(&mock_server).await, Arc::new(GenericResolver));
    let properties = davbridge_client::CollectionProperties {
        display_name: Some("Team".to_string()),
        ..Default::default()
    };
    let team = store
        .add_collection_with("team", &properties)
        .await
        .expect("Failed to create address book");

    assert_eq!(team.path().as_str(), "/addressbooks/alice/team/");
    assert_eq!(team.kind(), StoreKind::AddressBook);
}

#[tokio::test]
#[ignore = "require network"]
async fn remove_collection_checks_kind_first() {
    let mock_server = MockServer::start().await;
    mount_calendar_home(&mock_server).await;
    mount_work_calendar(&mock_server).await;

    Mock::given(method("DELETE"))
        .and(path("/calendars/alice/work/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = calendar_store(connect(&mock_server).await);
    store
        .remove_collection("work")
        .await
        .expect("Failed to remove calendar");
}

#[tokio::test]
#[ignore = "require network"]
async fn remove_missing_collection_never_deletes() {
    let mock_server = MockServer::start().await;
    mount_calendar_home(&mock_server).await;

    Mock::given(method("PROPFIND"))
        .and(path("/calendars/alice/void/"))
        .and(header("Depth", "0"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n\
             <D:multistatus xmlns:D=\"DAV:\"></D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/calendars/alice/void/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = calendar_store(connect(&mock_server).await);
    let result = store.remove_collection("void").await;
    assert!(matches!(result, Err(DavError::NotFound(_))));
}

#[tokio::test]
#[ignore = "require network"]
async fn merge_is_not_supported() {
    let mock_server = MockServer::start().await;
    let store = calendar_store(connect(&mock_server).await);

    let result = store.merge("work", "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n");
    assert!(matches!(result, Err(DavError::Unsupported(_))));
}

#[tokio::test]
#[ignore = "require network"]
async fn prod_id_override_replaces_default() {
    let mock_server = MockServer::start().await;
    let store = calendar_store(connect(&mock_server).await);
    assert!(store.prod_id().starts_with("-//davbridge//"));

    let store = store.with_prod_id("-//Acme//calendar 1.0//EN");
    assert_eq!(store.prod_id(), "-//Acme//calendar 1.0//EN");
}

#[tokio::test]
#[ignore = "require network"]
async fn home_set_keeps_server_href() {
    let mock_server = MockServer::start().await;
    mount_calendar_home(&mock_server).await;

    let store = calendar_store(connect(&mock_server).await);
    let home = store.home_set().await.expect("Failed to resolve home");

    assert_eq!(home.href.as_str(), "/calendars/alice/");
    assert_eq!(home.display_name.as_deref(), Some("Alice"));
}

#[tokio::test]
#[ignore = "require network"]
async fn delegated_calendars_follow_proxy_grants() {
    let mock_server = MockServer::start().await;
    mount_calendar_home(&mock_server).await;

    // Alice holds write access to Bob's calendars.
    Mock::given(method("REPORT"))
        .and(path("/principals/users/alice/"))
        .and(header("Depth", "0"))
        .and(body_string_contains("expand-property"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:CS=\"http://calendarserver.org/ns/\">
  <D:response>
    <D:href>/principals/users/alice/</D:href>
    <D:propstat>
      <D:prop>
        <CS:calendar-proxy-write-for>
          <D:response>
            <D:href>/principals/users/bob/</D:href>
            <D:propstat>
              <D:prop>
                <D:displayname>Bob</D:displayname>
                <D:principal-URL><D:href>/principals/users/bob/</D:href></D:principal-URL>
              </D:prop>
              <D:status>HTTP/1.1 200 OK</D:status>
            </D:propstat>
          </D:response>
        </CS:calendar-proxy-write-for>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("PROPFIND"))
        .and(path("/principals/users/bob/"))
        .and(header("Depth", "0"))
        .and(body_string_contains("calendar-home-set"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\">
  <D:response>
    <D:href>/principals/users/bob/</D:href>
    <D:propstat>
      <D:prop>
        <C:calendar-home-set><D:href>/calendars/bob/</D:href></C:calendar-home-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("PROPFIND"))
        .and(path("/calendars/bob/"))
        .and(header("Depth", "1"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\">
  <D:response>
    <D:href>/calendars/bob/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/calendars/bob/team/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
        <D:displayname>Team</D:displayname>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let store = calendar_store(connect(&mock_server).await);
    let delegated = store
        .delegated_collections()
        .await
        .expect("Failed to list delegated calendars");

    assert_eq!(delegated.len(), 1);
    assert_eq!(delegated[0].path().as_str(), "/calendars/bob/team/");
    assert_eq!(delegated[0].display_name(), Some("Team"));
}

#[tokio::test]
#[ignore = "require network"]
async fn rejected_delegation_report_means_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("REPORT"))
        .and(path("/principals/users/alice/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let store = calendar_store(connect(&mock_server).await);
    let delegated = store
        .delegated_collections()
        .await
        .expect("Failed to list delegated calendars");
    assert!(delegated.is_empty());
}

#[tokio::test]
#[ignore = "require network"]
async fn delegations_order_write_before_read() {
    let mock_server = MockServer::start().await;

    Mock::given(method("REPORT"))
        .and(path("/principals/users/alice/"))
        .and(body_string_contains("calendar-proxy-read-for"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:CS=\"http://calendarserver.org/ns/\">
  <D:response>
    <D:href>/principals/users/alice/</D:href>
    <D:propstat>
      <D:prop>
        <CS:calendar-proxy-read-for>
          <D:response>
            <D:href>/principals/users/carol/</D:href>
            <D:propstat>
              <D:prop><D:displayname>Carol</D:displayname></D:prop>
              <D:status>HTTP/1.1 200 OK</D:status>
            </D:propstat>
          </D:response>
        </CS:calendar-proxy-read-for>
        <CS:calendar-proxy-write-for>
          <D:response>
            <D:href>/principals/users/bob/</D:href>
            <D:propstat>
              <D:prop><D:displayname>Bob</D:displayname></D:prop>
              <D:status>HTTP/1.1 200 OK</D:status>
            </D:propstat>
          </D:response>
        </CS:calendar-proxy-write-for>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let client = connect(&mock_server).await;
    let delegations = davbridge_client::delegated_principals(&client, "/principals/users/alice/")
        .await
        .expect("Failed to list delegations");

    assert_eq!(delegations.len(), 2);
    assert_eq!(delegations[0].principal.as_str(), "/principals/users/bob/");
    assert_eq!(delegations[0].access, DelegationAccess::ReadWrite);
    assert_eq!(delegations[1].principal.as_str(), "/principals/users/carol/");
    assert_eq!(delegations[1].access, DelegationAccess::Read);
}

#[tokio::test]
#[ignore = "require network"]
async fn put_and_delete_objects_with_guards() {
    let mock_server = MockServer::start().await;
    mount_calendar_home(&mock_server).await;
    mount_work_calendar(&mock_server).await;

    Mock::given(method("PUT"))
        .and(path("/calendars/alice/work/event1.ics"))
        .and(header("if-none-match", "*"))
        .and(header("Content-Type", "text/calendar; charset=utf-8"))
        .respond_with(ResponseTemplate::new(201).insert_header("ETag", "\"v1\""))
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/calendars/alice/work/event1.ics"))
        .and(header("if-match", "\"v1\""))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let store = calendar_store(connect(&mock_server).await);
    let work = store
        .collection("work")
        .await
        .expect("Failed to fetch calendar");

    let etag = work
        .put_object("event1.ics", "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n", None)
        .await
        .expect("Failed to store object")
        .expect("Server reported no entity tag");
    assert_eq!(etag.as_str(), "\"v1\"");

    work.delete_object("event1.ics", Some(&ETag::new("\"v1\"".to_string())))
        .await
        .expect("Failed to delete object");
}

#[tokio::test]
#[ignore = "require network"]
async fn object_listing_excludes_collections() {
    let mock_server = MockServer::start().await;
    mount_calendar_home(&mock_server).await;
    mount_work_calendar(&mock_server).await;

    Mock::given(method("PROPFIND"))
        .and(path("/calendars/alice/work/"))
        .and(header("Depth", "1"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\">
  <D:response>
    <D:href>/calendars/alice/work/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/calendars/alice/work/event1.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>\"v1\"</D:getetag>
        <D:getcontenttype>text/calendar; charset=utf-8</D:getcontenttype>
        <D:resourcetype/>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/calendars/alice/work/event2.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>\"v2\"</D:getetag>
        <D:resourcetype/>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let store = calendar_store(connect(&mock_server).await);
    let work = store
        .collection("work")
        .await
        .expect("Failed to fetch calendar");
    let objects = work.objects().await.expect("Failed to list objects");

    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].href.as_str(), "/calendars/alice/work/event1.ics");
    assert_eq!(
        objects[0].etag.as_ref().map(|e| e.as_str().to_string()),
        Some("\"v1\"".to_string())
    );
    assert_eq!(
        objects[0].content_type.as_deref(),
        Some("text/calendar; charset=utf-8")
    );
    assert_eq!(objects[1].content_type, None);
}

#[tokio::test]
#[ignore = "require network"]
async fn multiget_fetches_named_objects() {
    let mock_server = MockServer::start().await;
    mount_calendar_home(&mock_server).await;
    mount_work_calendar(&mock_server).await;

    Mock::given(method("REPORT"))
        .and(path("/calendars/alice/work/"))
        .and(header("Depth", "1"))
        .and(body_string_contains("calendar-multiget"))
        .and(body_string_contains("/calendars/alice/work/event1.ics"))
        .and(body_string_contains("/calendars/alice/work/event2.ics"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\">
  <D:response>
    <D:href>/calendars/alice/work/event1.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>\"v1\"</D:getetag>
        <C:calendar-data>BEGIN:VCALENDAR&#13;&#10;END:VCALENDAR&#13;&#10;</C:calendar-data>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/calendars/alice/work/event2.ics</D:href>
    <D:propstat>
      <D:prop><D:getetag>\"v2\"</D:getetag></D:prop>
      <D:status>HTTP/1.1 404 Not Found</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let store = calendar_store(connect(&mock_server).await);
    let work = store
        .collection("work")
        .await
        .expect("Failed to fetch calendar");
    let objects = work
        .multiget(&["event1.ics".to_string(), "event2.ics".to_string()])
        .await
        .expect("Failed to multiget");

    // The second entry carries no data and is dropped.
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].href.as_str(), "/calendars/alice/work/event1.ics");
    assert!(objects[0].data.starts_with("BEGIN:VCALENDAR"));
}

#[tokio::test]
#[ignore = "require network"]
async fn calendar_query_rejected_on_address_books() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .and(path("/principals/users/alice/"))
        .and(body_string_contains("addressbook-home-set"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:A=\"urn:ietf:params:xml:ns:carddav\">
  <D:response>
    <D:href>/principals/users/alice/</D:href>
    <D:propstat>
      <D:prop>
        <A:addressbook-home-set><D:href>/addressbooks/alice/</D:href></A:addressbook-home-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("PROPFIND"))
        .and(path("/addressbooks/alice/contacts/"))
        .and(header("Depth", "0"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:A=\"urn:ietf:params:xml:ns:carddav\">
  <D:response>
    <D:href>/addressbooks/alice/contacts/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/><A:addressbook/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let store = AddressBookStore::new(connect(&mock_server).await, Arc::new(GenericResolver));
    let contacts = store
        .collection("contacts")
        .await
        .expect("Failed to fetch address book");

    let query = davbridge_client::CalendarQueryRequest::new().component("VEVENT");
    let result = contacts.calendar_query(&query).await;
    assert!(matches!(result, Err(DavError::Unsupported(_))));
}

#[tokio::test]
#[ignore = "require network"]
async fn free_busy_query_returns_raw_reply() {
    let mock_server = MockServer::start().await;
    mount_calendar_home(&mock_server).await;
    mount_work_calendar(&mock_server).await;

    let reply = "BEGIN:VCALENDAR\r\nBEGIN:VFREEBUSY\r\nEND:VFREEBUSY\r\nEND:VCALENDAR\r\n";
    Mock::given(method("REPORT"))
        .and(path("/calendars/alice/work/"))
        .and(body_string_contains("free-busy-query"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(reply, "text/calendar"))
        .mount(&mock_server)
        .await;

    let store = calendar_store(connect(&mock_server).await);
    let work = store
        .collection("work")
        .await
        .expect("Failed to fetch calendar");
    let busy = work
        .free_busy_query("20260101T000000Z", "20260201T000000Z")
        .await
        .expect("Failed to query free-busy");

    assert_eq!(busy, reply);
}

#[tokio::test]
#[ignore = "require network"]
async fn schedule_urls_resolved_from_principal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .and(path("/principals/users/alice/"))
        .and(body_string_contains("schedule-inbox-URL"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\">
  <D:response>
    <D:href>/principals/users/alice/</D:href>
    <D:propstat>
      <D:prop>
        <C:schedule-inbox-URL><D:href>/calendars/alice/inbox/</D:href></C:schedule-inbox-URL>
        <C:schedule-outbox-URL><D:href>/calendars/alice/outbox/</D:href></C:schedule-outbox-URL>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let store = calendar_store(connect(&mock_server).await);
    let urls = store
        .schedule_urls()
        .await
        .expect("Failed to resolve schedule URLs");

    assert_eq!(
        urls.inbox.as_ref().map(|h| h.as_str()),
        Some("/calendars/alice/inbox/")
    );
    assert_eq!(
        urls.outbox.as_ref().map(|h| h.as_str()),
        Some("/calendars/alice/outbox/")
    );
}
