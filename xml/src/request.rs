// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Request body builders for WebDAV/`CalDAV`/`CardDAV` operations.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::XmlError;
use crate::names::{PropertyName, ResourceKind, ns};

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Prefix used for a well-known namespace, if any.
fn prefix_for(namespace: &str) -> Option<&'static str> {
    match namespace {
        ns::DAV => Some("D"),
        ns::CALDAV => Some("C"),
        ns::CARDDAV => Some("CARD"),
        ns::CALENDARSERVER => Some("CS"),
        _ => None,
    }
}

fn new_writer() -> XmlWriter {
    Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2)
}

fn into_xml(writer: XmlWriter) -> Result<String, XmlError> {
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| XmlError::Malformed(format!("UTF-8 error: {e}")))
}

/// Namespace declarations for a root element: `DAV:` always, the others when
/// one of `names` or `extra` needs them.
fn declarations<'a>(
    names: impl Iterator<Item = &'a PropertyName>,
    extra: &[&str],
) -> Vec<(&'static str, &'static str)> {
    let mut caldav = extra.contains(&ns::CALDAV);
    let mut carddav = extra.contains(&ns::CARDDAV);
    let mut calendarserver = extra.contains(&ns::CALENDARSERVER);
    for name in names {
        match name.namespace() {
            ns::CALDAV => caldav = true,
            ns::CARDDAV => carddav = true,
            ns::CALENDARSERVER => calendarserver = true,
            _ => {}
        }
    }

    let mut decls = vec![("xmlns:D", ns::DAV)];
    if caldav {
        decls.push(("xmlns:C", ns::CALDAV));
    }
    if carddav {
        decls.push(("xmlns:CARD", ns::CARDDAV));
    }
    if calendarserver {
        decls.push(("xmlns:CS", ns::CALENDARSERVER));
    }
    decls
}

fn root_element(tag: &str, decls: &[(&'static str, &'static str)]) -> BytesStart<'static> {
    let mut elem = BytesStart::new(tag.to_string());
    for (attr, uri) in decls {
        elem.push_attribute((*attr, *uri));
    }
    elem
}

/// Start tag for a property. Well-known namespaces use the root-declared
/// prefix; anything else declares itself with a default `xmlns`.
fn start_tag(name: &PropertyName) -> BytesStart<'static> {
    match prefix_for(name.namespace()) {
        Some(prefix) => BytesStart::new(format!("{prefix}:{}", name.local_name())),
        None => {
            let mut elem = BytesStart::new(name.local_name().to_string());
            elem.push_attribute(("xmlns", name.namespace()));
            elem
        }
    }
}

fn end_tag(name: &PropertyName) -> BytesEnd<'static> {
    match prefix_for(name.namespace()) {
        Some(prefix) => BytesEnd::new(format!("{prefix}:{}", name.local_name())),
        None => BytesEnd::new(name.local_name().to_string()),
    }
}

fn write_empty(writer: &mut XmlWriter, name: &PropertyName) -> Result<(), XmlError> {
    writer.write_event(Event::Empty(start_tag(name)))?;
    Ok(())
}

fn write_text(writer: &mut XmlWriter, name: &PropertyName, text: &str) -> Result<(), XmlError> {
    writer.write_event(Event::Start(start_tag(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(end_tag(name)))?;
    Ok(())
}

fn write_start(writer: &mut XmlWriter, tag: &str) -> Result<(), XmlError> {
    writer.write_event(Event::Start(BytesStart::new(tag.to_string())))?;
    Ok(())
}

fn write_end(writer: &mut XmlWriter, tag: &str) -> Result<(), XmlError> {
    writer.write_event(Event::End(BytesEnd::new(tag.to_string())))?;
    Ok(())
}

/// What a PROPFIND asks for (RFC 4918 section 9.1).
#[derive(Debug, Clone)]
pub enum PropFindMode {
    /// Named properties only.
    Prop(Vec<PropertyName>),
    /// All dead properties plus the live properties the server chooses.
    AllProp,
    /// Property names only, without values.
    PropName,
}

/// PROPFIND request builder.
#[derive(Debug)]
pub struct PropFindRequest {
    mode: PropFindMode,
}

impl PropFindRequest {
    /// Creates a by-name PROPFIND request with an empty property list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: PropFindMode::Prop(Vec::new()),
        }
    }

    /// Creates an `allprop` PROPFIND request.
    #[must_use]
    pub const fn allprop() -> Self {
        Self {
            mode: PropFindMode::AllProp,
        }
    }

    /// Creates a `propname` PROPFIND request.
    #[must_use]
    pub const fn propname() -> Self {
        Self {
            mode: PropFindMode::PropName,
        }
    }

    /// Creates a by-name PROPFIND request for the given properties.
    #[must_use]
    pub fn properties(names: impl IntoIterator<Item = PropertyName>) -> Self {
        Self {
            mode: PropFindMode::Prop(names.into_iter().collect()),
        }
    }

    /// Adds a property to the request.
    ///
    /// Has no effect in `allprop` or `propname` mode.
    pub fn add_property(&mut self, name: PropertyName) -> &mut Self {
        if let PropFindMode::Prop(names) = &mut self.mode {
            names.push(name);
        }
        self
    }

    /// Builds the XML body for the PROPFIND request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, XmlError> {
        let mut writer = new_writer();

        let decls = match &self.mode {
            PropFindMode::Prop(names) => declarations(names.iter(), &[]),
            PropFindMode::AllProp | PropFindMode::PropName => {
                declarations(std::iter::empty(), &[])
            }
        };

        // <D:propfind xmlns:D="DAV:" ...>
        writer.write_event(Event::Start(root_element("D:propfind", &decls)))?;

        match &self.mode {
            PropFindMode::Prop(names) => {
                write_start(&mut writer, "D:prop")?;
                for name in names {
                    write_empty(&mut writer, name)?;
                }
                write_end(&mut writer, "D:prop")?;
            }
            PropFindMode::AllProp => {
                writer.write_event(Event::Empty(BytesStart::new("D:allprop")))?;
            }
            PropFindMode::PropName => {
                writer.write_event(Event::Empty(BytesStart::new("D:propname")))?;
            }
        }

        // </D:propfind>
        write_end(&mut writer, "D:propfind")?;

        into_xml(writer)
    }
}

impl Default for PropFindRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// One change in a PROPPATCH request.
#[derive(Debug, Clone)]
pub enum PropertyChange {
    /// Set a property to a text value.
    Set(PropertyName, String),
    /// Remove a property.
    Remove(PropertyName),
}

/// PROPPATCH request builder (RFC 4918 section 9.2).
///
/// Changes are applied by the server in document order, so the builder keeps
/// the order they were added in.
#[derive(Debug, Default)]
pub struct PropertyUpdateRequest {
    changes: Vec<PropertyChange>,
}

impl PropertyUpdateRequest {
    /// Creates an empty PROPPATCH request.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    /// Appends a property set.
    #[must_use]
    pub fn set(mut self, name: PropertyName, value: impl Into<String>) -> Self {
        self.changes.push(PropertyChange::Set(name, value.into()));
        self
    }

    /// Appends a property removal.
    #[must_use]
    pub fn remove(mut self, name: PropertyName) -> Self {
        self.changes.push(PropertyChange::Remove(name));
        self
    }

    /// Whether the request carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Builds the XML body for the PROPPATCH request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, XmlError> {
        let mut writer = new_writer();

        let names = self.changes.iter().map(|c| match c {
            PropertyChange::Set(name, _) | PropertyChange::Remove(name) => name,
        });
        let decls = declarations(names, &[]);

        // <D:propertyupdate xmlns:D="DAV:" ...>
        writer.write_event(Event::Start(root_element("D:propertyupdate", &decls)))?;

        for change in &self.changes {
            match change {
                PropertyChange::Set(name, value) => {
                    write_start(&mut writer, "D:set")?;
                    write_start(&mut writer, "D:prop")?;
                    write_text(&mut writer, name, value)?;
                    write_end(&mut writer, "D:prop")?;
                    write_end(&mut writer, "D:set")?;
                }
                PropertyChange::Remove(name) => {
                    write_start(&mut writer, "D:remove")?;
                    write_start(&mut writer, "D:prop")?;
                    write_empty(&mut writer, name)?;
                    write_end(&mut writer, "D:prop")?;
                    write_end(&mut writer, "D:remove")?;
                }
            }
        }

        // </D:propertyupdate>
        write_end(&mut writer, "D:propertyupdate")?;

        into_xml(writer)
    }
}

/// MKCALENDAR request builder (RFC 4791 section 5.3.1).
#[derive(Debug, Default)]
pub struct MkCalendarRequest {
    props: Vec<(PropertyName, String)>,
}

impl MkCalendarRequest {
    /// Creates a MKCALENDAR request without initial properties.
    #[must_use]
    pub const fn new() -> Self {
        Self { props: Vec::new() }
    }

    /// Sets the display name of the new calendar.
    #[must_use]
    pub fn display_name(self, name: impl Into<String>) -> Self {
        self.property(crate::names::props::DISPLAY_NAME, name)
    }

    /// Sets the description of the new calendar.
    #[must_use]
    pub fn description(self, description: impl Into<String>) -> Self {
        self.property(crate::names::props::CALENDAR_DESCRIPTION, description)
    }

    /// Sets the timezone of the new calendar (an iCalendar VTIMEZONE object).
    #[must_use]
    pub fn timezone(self, timezone: impl Into<String>) -> Self {
        self.property(crate::names::props::CALENDAR_TIMEZONE, timezone)
    }

    /// Sets an arbitrary text property on the new calendar.
    #[must_use]
    pub fn property(mut self, name: PropertyName, value: impl Into<String>) -> Self {
        self.props.push((name, value.into()));
        self
    }

    /// Whether the request carries no initial properties.
    ///
    /// MKCALENDAR without properties is sent without a body.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Builds the XML body for the MKCALENDAR request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, XmlError> {
        let mut writer = new_writer();

        let decls = declarations(self.props.iter().map(|(n, _)| n), &[ns::CALDAV]);

        // <C:mkcalendar xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
        writer.write_event(Event::Start(root_element("C:mkcalendar", &decls)))?;

        write_start(&mut writer, "D:set")?;
        write_start(&mut writer, "D:prop")?;
        for (name, value) in &self.props {
            write_text(&mut writer, name, value)?;
        }
        write_end(&mut writer, "D:prop")?;
        write_end(&mut writer, "D:set")?;

        // </C:mkcalendar>
        write_end(&mut writer, "C:mkcalendar")?;

        into_xml(writer)
    }
}

/// Extended MKCOL request builder (RFC 5689).
///
/// Declares the resource type of the new collection in the body, which is how
/// addressbook collections are created.
#[derive(Debug)]
pub struct MkColRequest {
    kinds: Vec<ResourceKind>,
    props: Vec<(PropertyName, String)>,
}

impl MkColRequest {
    /// Creates an extended MKCOL request for the given resource types.
    ///
    /// `ResourceKind::Collection` is implied and does not need to be listed.
    #[must_use]
    pub fn new(kinds: impl IntoIterator<Item = ResourceKind>) -> Self {
        let mut all = vec![ResourceKind::Collection];
        for kind in kinds {
            if kind != ResourceKind::Collection {
                all.push(kind);
            }
        }
        Self {
            kinds: all,
            props: Vec::new(),
        }
    }

    /// Creates an extended MKCOL request for an addressbook collection.
    #[must_use]
    pub fn address_book() -> Self {
        Self::new([ResourceKind::AddressBook])
    }

    /// Sets the display name of the new collection.
    #[must_use]
    pub fn display_name(self, name: impl Into<String>) -> Self {
        self.property(crate::names::props::DISPLAY_NAME, name)
    }

    /// Sets an arbitrary text property on the new collection.
    #[must_use]
    pub fn property(mut self, name: PropertyName, value: impl Into<String>) -> Self {
        self.props.push((name, value.into()));
        self
    }

    /// Builds the XML body for the extended MKCOL request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, XmlError> {
        let mut writer = new_writer();

        let kind_namespaces: Vec<&str> = self.kinds.iter().map(|k| k.namespace()).collect();
        let decls = declarations(self.props.iter().map(|(n, _)| n), &kind_namespaces);

        // <D:mkcol xmlns:D="DAV:" ...>
        writer.write_event(Event::Start(root_element("D:mkcol", &decls)))?;

        write_start(&mut writer, "D:set")?;
        write_start(&mut writer, "D:prop")?;

        // <D:resourcetype><D:collection/>...</D:resourcetype>
        write_start(&mut writer, "D:resourcetype")?;
        for kind in &self.kinds {
            let name = PropertyName::new(kind.namespace(), kind.local_name());
            write_empty(&mut writer, &name)?;
        }
        write_end(&mut writer, "D:resourcetype")?;

        for (name, value) in &self.props {
            write_text(&mut writer, name, value)?;
        }

        write_end(&mut writer, "D:prop")?;
        write_end(&mut writer, "D:set")?;

        // </D:mkcol>
        write_end(&mut writer, "D:mkcol")?;

        into_xml(writer)
    }
}

/// Calendar query REPORT builder (RFC 4791 section 7.8).
///
/// Asks for `getetag` and `calendar-data` of every matching object.
#[derive(Debug)]
pub struct CalendarQueryRequest {
    component: Option<String>,
    time_range: Option<(String, Option<String>)>,
}

impl CalendarQueryRequest {
    /// Creates a calendar query matching every object in the collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            component: None,
            time_range: None,
        }
    }

    /// Restricts the query to one component type (VEVENT, VTODO, ...).
    #[must_use]
    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Restricts the query to a UTC time range (`YYYYMMDDTHHMMSSZ` stamps).
    ///
    /// Only applied when a component filter is set, since the range belongs
    /// to the inner component filter.
    #[must_use]
    pub fn time_range(mut self, start: impl Into<String>, end: Option<String>) -> Self {
        self.time_range = Some((start.into(), end));
        self
    }

    /// Builds the XML body for the calendar query REPORT.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, XmlError> {
        let mut writer = new_writer();

        let decls = declarations(std::iter::empty(), &[ns::CALDAV]);

        // <C:calendar-query xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
        writer.write_event(Event::Start(root_element("C:calendar-query", &decls)))?;

        write_start(&mut writer, "D:prop")?;
        writer.write_event(Event::Empty(BytesStart::new("D:getetag")))?;
        writer.write_event(Event::Empty(BytesStart::new("C:calendar-data")))?;
        write_end(&mut writer, "D:prop")?;

        // <C:filter><C:comp-filter name="VCALENDAR">
        write_start(&mut writer, "C:filter")?;
        let mut comp_filter = BytesStart::new("C:comp-filter");
        comp_filter.push_attribute(("name", "VCALENDAR"));
        writer.write_event(Event::Start(comp_filter))?;

        if let Some(component) = &self.component {
            let mut inner = BytesStart::new("C:comp-filter");
            inner.push_attribute(("name", component.as_str()));
            writer.write_event(Event::Start(inner))?;

            if let Some((start, end)) = &self.time_range {
                let mut time_range = BytesStart::new("C:time-range");
                time_range.push_attribute(("start", start.as_str()));
                if let Some(end) = end {
                    time_range.push_attribute(("end", end.as_str()));
                }
                writer.write_event(Event::Empty(time_range))?;
            }

            write_end(&mut writer, "C:comp-filter")?;
        }

        write_end(&mut writer, "C:comp-filter")?;
        write_end(&mut writer, "C:filter")?;

        // </C:calendar-query>
        write_end(&mut writer, "C:calendar-query")?;

        into_xml(writer)
    }
}

impl Default for CalendarQueryRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Multiget REPORT builder (RFC 4791 section 7.9, RFC 6352 section 8.7).
#[derive(Debug)]
pub struct MultiGetRequest {
    data_property: PropertyName,
    root: &'static str,
    hrefs: Vec<String>,
}

impl MultiGetRequest {
    /// Creates a calendar-multiget request.
    #[must_use]
    pub fn calendar() -> Self {
        Self {
            data_property: crate::names::props::CALENDAR_DATA,
            root: "C:calendar-multiget",
            hrefs: Vec::new(),
        }
    }

    /// Creates an addressbook-multiget request.
    #[must_use]
    pub fn address_book() -> Self {
        Self {
            data_property: crate::names::props::ADDRESS_DATA,
            root: "CARD:addressbook-multiget",
            hrefs: Vec::new(),
        }
    }

    /// Adds an href to the request.
    pub fn add_href(&mut self, href: impl Into<String>) -> &mut Self {
        self.hrefs.push(href.into());
        self
    }

    /// Builds the XML body for the multiget REPORT.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, XmlError> {
        let mut writer = new_writer();

        let decls = declarations(std::iter::once(&self.data_property), &[]);

        writer.write_event(Event::Start(root_element(self.root, &decls)))?;

        write_start(&mut writer, "D:prop")?;
        writer.write_event(Event::Empty(BytesStart::new("D:getetag")))?;
        write_empty(&mut writer, &self.data_property)?;
        write_end(&mut writer, "D:prop")?;

        // <D:href> for each requested object
        for href in &self.hrefs {
            write_start(&mut writer, "D:href")?;
            writer.write_event(Event::Text(BytesText::new(href.as_str())))?;
            write_end(&mut writer, "D:href")?;
        }

        write_end(&mut writer, self.root)?;

        into_xml(writer)
    }
}

/// Free/busy query REPORT builder (RFC 4791 section 7.10).
#[derive(Debug)]
pub struct FreeBusyQueryRequest {
    start: String,
    end: String,
}

impl FreeBusyQueryRequest {
    /// Creates a free/busy query for a UTC time range.
    #[must_use]
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Builds the XML body for the free/busy query REPORT.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, XmlError> {
        let mut writer = new_writer();

        let decls = declarations(std::iter::empty(), &[ns::CALDAV]);

        // <C:free-busy-query xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
        writer.write_event(Event::Start(root_element("C:free-busy-query", &decls)))?;

        // <C:time-range start="..." end="..."/>
        let mut time_range = BytesStart::new("C:time-range");
        time_range.push_attribute(("start", self.start.as_str()));
        time_range.push_attribute(("end", self.end.as_str()));
        writer.write_event(Event::Empty(time_range))?;

        // </C:free-busy-query>
        write_end(&mut writer, "C:free-busy-query")?;

        into_xml(writer)
    }
}

/// Expand-property REPORT builder (RFC 3253 section 3.8).
///
/// Asks the server to expand href-valued properties into the named
/// properties of their targets. Used for CalendarServer proxy delegation
/// discovery.
#[derive(Debug, Default)]
pub struct ExpandPropertyRequest {
    items: Vec<(PropertyName, Vec<PropertyName>)>,
}

impl ExpandPropertyRequest {
    /// Creates an empty expand-property request.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds a property to expand, with the properties to fetch from each of
    /// its targets.
    #[must_use]
    pub fn property(mut self, name: PropertyName, nested: Vec<PropertyName>) -> Self {
        self.items.push((name, nested));
        self
    }

    /// Builds the XML body for the expand-property REPORT.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, XmlError> {
        let mut writer = new_writer();

        // Property names appear as attribute values here, so only the DAV:
        // namespace needs declaring.
        let decls = declarations(std::iter::empty(), &[]);

        // <D:expand-property xmlns:D="DAV:">
        writer.write_event(Event::Start(root_element("D:expand-property", &decls)))?;

        for (name, nested) in &self.items {
            let mut property = BytesStart::new("D:property");
            property.push_attribute(("name", name.local_name()));
            property.push_attribute(("namespace", name.namespace()));
            writer.write_event(Event::Start(property))?;

            for child in nested {
                let mut inner = BytesStart::new("D:property");
                inner.push_attribute(("name", child.local_name()));
                inner.push_attribute(("namespace", child.namespace()));
                writer.write_event(Event::Empty(inner))?;
            }

            write_end(&mut writer, "D:property")?;
        }

        // </D:expand-property>
        write_end(&mut writer, "D:expand-property")?;

        into_xml(writer)
    }
}

/// Principal property search REPORT builder (RFC 3744 section 9.4).
///
/// Finds principals whose property values contain the given match text, and
/// returns the requested properties for each hit.
#[derive(Debug, Default)]
pub struct PrincipalPropertySearchRequest {
    searches: Vec<(PropertyName, String)>,
    props: Vec<PropertyName>,
}

impl PrincipalPropertySearchRequest {
    /// Creates an empty principal property search.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            searches: Vec::new(),
            props: Vec::new(),
        }
    }

    /// Adds a property to search and the text to match against it.
    #[must_use]
    pub fn search(mut self, name: PropertyName, match_text: impl Into<String>) -> Self {
        self.searches.push((name, match_text.into()));
        self
    }

    /// Adds a property to return for each matching principal.
    #[must_use]
    pub fn return_property(mut self, name: PropertyName) -> Self {
        self.props.push(name);
        self
    }

    /// Builds the XML body for the principal property search REPORT.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, XmlError> {
        let mut writer = new_writer();

        let names = self.searches.iter().map(|(n, _)| n).chain(self.props.iter());
        let decls = declarations(names, &[]);

        // <D:principal-property-search xmlns:D="DAV:" ...>
        writer.write_event(Event::Start(root_element(
            "D:principal-property-search",
            &decls,
        )))?;

        for (name, match_text) in &self.searches {
            write_start(&mut writer, "D:property-search")?;
            write_start(&mut writer, "D:prop")?;
            write_empty(&mut writer, name)?;
            write_end(&mut writer, "D:prop")?;
            write_text(&mut writer, &PropertyName::dav("match"), match_text)?;
            write_end(&mut writer, "D:property-search")?;
        }

        if !self.props.is_empty() {
            write_start(&mut writer, "D:prop")?;
            for name in &self.props {
                write_empty(&mut writer, name)?;
            }
            write_end(&mut writer, "D:prop")?;
        }

        // </D:principal-property-search>
        write_end(&mut writer, "D:principal-property-search")?;

        into_xml(writer)
    }
}
