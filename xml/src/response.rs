// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Response parsers for WebDAV/`CalDAV`/`CardDAV` operations.
//!
//! Parsing is namespace-resolved: servers are free to pick any prefix for
//! the DAV/`CalDAV`/`CardDAV` namespaces (`D:`, `d:`, none at all), so
//! elements are matched on their resolved namespace URI plus local name,
//! never on the prefix.

use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use crate::error::XmlError;
use crate::names::{PropertyName, ResourceKind, ns, props};
use crate::types::{ETag, Href, Status};

/// A parsed `DAV:multistatus` document (RFC 4918 section 13).
#[derive(Debug, Clone, PartialEq)]
pub struct MultiStatus {
    /// The per-resource responses, in document order.
    pub responses: Vec<Response>,
}

/// One `DAV:response` element.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// The resource this response is about.
    pub href: Href,
    /// Property results grouped by status.
    pub prop_stats: Vec<PropStat>,
    /// Resource-level status, for responses without propstat groups.
    pub status: Option<Status>,
}

/// One `DAV:propstat` group: properties sharing a status.
#[derive(Debug, Clone, PartialEq)]
pub struct PropStat {
    /// The properties in this group.
    pub prop: PropertySet,
    /// The status applying to all of them.
    pub status: Status,
}

/// An ordered set of properties belonging to one resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySet {
    entries: Vec<(PropertyName, PropertyValue)>,
}

/// A parsed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// The property is present but has no content.
    Empty,
    /// Text content.
    Text(String),
    /// One or more `DAV:href` children.
    Hrefs(Vec<Href>),
    /// The resource types inside a `DAV:resourcetype` property.
    ResourceTypes(Vec<ResourceKind>),
    /// Component names from a `supported-calendar-component-set`.
    Components(Vec<String>),
    /// Nested `DAV:response` children, as returned by expand-property
    /// reports (RFC 3253 section 3.8).
    Responses(Vec<Response>),
}

impl Response {
    /// Merged properties from all 2xx propstat groups, in document order.
    ///
    /// Properties reported with a 404 propstat (asked for but absent) are
    /// not values and never appear here.
    #[must_use]
    pub fn ok_props(&self) -> PropertySet {
        let mut merged = PropertySet::default();
        for prop_stat in &self.prop_stats {
            if prop_stat.status.is_success() {
                for (name, value) in prop_stat.prop.iter() {
                    merged.push(name.clone(), value.clone());
                }
            }
        }
        merged
    }

    /// Whether any propstat group (or the resource-level status) is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.prop_stats.iter().any(|ps| ps.status.is_success())
            || self.status.as_ref().is_some_and(Status::is_success)
    }
}

impl PropertySet {
    /// Looks up a property by name. First occurrence wins.
    #[must_use]
    pub fn get(&self, name: &PropertyName) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Whether the property is present, with any value.
    #[must_use]
    pub fn contains(&self, name: &PropertyName) -> bool {
        self.get(name).is_some()
    }

    /// Text value of a property, if it has one.
    #[must_use]
    pub fn text(&self, name: &PropertyName) -> Option<&str> {
        match self.get(name) {
            Some(PropertyValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Href children of a property; empty if it has none.
    #[must_use]
    pub fn hrefs(&self, name: &PropertyName) -> &[Href] {
        match self.get(name) {
            Some(PropertyValue::Hrefs(hrefs)) => hrefs,
            _ => &[],
        }
    }

    /// First href child of a property.
    #[must_use]
    pub fn href(&self, name: &PropertyName) -> Option<&Href> {
        self.hrefs(name).first()
    }

    /// Component names of a component-set property; empty if absent.
    #[must_use]
    pub fn components(&self, name: &PropertyName) -> &[String] {
        match self.get(name) {
            Some(PropertyValue::Components(components)) => components,
            _ => &[],
        }
    }

    /// Resource kinds from the `DAV:resourcetype` property; empty if absent.
    #[must_use]
    pub fn resource_kinds(&self) -> &[ResourceKind] {
        match self.get(&props::RESOURCE_TYPE) {
            Some(PropertyValue::ResourceTypes(kinds)) => kinds,
            _ => &[],
        }
    }

    /// Nested responses of an expanded property; empty if absent.
    #[must_use]
    pub fn responses(&self, name: &PropertyName) -> &[Response] {
        match self.get(name) {
            Some(PropertyValue::Responses(responses)) => responses,
            _ => &[],
        }
    }

    /// The `DAV:getetag` value, if present.
    #[must_use]
    pub fn etag(&self) -> Option<ETag> {
        self.text(&props::GET_ETAG)
            .map(|etag| ETag::new(etag.to_string()))
    }

    /// Iterates over all entries in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, (PropertyName, PropertyValue)> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set holds no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, name: PropertyName, value: PropertyValue) {
        self.entries.push((name, value));
    }
}

impl<'a> IntoIterator for &'a PropertySet {
    type Item = &'a (PropertyName, PropertyValue);
    type IntoIter = std::slice::Iter<'a, (PropertyName, PropertyValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl MultiStatus {
    /// Parses a multi-status document.
    ///
    /// # Errors
    ///
    /// Returns an error if the XML is malformed or the root element is not
    /// `DAV:multistatus`.
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        let mut reader = new_reader(xml);

        loop {
            match read_tagged(&mut reader)? {
                Tagged::Start(tag) if tag.is_dav("multistatus") => break,
                Tagged::Start(_) | Tagged::Empty(_) | Tagged::Eof => {
                    return Err(XmlError::UnexpectedStructure("missing multistatus root"));
                }
                _ => {}
            }
        }

        let mut responses = Vec::new();
        loop {
            match read_tagged(&mut reader)? {
                Tagged::Start(tag) if tag.is_dav("response") => {
                    responses.push(read_response(&mut reader)?);
                }
                Tagged::Start(_) => skip_element(&mut reader)?,
                Tagged::End(tag) if tag.is_dav("multistatus") => break,
                Tagged::Eof => return Err(XmlError::UnexpectedEof),
                _ => {}
            }
        }

        Ok(Self { responses })
    }
}

/// One recipient's answer in a scheduling response (RFC 6638 section 8.1).
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleResponse {
    /// The calendar user address the answer is about.
    pub recipient: Href,
    /// The iTIP request status, e.g. `2.0;Success`. Empty if omitted.
    pub request_status: String,
    /// Free/busy or scheduling data for the recipient, if any.
    pub calendar_data: Option<String>,
}

impl ScheduleResponse {
    /// Parses a `CalDAV` `schedule-response` document into its per-recipient
    /// entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the XML is malformed or the root element is not
    /// a `CalDAV` `schedule-response`.
    pub fn parse_all(xml: &str) -> Result<Vec<Self>, XmlError> {
        let mut reader = new_reader(xml);

        loop {
            match read_tagged(&mut reader)? {
                Tagged::Start(tag) if tag.is(ns::CALDAV, "schedule-response") => break,
                Tagged::Start(_) | Tagged::Empty(_) | Tagged::Eof => {
                    return Err(XmlError::UnexpectedStructure(
                        "missing schedule-response root",
                    ));
                }
                _ => {}
            }
        }

        let mut out = Vec::new();
        loop {
            match read_tagged(&mut reader)? {
                Tagged::Start(tag) if tag.is(ns::CALDAV, "response") => {
                    out.push(read_schedule_item(&mut reader)?);
                }
                Tagged::Start(_) => skip_element(&mut reader)?,
                Tagged::End(tag) if tag.is(ns::CALDAV, "schedule-response") => break,
                Tagged::Eof => return Err(XmlError::UnexpectedEof),
                _ => {}
            }
        }

        Ok(out)
    }
}

fn read_schedule_item(reader: &mut NsReader<&[u8]>) -> Result<ScheduleResponse, XmlError> {
    let mut recipient: Option<Href> = None;
    let mut request_status = None;
    let mut calendar_data = None;

    loop {
        match read_tagged(reader)? {
            Tagged::Start(tag) if tag.is(ns::CALDAV, "recipient") => {
                // Either a DAV:href child (RFC 6638) or bare text.
                let mut href = None;
                let mut text = String::new();
                loop {
                    match read_tagged(reader)? {
                        Tagged::Start(t) if t.is_dav("href") => {
                            href = Some(read_text_until(reader, "href")?);
                        }
                        Tagged::Start(_) => skip_element(reader)?,
                        Tagged::Text(t) => text.push_str(&t),
                        Tagged::End(t) if t.is(ns::CALDAV, "recipient") => break,
                        Tagged::Eof => return Err(XmlError::UnexpectedEof),
                        _ => {}
                    }
                }
                recipient = Some(Href::new(href.unwrap_or(text)));
            }
            Tagged::Start(tag) if tag.is(ns::CALDAV, "request-status") => {
                request_status = Some(read_text_until(reader, "request-status")?);
            }
            Tagged::Start(tag) if tag.is(ns::CALDAV, "calendar-data") => {
                calendar_data = Some(read_text_until(reader, "calendar-data")?);
            }
            Tagged::Start(_) => skip_element(reader)?,
            Tagged::End(tag) if tag.is(ns::CALDAV, "response") => break,
            Tagged::Eof => return Err(XmlError::UnexpectedEof),
            _ => {}
        }
    }

    Ok(ScheduleResponse {
        recipient: recipient.ok_or(XmlError::UnexpectedStructure(
            "schedule response without recipient",
        ))?,
        request_status: request_status.unwrap_or_default(),
        calendar_data,
    })
}

// Parser internals. Every event is converted to an owned `Tagged` value
// right away so the borrow of the reader never outlives one read.

struct Tag {
    ns: String,
    local: String,
    name_attr: Option<String>,
}

impl Tag {
    fn is(&self, namespace: &str, local: &str) -> bool {
        self.ns == namespace && self.local == local
    }

    fn is_dav(&self, local: &str) -> bool {
        self.is(ns::DAV, local)
    }

    fn property_name(&self) -> PropertyName {
        PropertyName::new(self.ns.clone(), self.local.clone())
    }
}

enum Tagged {
    Start(Tag),
    Empty(Tag),
    End(Tag),
    Text(String),
    Eof,
}

fn new_reader(xml: &str) -> NsReader<&[u8]> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);
    reader.config_mut().check_end_names = true;
    reader
}

fn resolved_ns(result: &ResolveResult<'_>) -> String {
    match result {
        ResolveResult::Bound(namespace) => {
            String::from_utf8_lossy(namespace.as_ref()).into_owned()
        }
        _ => String::new(),
    }
}

fn read_tagged(reader: &mut NsReader<&[u8]>) -> Result<Tagged, XmlError> {
    loop {
        let (result, event) = reader.read_resolved_event()?;
        let tagged = match event {
            Event::Start(e) => Tagged::Start(Tag {
                ns: resolved_ns(&result),
                local: String::from_utf8_lossy(e.local_name().into_inner()).into_owned(),
                name_attr: name_attribute(&e),
            }),
            Event::Empty(e) => Tagged::Empty(Tag {
                ns: resolved_ns(&result),
                local: String::from_utf8_lossy(e.local_name().into_inner()).into_owned(),
                name_attr: name_attribute(&e),
            }),
            Event::End(e) => Tagged::End(Tag {
                ns: resolved_ns(&result),
                local: String::from_utf8_lossy(e.local_name().into_inner()).into_owned(),
                name_attr: None,
            }),
            Event::Text(t) => {
                let text = t.decode()?.into_owned();
                if text.is_empty() {
                    continue;
                }
                Tagged::Text(text)
            }
            Event::CData(t) => Tagged::Text(String::from_utf8_lossy(&t.into_inner()).into_owned()),
            Event::GeneralRef(e) => {
                let name = String::from_utf8_lossy(&e.into_inner()).into_owned();
                match resolve_reference(&name) {
                    Some(ch) => Tagged::Text(ch.to_string()),
                    None => continue,
                }
            }
            Event::Eof => Tagged::Eof,
            _ => continue,
        };
        return Ok(tagged);
    }
}

/// Resolves predefined entity and character references.
fn resolve_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn name_attribute(e: &quick_xml::events::BytesStart<'_>) -> Option<String> {
    match e.try_get_attribute("name") {
        Ok(Some(attr)) => Some(String::from_utf8_lossy(&attr.value).into_owned()),
        _ => None,
    }
}

/// Consumes everything up to and including the end tag of the element whose
/// start tag was just read.
fn skip_element(reader: &mut NsReader<&[u8]>) -> Result<(), XmlError> {
    let mut depth = 1u32;
    loop {
        match read_tagged(reader)? {
            Tagged::Start(_) => depth += 1,
            Tagged::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Tagged::Eof => return Err(XmlError::UnexpectedEof),
            _ => {}
        }
    }
}

/// Accumulates text until the named end tag, skipping nested elements.
fn read_text_until(reader: &mut NsReader<&[u8]>, end_local: &str) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match read_tagged(reader)? {
            Tagged::Text(t) => text.push_str(&t),
            Tagged::Start(_) => skip_element(reader)?,
            Tagged::End(tag) if tag.local == end_local => return Ok(text),
            Tagged::Eof => return Err(XmlError::UnexpectedEof),
            _ => {}
        }
    }
}

fn read_response(reader: &mut NsReader<&[u8]>) -> Result<Response, XmlError> {
    let mut href: Option<Href> = None;
    let mut prop_stats = Vec::new();
    let mut status = None;

    loop {
        match read_tagged(reader)? {
            Tagged::Start(tag) if tag.is_dav("href") && href.is_none() => {
                href = Some(Href::new(read_text_until(reader, "href")?));
            }
            Tagged::Start(tag) if tag.is_dav("propstat") => {
                prop_stats.push(read_propstat(reader)?);
            }
            Tagged::Start(tag) if tag.is_dav("status") => {
                status = Some(Status::parse(&read_text_until(reader, "status")?)?);
            }
            Tagged::Start(_) => skip_element(reader)?,
            Tagged::End(tag) if tag.is_dav("response") => break,
            Tagged::Eof => return Err(XmlError::UnexpectedEof),
            _ => {}
        }
    }

    Ok(Response {
        href: href.ok_or(XmlError::UnexpectedStructure("response without href"))?,
        prop_stats,
        status,
    })
}

fn read_propstat(reader: &mut NsReader<&[u8]>) -> Result<PropStat, XmlError> {
    let mut prop = PropertySet::default();
    let mut status = None;

    loop {
        match read_tagged(reader)? {
            Tagged::Start(tag) if tag.is_dav("prop") => read_prop(reader, &mut prop)?,
            Tagged::Start(tag) if tag.is_dav("status") => {
                status = Some(Status::parse(&read_text_until(reader, "status")?)?);
            }
            Tagged::Start(_) => skip_element(reader)?,
            Tagged::End(tag) if tag.is_dav("propstat") => break,
            Tagged::Eof => return Err(XmlError::UnexpectedEof),
            _ => {}
        }
    }

    Ok(PropStat {
        prop,
        status: status.ok_or(XmlError::UnexpectedStructure("propstat without status"))?,
    })
}

fn read_prop(reader: &mut NsReader<&[u8]>, props: &mut PropertySet) -> Result<(), XmlError> {
    loop {
        match read_tagged(reader)? {
            Tagged::Empty(tag) => {
                let name = tag.property_name();
                props.push(name, PropertyValue::Empty);
            }
            Tagged::Start(tag) => {
                let name = tag.property_name();
                let value = read_property_value(reader, &tag)?;
                props.push(name, value);
            }
            Tagged::End(tag) if tag.is_dav("prop") => return Ok(()),
            Tagged::Eof => return Err(XmlError::UnexpectedEof),
            _ => {}
        }
    }
}

/// Reads one property's content, deciding its shape from what it holds:
/// hrefs, resource types, component names, nested responses, or text.
fn read_property_value(reader: &mut NsReader<&[u8]>, open: &Tag) -> Result<PropertyValue, XmlError> {
    if open.is_dav("resourcetype") {
        return read_resource_types(reader);
    }

    let mut text = String::new();
    let mut hrefs = Vec::new();
    let mut components = Vec::new();
    let mut responses = Vec::new();

    loop {
        match read_tagged(reader)? {
            Tagged::Text(t) => text.push_str(&t),
            Tagged::Start(tag) if tag.is_dav("href") => {
                hrefs.push(Href::new(read_text_until(reader, "href")?));
            }
            Tagged::Start(tag) if tag.is_dav("response") => {
                responses.push(read_response(reader)?);
            }
            Tagged::Start(tag) if tag.is(ns::CALDAV, "comp") => {
                if let Some(name) = tag.name_attr {
                    components.push(name);
                }
                skip_element(reader)?;
            }
            Tagged::Empty(tag) if tag.is(ns::CALDAV, "comp") => {
                if let Some(name) = tag.name_attr {
                    components.push(name);
                }
            }
            Tagged::Start(_) => skip_element(reader)?,
            Tagged::End(tag) if tag.is(&open.ns, &open.local) => break,
            Tagged::Eof => return Err(XmlError::UnexpectedEof),
            _ => {}
        }
    }

    let value = if !responses.is_empty() {
        PropertyValue::Responses(responses)
    } else if !hrefs.is_empty() {
        PropertyValue::Hrefs(hrefs)
    } else if !components.is_empty() {
        PropertyValue::Components(components)
    } else if text.is_empty() {
        PropertyValue::Empty
    } else {
        PropertyValue::Text(text)
    };
    Ok(value)
}

fn read_resource_types(reader: &mut NsReader<&[u8]>) -> Result<PropertyValue, XmlError> {
    let mut kinds = Vec::new();
    loop {
        match read_tagged(reader)? {
            Tagged::Empty(tag) => {
                if let Some(kind) = ResourceKind::from_name(&tag.ns, &tag.local) {
                    kinds.push(kind);
                }
            }
            Tagged::Start(tag) => {
                if let Some(kind) = ResourceKind::from_name(&tag.ns, &tag.local) {
                    kinds.push(kind);
                }
                skip_element(reader)?;
            }
            Tagged::End(tag) if tag.is_dav("resourcetype") => break,
            Tagged::Eof => return Err(XmlError::UnexpectedEof),
            _ => {}
        }
    }
    Ok(PropertyValue::ResourceTypes(kinds))
}
