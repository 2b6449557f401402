//! The ResX resource-document model.
//!
//! A [`ResourceDocument`] owns the parsed markup of one `.resx` file and keeps
//! a key index over its string-typed `<data>` entries. Entries are mutated in
//! place through [`ResourceDocument::set`]; everything a conversion never
//! touches (schema boilerplate, resheaders, assembly and metadata elements,
//! XML comments, typed or mimetype entries) is carried as raw event chunks and
//! replayed verbatim on serialization.
//!
//! String-typed entries themselves are normalized: they serialize from their
//! key, attributes, value, and optional comment. Any other child of such a
//! `<data>` element (the schema allows none) is dropped on the way through.

use std::collections::{BTreeSet, HashMap};
use std::io::{BufRead, Write};

use indoc::indoc;
use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use serde::Serialize;

use crate::{error::Error, traits::Parser};

/// Template for a document created from scratch: the ResX schema declaration
/// plus the four resheaders naming the format, its version, and the
/// reader/writer type identities.
const EMPTY_RESX_TEMPLATE: &str = indoc! {r#"
    <?xml version="1.0" encoding="utf-8"?>
    <root>
      <xsd:schema id="root" xmlns="" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:msdata="urn:schemas-microsoft-com:xml-msdata">
        <xsd:import namespace="http://www.w3.org/XML/1998/namespace" />
        <xsd:element name="root" msdata:IsDataSet="true">
          <xsd:complexType>
            <xsd:choice maxOccurs="unbounded">
              <xsd:element name="metadata">
                <xsd:complexType>
                  <xsd:sequence>
                    <xsd:element name="value" type="xsd:string" minOccurs="0" />
                  </xsd:sequence>
                  <xsd:attribute name="name" use="required" type="xsd:string" />
                  <xsd:attribute name="type" type="xsd:string" />
                  <xsd:attribute name="mimetype" type="xsd:string" />
                  <xsd:attribute ref="xml:space" />
                </xsd:complexType>
              </xsd:element>
              <xsd:element name="assembly">
                <xsd:complexType>
                  <xsd:attribute name="alias" type="xsd:string" />
                  <xsd:attribute name="name" type="xsd:string" />
                </xsd:complexType>
              </xsd:element>
              <xsd:element name="data">
                <xsd:complexType>
                  <xsd:sequence>
                    <xsd:element name="value" type="xsd:string" minOccurs="0" msdata:Ordinal="1" />
                    <xsd:element name="comment" type="xsd:string" minOccurs="0" msdata:Ordinal="2" />
                  </xsd:sequence>
                  <xsd:attribute name="name" type="xsd:string" use="required" msdata:Ordinal="1" />
                  <xsd:attribute name="type" type="xsd:string" msdata:Ordinal="3" />
                  <xsd:attribute name="mimetype" type="xsd:string" msdata:Ordinal="4" />
                  <xsd:attribute ref="xml:space" />
                </xsd:complexType>
              </xsd:element>
              <xsd:element name="resheader">
                <xsd:complexType>
                  <xsd:sequence>
                    <xsd:element name="value" type="xsd:string" minOccurs="0" msdata:Ordinal="1" />
                  </xsd:sequence>
                  <xsd:attribute name="name" type="xsd:string" use="required" />
                </xsd:complexType>
              </xsd:element>
            </xsd:choice>
          </xsd:complexType>
        </xsd:element>
      </xsd:schema>
      <resheader name="resmimetype">
        <value>text/microsoft-resx</value>
      </resheader>
      <resheader name="version">
        <value>2.0</value>
      </resheader>
      <resheader name="reader">
        <value>System.Resources.ResXResourceReader, System.Windows.Forms, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089</value>
      </resheader>
      <resheader name="writer">
        <value>System.Resources.ResXResourceWriter, System.Windows.Forms, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089</value>
      </resheader>
    </root>
"#};

/// One localized string resource, snapshotted from the underlying markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceEntry {
    /// Unique entry name within the document.
    pub key: String,
    /// Text content of the `<value>` element (possibly empty, never absent).
    pub text: String,
    /// Text of the `<comment>` sibling, if the entry carries one. Comments are
    /// read from documents but never written by conversions.
    pub comment: Option<String>,
}

/// One top-level child of the document root.
#[derive(Debug)]
enum DocumentNode {
    /// A string-typed `<data>` element, parsed structurally so its value can
    /// be rewritten in place.
    Entry(EntryNode),
    /// Anything else, kept as its raw event stream and replayed verbatim.
    Raw(Vec<Event<'static>>),
}

#[derive(Debug)]
struct EntryNode {
    key: String,
    /// All attributes of the `<data>` element, in document order.
    attrs: Vec<(String, String)>,
    text: String,
    comment: Option<String>,
}

/// An in-memory ResX document with an index from entry key to its node.
///
/// The document exclusively owns its markup; [`ResourceDocument::set`]
/// mutates the indexed node directly, and serialization re-renders only entry
/// nodes while replaying every other chunk untouched.
#[derive(Debug)]
pub struct ResourceDocument {
    root_name: String,
    root_attrs: Vec<(String, String)>,
    nodes: Vec<DocumentNode>,
    index: HashMap<String, usize>,
}

impl Parser for ResourceDocument {
    /// Parse from any reader, building the key index.
    ///
    /// Fails if the markup has no root element, if a string-typed entry lacks
    /// a `name` attribute or a `<value>` child, if an entry key is empty or
    /// whitespace-only, or if string-typed entries share a key.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut xml = Reader::from_reader(reader);
        let mut buf = Vec::new();

        // Locate the root element, skipping the declaration and anything
        // else that may precede it.
        let (root_name, root_attrs, root_is_empty) = loop {
            match xml.read_event_into(&mut buf)? {
                Event::Start(e) => break (qname_string(&e), parse_attributes(&e)?, false),
                Event::Empty(e) => break (qname_string(&e), parse_attributes(&e)?, true),
                Event::Eof => {
                    return Err(Error::InvalidDocument(
                        "document has no root element".to_string(),
                    ));
                }
                _ => {}
            }
            buf.clear();
        };
        buf.clear();

        let mut nodes = Vec::new();
        if !root_is_empty {
            loop {
                match xml.read_event_into(&mut buf)? {
                    Event::Start(e) => {
                        let e = e.into_owned();
                        if e.local_name().as_ref() == b"data" {
                            let attrs = parse_attributes(&e)?;
                            if is_string_type(&attrs) {
                                nodes.push(DocumentNode::Entry(parse_entry(attrs, &mut xml)?));
                                buf.clear();
                                continue;
                            }
                        }
                        nodes.push(DocumentNode::Raw(read_raw_chunk(Event::Start(e), &mut xml)?));
                    }
                    Event::Empty(e) => {
                        let e = e.into_owned();
                        if e.local_name().as_ref() == b"data" {
                            let attrs = parse_attributes(&e)?;
                            if is_string_type(&attrs) {
                                return Err(Error::InvalidDocument(format!(
                                    "data element '{}' has no value element",
                                    attr_value(&attrs, "name").unwrap_or_default()
                                )));
                            }
                        }
                        nodes.push(DocumentNode::Raw(vec![Event::Empty(e)]));
                    }
                    Event::Text(e) => {
                        // Inter-element whitespace is regenerated on write;
                        // keep anything else.
                        if !e.iter().all(|b| b.is_ascii_whitespace()) {
                            nodes.push(DocumentNode::Raw(vec![Event::Text(e.into_owned())]));
                        }
                    }
                    Event::Comment(e) => {
                        nodes.push(DocumentNode::Raw(vec![Event::Comment(e.into_owned())]));
                    }
                    Event::CData(e) => {
                        nodes.push(DocumentNode::Raw(vec![Event::CData(e.into_owned())]));
                    }
                    Event::End(_) => break,
                    Event::Eof => {
                        return Err(Error::InvalidDocument(
                            "unexpected end of document".to_string(),
                        ));
                    }
                    _ => {}
                }
                buf.clear();
            }
        }

        let index = build_index(&nodes)?;
        Ok(ResourceDocument {
            root_name,
            root_attrs,
            nodes,
            index,
        })
    }

    /// Write to any writer (file, memory, etc.).
    ///
    /// Renders the XML declaration, the root with its original attributes,
    /// and every node in document order. Raw chunks are replayed with
    /// duplicate in-scope namespace declarations collapsed; entry nodes are
    /// rendered with the template's two-space indentation.
    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut xml = Writer::new(&mut writer);

        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        xml.write_event(Event::Text(BytesText::new("\n")))?;

        let mut root = BytesStart::new(self.root_name.clone());
        for (key, value) in &self.root_attrs {
            root.push_attribute((key.as_str(), value.as_str()));
        }
        xml.write_event(Event::Start(root))?;

        let mut scope = NamespaceScope::seeded(&self.root_attrs);
        for node in &self.nodes {
            xml.write_event(Event::Text(BytesText::new("\n  ")))?;
            match node {
                DocumentNode::Entry(entry) => write_entry(&mut xml, entry)?,
                DocumentNode::Raw(events) => write_raw(&mut xml, events, &mut scope)?,
            }
        }

        xml.write_event(Event::Text(BytesText::new("\n")))?;
        xml.write_event(Event::End(BytesEnd::new(self.root_name.clone())))?;
        Ok(())
    }
}

impl ResourceDocument {
    /// Creates a document seeded from the embedded empty template: schema
    /// boilerplate, four resheaders, zero entries.
    pub fn empty() -> Self {
        Self::from_str(EMPTY_RESX_TEMPLATE).expect("embedded ResX template is valid")
    }

    /// Returns the text of the entry with the given key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).and_then(|&pos| match &self.nodes[pos] {
            DocumentNode::Entry(entry) => Some(entry.text.as_str()),
            DocumentNode::Raw(_) => None,
        })
    }

    /// Creates or updates the entry with the given key.
    ///
    /// An existing entry has its text replaced in place; every other
    /// attribute and its comment sibling are left untouched. A new entry is
    /// appended after all existing nodes as a minimal `<data>` element with
    /// the key as its name, an `xml:space="preserve"` marker, and a `<value>`
    /// child, and is added to the index.
    ///
    /// A `None` value stores empty text; ResX has no notion of an absent
    /// value on a present entry.
    pub fn set(&mut self, key: &str, value: Option<&str>) -> Result<(), Error> {
        if key.trim().is_empty() {
            return Err(Error::EmptyKey);
        }

        let text = value.unwrap_or_default().to_string();
        if let Some(&pos) = self.index.get(key) {
            if let DocumentNode::Entry(entry) = &mut self.nodes[pos] {
                entry.text = text;
            }
            return Ok(());
        }

        self.nodes.push(DocumentNode::Entry(EntryNode {
            key: key.to_string(),
            attrs: vec![
                ("name".to_string(), key.to_string()),
                ("xml:space".to_string(), "preserve".to_string()),
            ],
            text,
            comment: None,
        }));
        self.index.insert(key.to_string(), self.nodes.len() - 1);
        Ok(())
    }

    /// Snapshot of all string-typed entries, in document order.
    pub fn entries(&self) -> Vec<ResourceEntry> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                DocumentNode::Entry(entry) => Some(ResourceEntry {
                    key: entry.key.clone(),
                    text: entry.text.clone(),
                    comment: entry.comment.clone(),
                }),
                DocumentNode::Raw(_) => None,
            })
            .collect()
    }
}

fn qname_string(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn parse_attributes(e: &BytesStart) -> Result<Vec<(String, String)>, Error> {
    let mut attrs = Vec::new();
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|err| Error::InvalidDocument(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}

fn attr_value<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Classification per the ResX convention: an entry with no `type` attribute
/// is a string unless it carries a `mimetype` (non-text payload); an explicit
/// `type` makes it a string only when empty or a `String` type name.
fn is_string_type(attrs: &[(String, String)]) -> bool {
    if let Some(ty) = attr_value(attrs, "type") {
        return ty.is_empty()
            || ty
                .as_bytes()
                .get(..6)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(b"string"));
    }
    attr_value(attrs, "mimetype").is_none()
}

/// Parses the children of an already-opened string-typed `<data>` element,
/// consuming through its end tag.
fn parse_entry<R: BufRead>(
    attrs: Vec<(String, String)>,
    xml: &mut Reader<R>,
) -> Result<EntryNode, Error> {
    let key = attr_value(&attrs, "name")
        .ok_or_else(|| Error::InvalidDocument("data element has no name attribute".to_string()))?
        .to_string();

    let mut text = None;
    let mut comment = None;
    let mut depth = 1usize;
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) if depth == 1 && e.local_name().as_ref() == b"value" => {
                text = Some(read_element_text(xml)?);
            }
            Event::Empty(e) if depth == 1 && e.local_name().as_ref() == b"value" => {
                text = Some(String::new());
            }
            Event::Start(e) if depth == 1 && e.local_name().as_ref() == b"comment" => {
                comment = Some(read_element_text(xml)?);
            }
            Event::Empty(e) if depth == 1 && e.local_name().as_ref() == b"comment" => {
                comment = Some(String::new());
            }
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => {
                return Err(Error::InvalidDocument(
                    "unexpected end of document".to_string(),
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    let text = text.ok_or_else(|| {
        Error::InvalidDocument(format!("data element '{key}' has no value element"))
    })?;
    Ok(EntryNode {
        key,
        attrs,
        text,
        comment,
    })
}

/// Concatenated character data of the current element, consuming through its
/// end tag. Nested elements contribute nothing.
fn read_element_text<R: BufRead>(xml: &mut Reader<R>) -> Result<String, Error> {
    let mut out = String::new();
    let mut depth = 1usize;
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Text(e) if depth == 1 => out.push_str(&e.unescape()?),
            Event::CData(e) if depth == 1 => out.push_str(&String::from_utf8_lossy(&e)),
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => {
                return Err(Error::InvalidDocument(
                    "unexpected end of document".to_string(),
                ));
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

/// Collects the event stream of an already-opened element through its
/// matching end tag.
fn read_raw_chunk<R: BufRead>(
    first: Event<'static>,
    xml: &mut Reader<R>,
) -> Result<Vec<Event<'static>>, Error> {
    let mut events = vec![first];
    let mut depth = 1usize;
    let mut buf = Vec::new();
    loop {
        let event = xml.read_event_into(&mut buf)?;
        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            Event::Eof => {
                return Err(Error::InvalidDocument(
                    "unexpected end of document".to_string(),
                ));
            }
            _ => {}
        }
        events.push(event.into_owned());
        if depth == 0 {
            break;
        }
        buf.clear();
    }
    Ok(events)
}

/// Validates the entry invariants and maps each key to its node position.
/// Empty keys are reported before duplicates; duplicates are reported all at
/// once, sorted.
fn build_index(nodes: &[DocumentNode]) -> Result<HashMap<String, usize>, Error> {
    let mut index = HashMap::new();
    let mut duplicates = BTreeSet::new();
    for (pos, node) in nodes.iter().enumerate() {
        let DocumentNode::Entry(entry) = node else {
            continue;
        };
        if entry.key.trim().is_empty() {
            return Err(Error::EmptyKey);
        }
        if index.insert(entry.key.clone(), pos).is_some() {
            duplicates.insert(entry.key.clone());
        }
    }
    if !duplicates.is_empty() {
        return Err(Error::DuplicateKeys(duplicates.into_iter().collect()));
    }
    Ok(index)
}

fn write_entry<W: Write>(xml: &mut Writer<W>, entry: &EntryNode) -> Result<(), Error> {
    let mut start = BytesStart::new("data");
    for (key, value) in &entry.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    xml.write_event(Event::Start(start))?;

    xml.write_event(Event::Text(BytesText::new("\n    ")))?;
    xml.write_event(Event::Start(BytesStart::new("value")))?;
    xml.write_event(Event::Text(BytesText::new(&entry.text)))?;
    xml.write_event(Event::End(BytesEnd::new("value")))?;

    if let Some(comment) = &entry.comment {
        xml.write_event(Event::Text(BytesText::new("\n    ")))?;
        xml.write_event(Event::Start(BytesStart::new("comment")))?;
        xml.write_event(Event::Text(BytesText::new(comment)))?;
        xml.write_event(Event::End(BytesEnd::new("comment")))?;
    }

    xml.write_event(Event::Text(BytesText::new("\n  ")))?;
    xml.write_event(Event::End(BytesEnd::new("data")))?;
    Ok(())
}

fn write_raw<W: Write>(
    xml: &mut Writer<W>,
    events: &[Event<'static>],
    scope: &mut NamespaceScope,
) -> Result<(), Error> {
    let mut depth = 0usize;
    for event in events {
        match event {
            Event::Start(e) => {
                depth += 1;
                match strip_duplicate_namespaces(e, scope, depth)? {
                    Some(stripped) => xml.write_event(Event::Start(stripped))?,
                    None => xml.write_event(event.clone())?,
                }
            }
            Event::Empty(e) => {
                // Declarations on a self-closing element scope only itself.
                match strip_duplicate_namespaces(e, scope, depth + 1)? {
                    Some(stripped) => xml.write_event(Event::Empty(stripped))?,
                    None => xml.write_event(event.clone())?,
                }
                scope.close(depth + 1);
            }
            Event::End(_) => {
                scope.close(depth);
                depth = depth.saturating_sub(1);
                xml.write_event(event.clone())?;
            }
            _ => xml.write_event(event.clone())?,
        }
    }
    Ok(())
}

/// Tracks in-scope `xmlns` declarations during serialization so that a
/// declaration repeating one already visible on an ancestor is collapsed.
struct NamespaceScope {
    /// (depth, attribute name, namespace URI); depth 0 entries come from the
    /// root element and are never popped.
    declared: Vec<(usize, String, String)>,
}

impl NamespaceScope {
    fn seeded(root_attrs: &[(String, String)]) -> Self {
        let mut declared: Vec<(usize, String, String)> = root_attrs
            .iter()
            .filter(|(key, _)| is_xmlns(key))
            .map(|(key, value)| (0, key.clone(), value.clone()))
            .collect();
        // The default namespace starts out empty, so `xmlns=""` below a root
        // that declares no default is itself redundant.
        if !declared.iter().any(|(_, key, _)| key == "xmlns") {
            declared.push((0, "xmlns".to_string(), String::new()));
        }
        NamespaceScope { declared }
    }

    fn contains(&self, key: &str, value: &str) -> bool {
        self.declared
            .iter()
            .any(|(_, k, v)| k == key && v == value)
    }

    fn close(&mut self, depth: usize) {
        self.declared.retain(|(d, _, _)| *d < depth);
    }
}

fn is_xmlns(key: &str) -> bool {
    key == "xmlns" || key.starts_with("xmlns:")
}

/// Returns a rebuilt tag with duplicate namespace declarations removed, or
/// `None` when the original event can be written as-is. New declarations are
/// recorded in the scope either way.
fn strip_duplicate_namespaces(
    e: &BytesStart<'_>,
    scope: &mut NamespaceScope,
    depth: usize,
) -> Result<Option<BytesStart<'static>>, Error> {
    let attrs = parse_attributes(e)?;
    let mut kept = Vec::with_capacity(attrs.len());
    let mut dropped = false;
    for (key, value) in attrs {
        if is_xmlns(&key) {
            if scope.contains(&key, &value) {
                dropped = true;
                continue;
            }
            scope.declared.push((depth, key.clone(), value.clone()));
        }
        kept.push((key, value));
    }

    if !dropped {
        return Ok(None);
    }
    let mut rebuilt = BytesStart::new(qname_string(e));
    for (key, value) in &kept {
        rebuilt.push_attribute((key.as_str(), value.as_str()));
    }
    Ok(Some(rebuilt))
}
