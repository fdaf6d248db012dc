// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # XML Element Tree
//!
//! This module provides the namespace-aware element tree the KeyInfo
//! processor walks. It is a deliberately small DOM: elements with a resolved
//! namespace URI, unprefixed attributes, and text children, tokenized by
//! `quick-xml`.
//!
//! ## Overview
//!
//! - **Resolved namespaces**: prefixes are resolved at parse time; handlers
//!   compare `(local name, namespace URI)` pairs and never see prefixes
//! - **Two parse modes**: strict parsing for caller-supplied documents, and
//!   recovery parsing for dereferenced content where slight malformations
//!   must not abort processing
//! - **Write support**: handlers create children and set text content; the
//!   serializer re-declares `xmlns` wherever an element's namespace differs
//!   from its parent's
//!
//! ## Recovery Parsing
//!
//! `XmlDocument::parse_lenient` tolerates mismatched and stray end tags,
//! closes any still-open elements at end of input, and resolves undeclared
//! prefixes to "no namespace". Content fetched through `RetrievalMethod` or
//! `KeyInfoReference` is parsed this way.

use std::collections::HashMap;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::KeyInfoError;

/// A single XML attribute with an unprefixed name and an unescaped value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Attribute name without any namespace prefix
    pub name: String,
    /// Unescaped attribute value
    pub value: String,
}

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// A child element
    Element(XmlElement),
    /// Character data (already unescaped)
    Text(String),
}

/// An element with a resolved namespace URI, attributes, and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    local: String,
    namespace: Option<String>,
    attributes: Vec<XmlAttribute>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Creates an empty element with the given local name and namespace URI.
    pub fn new(local: impl Into<String>, namespace: Option<&str>) -> Self {
        XmlElement {
            local: local.into(),
            namespace: namespace.map(|ns| ns.to_string()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Gets the local (unprefixed) element name.
    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Gets the resolved namespace URI, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Checks the element against a `(local name, namespace URI)` pair.
    pub fn is_named(&self, local: &str, namespace: Option<&str>) -> bool {
        self.local == local && self.namespace.as_deref() == namespace
    }

    /// Looks up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Sets (or replaces) an attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(attr) = self.attributes.iter_mut().find(|a| a.name == name) {
            attr.value = value;
        } else {
            self.attributes.push(XmlAttribute { name, value });
        }
    }

    /// Gets all attributes in document order.
    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// Gets all children (elements and text) in document order.
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Iterates the element children in document order.
    pub fn element_children(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Iterates the element children mutably in document order.
    pub fn element_children_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Gets the first element child, if any.
    pub fn first_element_child(&self) -> Option<&XmlElement> {
        self.element_children().next()
    }

    /// Counts the element children.
    pub fn element_child_count(&self) -> usize {
        self.element_children().count()
    }

    /// Concatenates the direct text children.
    ///
    /// Callers that need W3C "trimmed string" semantics trim the result.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let XmlNode::Text(t) = child {
                out.push_str(t);
            }
        }
        out
    }

    /// Checks whether the element has non-whitespace text content.
    pub fn has_text_content(&self) -> bool {
        !self.text_content().trim().is_empty()
    }

    /// Replaces all children with a single text node.
    pub fn set_text(&mut self, content: impl Into<String>) {
        self.children.clear();
        self.children.push(XmlNode::Text(content.into()));
    }

    /// Removes all children.
    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    /// Appends a child element and returns a mutable reference to it.
    pub fn add_child_element(&mut self, child: XmlElement) -> &mut XmlElement {
        self.children.push(XmlNode::Element(child));
        match self.children.last_mut() {
            Some(XmlNode::Element(e)) => e,
            _ => unreachable!("element was just pushed"),
        }
    }

    /// Appends a text child.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Text(text.into()));
    }

    /// Finds a descendant (or self) whose `Id`, `ID`, or `id` attribute
    /// equals the given value.
    pub fn find_by_id(&self, id: &str) -> Option<&XmlElement> {
        let own = self
            .attribute("Id")
            .or_else(|| self.attribute("ID"))
            .or_else(|| self.attribute("id"));
        if own == Some(id) {
            return Some(self);
        }
        for child in self.element_children() {
            if let Some(found) = child.find_by_id(id) {
                return Some(found);
            }
        }
        None
    }

    /// Serializes the element (and its subtree) to an XML string.
    ///
    /// Namespace declarations use the default `xmlns` form and are emitted
    /// wherever an element's namespace differs from its parent's.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        self.serialize_into(&mut out, None);
        out
    }

    fn serialize_into(&self, out: &mut String, parent_ns: Option<&str>) {
        out.push('<');
        out.push_str(&self.local);
        if self.namespace.as_deref() != parent_ns {
            out.push_str(" xmlns=\"");
            out.push_str(&escape(self.namespace.as_deref().unwrap_or("")));
            out.push('"');
        }
        for attr in &self.attributes {
            out.push(' ');
            out.push_str(&attr.name);
            out.push_str("=\"");
            out.push_str(&escape(&attr.value));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                XmlNode::Element(e) => e.serialize_into(out, self.namespace.as_deref()),
                XmlNode::Text(t) => out.push_str(&escape(t)),
            }
        }
        out.push_str("</");
        out.push_str(&self.local);
        out.push('>');
    }
}

/// A parsed XML document holding a single root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    /// Wraps an element tree as a document.
    pub fn from_root(root: XmlElement) -> Self {
        XmlDocument { root }
    }

    /// Parses a document, rejecting any well-formedness violation.
    pub fn parse(input: &str) -> Result<Self, KeyInfoError> {
        Self::parse_with_mode(input, false)
    }

    /// Parses a document in recovery mode.
    ///
    /// Mismatched or stray end tags are skipped, elements still open at end
    /// of input are closed, and undeclared namespace prefixes resolve to no
    /// namespace.
    pub fn parse_lenient(input: &str) -> Result<Self, KeyInfoError> {
        Self::parse_with_mode(input, true)
    }

    fn parse_with_mode(input: &str, lenient: bool) -> Result<Self, KeyInfoError> {
        let mut reader = Reader::from_str(input);
        let mut builder = TreeBuilder::new(lenient);
        let mut last_error_position = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    builder.open(e.name().into_inner(), collect_attributes(&e, lenient)?)?;
                }
                Ok(Event::Empty(e)) => {
                    builder.open(e.name().into_inner(), collect_attributes(&e, lenient)?)?;
                    builder.close();
                }
                Ok(Event::End(_)) => builder.close(),
                Ok(Event::Text(t)) => match t.unescape() {
                    Ok(text) => builder.text(&text),
                    Err(_) if lenient => builder.text(&String::from_utf8_lossy(&t)),
                    Err(e) => {
                        return Err(KeyInfoError::xml_parse(format!("bad character data: {}", e)));
                    }
                },
                Ok(Event::CData(t)) => {
                    let raw = String::from_utf8_lossy(&t.into_inner()).into_owned();
                    builder.text(&raw);
                }
                Ok(Event::Decl(_)) | Ok(Event::Comment(_)) | Ok(Event::PI(_)) | Ok(Event::DocType(_)) => {}
                Ok(Event::Eof) => break,
                Err(_) if lenient => {
                    // Recovery mode: skip the offending event and keep going,
                    // unless the reader stopped advancing.
                    let position = reader.buffer_position();
                    if last_error_position == Some(position) {
                        break;
                    }
                    last_error_position = Some(position);
                    continue;
                }
                Err(e) => {
                    return Err(KeyInfoError::xml_parse(format!(
                        "error at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            }
        }

        builder.finish()
    }

    /// Gets the root element.
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Gets the root element mutably.
    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.root
    }

    /// Consumes the document, returning the root element.
    pub fn into_root(self) -> XmlElement {
        self.root
    }

    /// Serializes the document to an XML string.
    pub fn to_xml_string(&self) -> String {
        self.root.to_xml_string()
    }

    /// Serializes the document to UTF-8 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_xml_string().into_bytes()
    }
}

/// Raw attribute as read from the tokenizer, before namespace resolution.
struct RawAttribute {
    key: Vec<u8>,
    value: String,
}

fn collect_attributes(
    e: &quick_xml::events::BytesStart<'_>,
    lenient: bool,
) -> Result<Vec<RawAttribute>, KeyInfoError> {
    let mut out = Vec::new();
    for attr in e.attributes().with_checks(!lenient) {
        let attr = match attr {
            Ok(a) => a,
            Err(_) if lenient => continue,
            Err(e) => return Err(KeyInfoError::xml_parse(format!("bad attribute: {}", e))),
        };
        let value = match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) if lenient => String::from_utf8_lossy(&attr.value).into_owned(),
            Err(e) => {
                return Err(KeyInfoError::xml_parse(format!("bad attribute value: {}", e)));
            }
        };
        out.push(RawAttribute {
            key: attr.key.into_inner().to_vec(),
            value,
        });
    }
    Ok(out)
}

/// Incremental tree builder maintaining the open-element and namespace
/// scoping stacks.
struct TreeBuilder {
    lenient: bool,
    stack: Vec<XmlElement>,
    // One frame per open element: declared prefix mappings plus the default
    // namespace in scope (None entry means xmlns="" undeclared it).
    ns_stack: Vec<NsFrame>,
    root: Option<XmlElement>,
    extra_roots: bool,
}

struct NsFrame {
    prefixes: HashMap<String, String>,
    default_ns: Option<Option<String>>,
}

impl TreeBuilder {
    fn new(lenient: bool) -> Self {
        TreeBuilder {
            lenient,
            stack: Vec::new(),
            ns_stack: Vec::new(),
            root: None,
            extra_roots: false,
        }
    }

    fn open(&mut self, qname: &[u8], raw_attrs: Vec<RawAttribute>) -> Result<(), KeyInfoError> {
        let mut frame = NsFrame {
            prefixes: HashMap::new(),
            default_ns: None,
        };
        let mut attributes = Vec::new();

        for attr in raw_attrs {
            let key = String::from_utf8_lossy(&attr.key).into_owned();
            if key == "xmlns" {
                frame.default_ns = Some(if attr.value.is_empty() {
                    None
                } else {
                    Some(attr.value)
                });
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                frame.prefixes.insert(prefix.to_string(), attr.value);
            } else {
                // Attribute names keep only the local part; the KeyInfo
                // vocabulary uses unprefixed attributes throughout.
                let local = key.rsplit(':').next().unwrap_or(&key).to_string();
                attributes.push(XmlAttribute {
                    name: local,
                    value: attr.value,
                });
            }
        }

        self.ns_stack.push(frame);

        let qname = String::from_utf8_lossy(qname).into_owned();
        let (prefix, local) = match qname.split_once(':') {
            Some((p, l)) => (Some(p.to_string()), l.to_string()),
            None => (None, qname),
        };
        let namespace = self.resolve_namespace(prefix.as_deref())?;

        self.stack.push(XmlElement {
            local,
            namespace,
            attributes,
            children: Vec::new(),
        });
        Ok(())
    }

    fn close(&mut self) {
        let Some(done) = self.stack.pop() else {
            return;
        };
        self.ns_stack.pop();
        self.attach(done);
    }

    fn attach(&mut self, element: XmlElement) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(XmlNode::Element(element)),
            None => {
                if self.root.is_none() {
                    self.root = Some(element);
                } else {
                    self.extra_roots = true;
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(XmlNode::Text(text.to_string()));
        }
    }

    fn resolve_namespace(&self, prefix: Option<&str>) -> Result<Option<String>, KeyInfoError> {
        match prefix {
            Some("xml") => Ok(Some("http://www.w3.org/XML/1998/namespace".to_string())),
            Some(p) => {
                for frame in self.ns_stack.iter().rev() {
                    if let Some(uri) = frame.prefixes.get(p) {
                        return Ok(Some(uri.clone()));
                    }
                }
                if self.lenient {
                    Ok(None)
                } else {
                    Err(KeyInfoError::xml_parse(format!(
                        "undeclared namespace prefix '{}'",
                        p
                    )))
                }
            }
            None => {
                for frame in self.ns_stack.iter().rev() {
                    if let Some(default_ns) = &frame.default_ns {
                        return Ok(default_ns.clone());
                    }
                }
                Ok(None)
            }
        }
    }

    fn finish(mut self) -> Result<XmlDocument, KeyInfoError> {
        if !self.stack.is_empty() {
            if !self.lenient {
                return Err(KeyInfoError::xml_parse("unexpected end of document"));
            }
            while !self.stack.is_empty() {
                self.close();
            }
        }
        if self.extra_roots && !self.lenient {
            return Err(KeyInfoError::xml_parse("document has more than one root element"));
        }
        match self.root {
            Some(root) => Ok(XmlDocument { root }),
            None => Err(KeyInfoError::xml_parse("document has no root element")),
        }
    }
}
