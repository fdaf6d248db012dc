// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # In-Memory URI Resolver
//!
//! Dereference policy with no network: the empty URI yields the source
//! document, `#fragment` finds a same-document element by its `Id`
//! attribute, and any other URI must have been registered up front as XML
//! or binary content. Everything else fails as an invalid attribute, which
//! is what a dangling reference in a document amounts to.

use std::collections::HashMap;

use tracing::debug;

use xml_keyinfo_domain::error::KeyInfoError;
use xml_keyinfo_domain::services::transform_service::{TransformData, UriResolver};
use xml_keyinfo_domain::value_objects::{XmlDocument, XmlElement};

/// Resolver over registered content and same-document fragments.
#[derive(Default)]
pub struct InMemoryUriResolver {
    external: HashMap<String, TransformData>,
}

impl InMemoryUriResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        InMemoryUriResolver::default()
    }

    /// Registers binary content for a URI, builder style.
    pub fn with_binary(mut self, uri: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.external.insert(uri.into(), TransformData::Binary(bytes));
        self
    }

    /// Registers an XML element for a URI, builder style.
    pub fn with_xml(mut self, uri: impl Into<String>, element: XmlElement) -> Self {
        self.external.insert(uri.into(), TransformData::Xml(element));
        self
    }
}

impl UriResolver for InMemoryUriResolver {
    fn resolve(&self, uri: &str, doc: Option<&XmlDocument>) -> Result<TransformData, KeyInfoError> {
        debug!(uri, "resolving reference");
        if uri.is_empty() {
            let doc = doc.ok_or_else(|| {
                KeyInfoError::invalid_attribute("empty URI without a source document")
            })?;
            return Ok(TransformData::Xml(doc.root().clone()));
        }
        if let Some(fragment) = uri.strip_prefix('#') {
            let doc = doc.ok_or_else(|| {
                KeyInfoError::invalid_attribute(format!(
                    "same-document reference '#{}' without a source document",
                    fragment
                ))
            })?;
            return doc
                .root()
                .find_by_id(fragment)
                .cloned()
                .map(TransformData::Xml)
                .ok_or_else(|| {
                    KeyInfoError::invalid_attribute(format!(
                        "unresolved same-document reference '#{}'",
                        fragment
                    ))
                });
        }
        self.external
            .get(uri)
            .cloned()
            .ok_or_else(|| KeyInfoError::invalid_attribute(format!("unresolved URI '{}'", uri)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> XmlDocument {
        XmlDocument::parse(
            "<Envelope><KeyInfo Id=\"ki\" xmlns=\"http://www.w3.org/2000/09/xmldsig#\"/></Envelope>",
        )
        .unwrap()
    }

    /// Tests fragment resolution against the source document.
    #[test]
    fn test_fragment_resolution() {
        let resolver = InMemoryUriResolver::new();
        let doc = doc();
        match resolver.resolve("#ki", Some(&doc)).unwrap() {
            TransformData::Xml(element) => assert_eq!(element.local_name(), "KeyInfo"),
            TransformData::Binary(_) => panic!("expected XML"),
        }
        assert!(matches!(
            resolver.resolve("#missing", Some(&doc)),
            Err(KeyInfoError::InvalidAttribute(_))
        ));
        assert!(matches!(
            resolver.resolve("#ki", None),
            Err(KeyInfoError::InvalidAttribute(_))
        ));
    }

    /// Tests empty-URI and registered-content resolution.
    #[test]
    fn test_registered_and_whole_document() {
        let resolver = InMemoryUriResolver::new()
            .with_binary("http://keys.example/raw", vec![1, 2, 3])
            .with_xml("http://keys.example/ki", XmlElement::new("KeyInfo", None));
        let doc = doc();

        match resolver.resolve("", Some(&doc)).unwrap() {
            TransformData::Xml(element) => assert_eq!(element.local_name(), "Envelope"),
            TransformData::Binary(_) => panic!("expected XML"),
        }
        assert!(matches!(
            resolver.resolve("http://keys.example/raw", None).unwrap(),
            TransformData::Binary(_)
        ));
        assert!(matches!(
            resolver.resolve("http://elsewhere.example/", None),
            Err(KeyInfoError::InvalidAttribute(_))
        ));
    }
}
