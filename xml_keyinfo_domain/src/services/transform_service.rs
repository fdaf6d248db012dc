// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Dereference Pipeline
//!
//! The transform/dereference pipeline behind `<RetrievalMethod>` and
//! `<KeyInfoReference>`. A [`TransformContext`] carries a URI, the parsed
//! transform chain, and the resolver that turns the URI into data; executing
//! it yields the bytes the caller then interprets as a key-data element or
//! raw key material.
//!
//! URI resolution is pluggable through the [`UriResolver`] seam; the
//! processing core never performs I/O itself. The transform chain recognizes
//! the base64-decode and inclusive-canonicalization algorithms; anything else
//! is refused up front at parse time rather than failing mid-execution.

use std::sync::Arc;

use bitflags::bitflags;

use crate::error::KeyInfoError;
use crate::value_objects::crypto_binary;
use crate::value_objects::namespaces::{HREF_TRANSFORM_BASE64, HREF_TRANSFORM_C14N, NS_DSIG};
use crate::value_objects::{XmlDocument, XmlElement};

/// Data flowing through the dereference pipeline.
#[derive(Debug, Clone)]
pub enum TransformData {
    /// An XML element (same-document reference or parsed content)
    Xml(XmlElement),
    /// Raw bytes
    Binary(Vec<u8>),
}

bitflags! {
    /// The transform sets a chain may be parsed for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TransformUsage: u32 {
        /// Transforms permitted inside signature structures
        const SIGNATURE = 0x0000_0001;
        /// Transforms permitted inside encryption structures
        const ENCRYPTION = 0x0000_0002;
    }
}

/// Resolves a URI to data, given the document the reference appears in.
///
/// Implementations own all I/O policy. An empty URI refers to the whole
/// source document and `#fragment` to a same-document element; everything
/// else is up to the resolver.
pub trait UriResolver: Send + Sync {
    fn resolve(&self, uri: &str, doc: Option<&XmlDocument>) -> Result<TransformData, KeyInfoError>;
}

/// A resolver that refuses every URI. Installed by default so that a
/// context without dereference support fails loudly instead of fetching.
#[derive(Debug, Default)]
pub struct NullUriResolver;

impl UriResolver for NullUriResolver {
    fn resolve(&self, uri: &str, _doc: Option<&XmlDocument>) -> Result<TransformData, KeyInfoError> {
        Err(KeyInfoError::not_supported(format!(
            "no URI resolver installed (URI '{}')",
            uri
        )))
    }
}

/// One recognized transform step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransformStep {
    Base64Decode,
    InclusiveC14n,
}

impl TransformStep {
    fn from_algorithm(href: &str) -> Option<Self> {
        match href {
            HREF_TRANSFORM_BASE64 => Some(TransformStep::Base64Decode),
            HREF_TRANSFORM_C14N => Some(TransformStep::InclusiveC14n),
            _ => None,
        }
    }

    fn allowed_usage(&self) -> TransformUsage {
        // Both recognized steps are legal in signature and encryption chains.
        TransformUsage::SIGNATURE | TransformUsage::ENCRYPTION
    }

    fn apply(&self, data: TransformData) -> Result<TransformData, KeyInfoError> {
        match self {
            TransformStep::Base64Decode => {
                let text = match data {
                    TransformData::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                    TransformData::Xml(element) => element.text_content(),
                };
                Ok(TransformData::Binary(crypto_binary::decode(&text)?))
            }
            TransformStep::InclusiveC14n => match data {
                TransformData::Xml(element) => {
                    Ok(TransformData::Binary(element.to_xml_string().into_bytes()))
                }
                TransformData::Binary(_) => Err(KeyInfoError::invalid_content(
                    "canonicalization requires XML input",
                )),
            },
        }
    }
}

/// Per-run state of one dereference: the URI to resolve and the transform
/// chain to apply to the resolved data.
pub struct TransformContext {
    resolver: Arc<dyn UriResolver>,
    uri: Option<String>,
    transforms: Vec<TransformStep>,
}

impl TransformContext {
    /// Creates a context bound to a resolver.
    pub fn new(resolver: Arc<dyn UriResolver>) -> Self {
        TransformContext {
            resolver,
            uri: None,
            transforms: Vec::new(),
        }
    }

    /// Clears the URI and transform chain; the resolver is retained.
    pub fn reset(&mut self) {
        self.uri = None;
        self.transforms.clear();
    }

    /// Installs the URI to dereference. `None` behaves like an empty URI.
    pub fn set_uri(&mut self, uri: Option<&str>) {
        self.uri = uri.map(|u| u.to_string());
    }

    /// Gets the installed URI.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Parses a `<Transforms>` element into the chain.
    ///
    /// Every child must be a `<Transform Algorithm="…">` in the DSig
    /// namespace naming a recognized algorithm permitted for `usage`.
    pub fn parse_transforms(
        &mut self,
        node: &XmlElement,
        usage: TransformUsage,
    ) -> Result<(), KeyInfoError> {
        if !node.is_named("Transforms", Some(NS_DSIG)) {
            return Err(KeyInfoError::invalid_node(format!(
                "expected Transforms, found {}",
                node.local_name()
            )));
        }
        for child in node.element_children() {
            if !child.is_named("Transform", Some(NS_DSIG)) {
                return Err(KeyInfoError::unexpected_node(format!(
                    "{} inside Transforms",
                    child.local_name()
                )));
            }
            let algorithm = child.attribute("Algorithm").ok_or_else(|| {
                KeyInfoError::invalid_attribute("Transform requires an Algorithm attribute")
            })?;
            let step = TransformStep::from_algorithm(algorithm).ok_or_else(|| {
                KeyInfoError::not_supported(format!("transform algorithm '{}'", algorithm))
            })?;
            if !step.allowed_usage().intersects(usage) {
                return Err(KeyInfoError::not_supported(format!(
                    "transform '{}' not permitted here",
                    algorithm
                )));
            }
            self.transforms.push(step);
        }
        Ok(())
    }

    /// Resolves the URI against `doc` and folds the transform chain,
    /// serializing an XML result to bytes at the end.
    pub fn execute(&self, doc: Option<&XmlDocument>) -> Result<Vec<u8>, KeyInfoError> {
        let uri = self.uri.as_deref().unwrap_or("");
        let mut data = self.resolver.resolve(uri, doc)?;
        for step in &self.transforms {
            data = step.apply(data)?;
        }
        match data {
            TransformData::Binary(bytes) => Ok(bytes),
            TransformData::Xml(element) => Ok(element.to_xml_string().into_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::namespaces::NS_DSIG;

    /// Resolver returning a fixed payload for any URI.
    struct FixedResolver(TransformData);

    impl UriResolver for FixedResolver {
        fn resolve(&self, _uri: &str, _doc: Option<&XmlDocument>) -> Result<TransformData, KeyInfoError> {
            Ok(self.0.clone())
        }
    }

    fn transforms_node(algorithms: &[&str]) -> XmlElement {
        let mut node = XmlElement::new("Transforms", Some(NS_DSIG));
        for alg in algorithms {
            let t = node.add_child_element(XmlElement::new("Transform", Some(NS_DSIG)));
            t.set_attribute("Algorithm", *alg);
        }
        node
    }

    /// Tests base64 decoding of a resolved binary payload.
    #[test]
    fn test_execute_base64_chain() {
        let resolver = Arc::new(FixedResolver(TransformData::Binary(b"AAEC Aw==".to_vec())));
        let mut ctx = TransformContext::new(resolver);
        ctx.set_uri(Some("http://keys.example/k1"));
        ctx.parse_transforms(&transforms_node(&[HREF_TRANSFORM_BASE64]), TransformUsage::SIGNATURE)
            .unwrap();
        assert_eq!(ctx.execute(None).unwrap(), vec![0, 1, 2, 3]);
    }

    /// Tests that an XML result with no transforms serializes to bytes.
    #[test]
    fn test_execute_serializes_xml_result() {
        let element = XmlElement::new("KeyInfo", Some(NS_DSIG));
        let resolver = Arc::new(FixedResolver(TransformData::Xml(element)));
        let ctx = TransformContext::new(resolver);
        let bytes = ctx.execute(None).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("<KeyInfo"));
    }

    /// Tests transform parsing failures.
    ///
    /// Validates that:
    /// - Unknown algorithms are refused at parse time
    /// - A missing Algorithm attribute is an attribute error
    /// - Foreign children of Transforms are unexpected nodes
    #[test]
    fn test_parse_transforms_errors() {
        let resolver = Arc::new(FixedResolver(TransformData::Binary(Vec::new())));
        let mut ctx = TransformContext::new(resolver);

        let unknown = transforms_node(&["urn:example:bogus"]);
        assert!(matches!(
            ctx.parse_transforms(&unknown, TransformUsage::SIGNATURE),
            Err(KeyInfoError::NotSupported(_))
        ));

        let mut missing = XmlElement::new("Transforms", Some(NS_DSIG));
        missing.add_child_element(XmlElement::new("Transform", Some(NS_DSIG)));
        assert!(matches!(
            ctx.parse_transforms(&missing, TransformUsage::SIGNATURE),
            Err(KeyInfoError::InvalidAttribute(_))
        ));

        let mut foreign = XmlElement::new("Transforms", Some(NS_DSIG));
        foreign.add_child_element(XmlElement::new("Other", Some(NS_DSIG)));
        assert!(matches!(
            ctx.parse_transforms(&foreign, TransformUsage::SIGNATURE),
            Err(KeyInfoError::UnexpectedNode(_))
        ));
    }

    #[test]
    fn test_reset_clears_chain_and_uri() {
        let resolver = Arc::new(FixedResolver(TransformData::Binary(b"zz".to_vec())));
        let mut ctx = TransformContext::new(resolver);
        ctx.set_uri(Some("#frag"));
        ctx.parse_transforms(&transforms_node(&[HREF_TRANSFORM_C14N]), TransformUsage::SIGNATURE)
            .unwrap();
        ctx.reset();
        assert!(ctx.uri().is_none());
        // After reset the chain is empty, so the raw payload comes through.
        assert_eq!(ctx.execute(None).unwrap(), b"zz".to_vec());
    }

    #[test]
    fn test_null_resolver_refuses() {
        let ctx = TransformContext::new(Arc::new(NullUriResolver));
        assert!(matches!(ctx.execute(None), Err(KeyInfoError::NotSupported(_))));
    }
}
