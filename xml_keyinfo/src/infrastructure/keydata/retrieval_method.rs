// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # RetrievalMethod Handler
//!
//! `<RetrievalMethod URI="…" Type="…">` points at key data stored
//! elsewhere. Reading dereferences the URI through the transform pipeline
//! and interprets the result either as a key-data element (parsed in
//! recovery mode, since fetched content is not always pristine) or as raw
//! key material for the advertised type's binary reader.
//!
//! Dereferencing may recurse: the fetched document can itself contain a
//! `<RetrievalMethod>`. The retrieval level counter bounds that recursion;
//! it is entered before any work and exited on every path out.

use tracing::{debug, warn};

use xml_keyinfo_domain::error::KeyInfoError;
use xml_keyinfo_domain::services::key_data_registry::{KeyDataService, WriteOutcome};
use xml_keyinfo_domain::services::transform_service::TransformUsage;
use xml_keyinfo_domain::value_objects::namespaces::NS_DSIG;
use xml_keyinfo_domain::value_objects::{
    KeyDataId, KeyDataUsage, ProcessingFlags, XmlDocument, XmlElement,
};
use xml_keyinfo_domain::{Key, KeyInfoContext};

/// Identifier of the `RetrievalMethod` handler.
pub const RETRIEVAL_METHOD_ID: KeyDataId = KeyDataId("retrieval-method");

/// Handler for `<RetrievalMethod>` (DSig namespace).
///
/// Declares the XML retrieval usage so that a dereferenced document whose
/// root is another `<RetrievalMethod>` dispatches back into this handler,
/// subject to the level counter.
#[derive(Debug, Default)]
pub struct RetrievalMethodService;

impl KeyDataService for RetrievalMethodService {
    fn id(&self) -> KeyDataId {
        RETRIEVAL_METHOD_ID
    }

    fn display_name(&self) -> &'static str {
        "RetrievalMethod"
    }

    fn usage(&self) -> KeyDataUsage {
        KeyDataUsage::KEY_INFO_READ
            | KeyDataUsage::KEY_INFO_WRITE
            | KeyDataUsage::RETRIEVAL_METHOD_XML
    }

    fn node_name(&self) -> Option<&'static str> {
        Some("RetrievalMethod")
    }

    fn node_namespace(&self) -> Option<&'static str> {
        Some(NS_DSIG)
    }

    fn read_xml(
        &self,
        key: &mut Key,
        node: &XmlElement,
        ctx: &mut KeyInfoContext,
    ) -> Result<(), KeyInfoError> {
        ctx.enter_retrieval_method_level()?;
        let result = read_retrieval_method(key, node, ctx);
        ctx.exit_retrieval_method_level();
        result
    }

    fn write_xml(
        &self,
        _key: &Key,
        _node: &mut XmlElement,
        _ctx: &mut KeyInfoContext,
    ) -> Result<WriteOutcome, KeyInfoError> {
        Ok(WriteOutcome::Skipped)
    }
}

fn read_retrieval_method(
    key: &mut Key,
    node: &XmlElement,
    ctx: &mut KeyInfoContext,
) -> Result<(), KeyInfoError> {
    // Resolve the advertised type first; an unknown type short-circuits the
    // whole dereference unless the caller made it fatal.
    let type_attr = node.attribute("Type");
    let expected = match type_attr {
        Some(href) => match ctx.resolve_by_href(href, KeyDataUsage::retrieval_method()) {
            Some(service) => Some(service),
            None => {
                if ctx
                    .flags()
                    .contains(ProcessingFlags::RETRMETHOD_STOP_ON_UNKNOWN_HREF)
                {
                    return Err(KeyInfoError::invalid_attribute(format!(
                        "unknown RetrievalMethod type '{}'",
                        href
                    )));
                }
                warn!(href, "skipping RetrievalMethod with unknown type");
                return Ok(());
            }
        },
        None => None,
    };

    let uri = node.attribute("URI").map(|u| u.to_string());

    // The only element child permitted is a single <Transforms>.
    let mut children = node.element_children();
    let transforms = match children.next() {
        Some(child) if child.is_named("Transforms", Some(NS_DSIG)) => Some(child),
        Some(child) => {
            return Err(KeyInfoError::unexpected_node(format!(
                "{} inside RetrievalMethod",
                child.local_name()
            )));
        }
        None => None,
    };
    if let Some(extra) = children.next() {
        return Err(KeyInfoError::unexpected_node(format!(
            "{} after Transforms",
            extra.local_name()
        )));
    }

    let doc = ctx.source_document();
    let transform_ctx = ctx.ensure_retrieval_method_ctx();
    transform_ctx.reset();
    transform_ctx.set_uri(uri.as_deref());
    if let Some(transforms) = transforms {
        transform_ctx.parse_transforms(transforms, TransformUsage::SIGNATURE)?;
    }
    let data = transform_ctx.execute(doc.as_deref())?;
    if data.is_empty() {
        return Err(KeyInfoError::invalid_content(
            "RetrievalMethod dereference produced no data",
        ));
    }
    debug!(
        uri = uri.as_deref().unwrap_or(""),
        bytes = data.len(),
        "RetrievalMethod dereferenced"
    );

    let xml_result = expected
        .as_ref()
        .map_or(true, |s| s.usage().contains(KeyDataUsage::RETRIEVAL_METHOD_XML));
    if xml_result {
        // Fetched content is parsed in recovery mode on purpose.
        let text = String::from_utf8_lossy(&data);
        let fetched = XmlDocument::parse_lenient(&text)?;
        let root = fetched.root();
        match ctx.resolve_by_node(
            root.local_name(),
            root.namespace(),
            KeyDataUsage::RETRIEVAL_METHOD_XML,
        ) {
            Some(service) => {
                if ctx
                    .flags()
                    .contains(ProcessingFlags::RETRMETHOD_STOP_ON_MISMATCH_HREF)
                {
                    if let Some(expected) = &expected {
                        if expected.id() != service.id() {
                            return Err(KeyInfoError::type_mismatch(format!(
                                "RetrievalMethod advertised '{}' but dereferenced {}",
                                expected.display_name(),
                                root.local_name()
                            )));
                        }
                    }
                }
                service.read_xml(key, root, ctx)
            }
            None => {
                if ctx
                    .flags()
                    .contains(ProcessingFlags::KEYVALUE_STOP_ON_UNKNOWN_CHILD)
                {
                    return Err(KeyInfoError::unexpected_node(format!(
                        "unknown retrieval result {}",
                        root.local_name()
                    )));
                }
                warn!(root = root.local_name(), "ignoring unknown retrieval result");
                Ok(())
            }
        }
    } else {
        let service = expected
            .ok_or_else(|| KeyInfoError::internal("binary retrieval without a resolved type"))?;
        service.read_binary(key, &data, ctx)
    }
}
