// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # KeyInfoReference Handler
//!
//! `<KeyInfoReference URI="…">` (DSig 1.1) points at another `<KeyInfo>`
//! element, which is processed in place of the reference. Unlike
//! `<RetrievalMethod>` the target must be a `<KeyInfo>` (anything else is
//! fatal) and the element carries no transforms and no children.

use tracing::debug;

use xml_keyinfo_domain::error::KeyInfoError;
use xml_keyinfo_domain::services::key_data_registry::{KeyDataService, WriteOutcome};
use xml_keyinfo_domain::services::key_info_processor::read_key_info;
use xml_keyinfo_domain::value_objects::namespaces::{NS_DSIG, NS_DSIG11};
use xml_keyinfo_domain::value_objects::{KeyDataId, KeyDataUsage, XmlDocument, XmlElement};
use xml_keyinfo_domain::{Key, KeyInfoContext};

/// Identifier of the `KeyInfoReference` handler.
pub const KEY_INFO_REFERENCE_ID: KeyDataId = KeyDataId("key-info-reference");

/// Handler for `<KeyInfoReference>` (DSig 1.1 namespace).
#[derive(Debug, Default)]
pub struct KeyInfoReferenceService;

impl KeyDataService for KeyInfoReferenceService {
    fn id(&self) -> KeyDataId {
        KEY_INFO_REFERENCE_ID
    }

    fn display_name(&self) -> &'static str {
        "KeyInfoReference"
    }

    fn usage(&self) -> KeyDataUsage {
        KeyDataUsage::KEY_INFO_READ | KeyDataUsage::KEY_INFO_WRITE
    }

    fn node_name(&self) -> Option<&'static str> {
        Some("KeyInfoReference")
    }

    fn node_namespace(&self) -> Option<&'static str> {
        Some(NS_DSIG11)
    }

    fn read_xml(
        &self,
        key: &mut Key,
        node: &XmlElement,
        ctx: &mut KeyInfoContext,
    ) -> Result<(), KeyInfoError> {
        ctx.enter_key_info_reference_level()?;
        let result = read_key_info_reference(key, node, ctx);
        ctx.exit_key_info_reference_level();
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

fn read_key_info_reference(
    key: &mut Key,
    node: &XmlElement,
    ctx: &mut KeyInfoContext,
) -> Result<(), KeyInfoError> {
    let uri = node
        .attribute("URI")
        .ok_or_else(|| KeyInfoError::invalid_attribute("KeyInfoReference requires a URI"))?
        .to_string();

    if let Some(child) = node.element_children().next() {
        return Err(KeyInfoError::unexpected_node(format!(
            "{} inside KeyInfoReference",
            child.local_name()
        )));
    }

    let doc = ctx.source_document();
    let transform_ctx = ctx.ensure_key_info_reference_ctx();
    transform_ctx.reset();
    transform_ctx.set_uri(Some(&uri));
    let data = transform_ctx.execute(doc.as_deref())?;
    if data.is_empty() {
        return Err(KeyInfoError::invalid_content(
            "KeyInfoReference dereference produced no data",
        ));
    }

    let text = String::from_utf8_lossy(&data);
    let fetched = XmlDocument::parse_lenient(&text)?;
    let root = fetched.root();
    if !root.is_named("KeyInfo", Some(NS_DSIG)) {
        return Err(KeyInfoError::invalid_node(format!(
            "KeyInfoReference target is {}, not KeyInfo",
            root.local_name()
        )));
    }
    debug!(uri, "processing referenced KeyInfo");
    read_key_info(root, key, ctx)
}
