// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # KeyValue Handler
//!
//! `<KeyValue>` wraps exactly one child element naming a concrete
//! key-value form (`<RSAKeyValue>`, `<ECKeyValue>`, ...). The handler
//! resolves the child against the registry under the key-value usage and
//! delegates; it owns only the wrapper discipline: one child, nothing
//! after it.

use tracing::{debug, warn};

use xml_keyinfo_domain::error::KeyInfoError;
use xml_keyinfo_domain::services::key_data_registry::{KeyDataService, WriteOutcome};
use xml_keyinfo_domain::value_objects::namespaces::NS_DSIG;
use xml_keyinfo_domain::value_objects::{KeyDataId, KeyDataUsage, ProcessingFlags, XmlElement};
use xml_keyinfo_domain::{Key, KeyInfoContext};

/// Identifier of the `KeyValue` handler.
pub const KEY_VALUE_ID: KeyDataId = KeyDataId("key-value");

/// Handler for `<KeyValue>` (DSig namespace).
#[derive(Debug, Default)]
pub struct KeyValueService;

impl KeyDataService for KeyValueService {
    fn id(&self) -> KeyDataId {
        KEY_VALUE_ID
    }

    fn display_name(&self) -> &'static str {
        "KeyValue"
    }

    fn usage(&self) -> KeyDataUsage {
        KeyDataUsage::KEY_INFO_READ | KeyDataUsage::KEY_INFO_WRITE
    }

    fn node_name(&self) -> Option<&'static str> {
        Some("KeyValue")
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
        let mut children = node.element_children();
        let Some(child) = children.next() else {
            // An empty KeyValue is allowed.
            return Ok(());
        };

        match ctx.resolve_by_node(child.local_name(), child.namespace(), KeyDataUsage::KEY_VALUE_READ)
        {
            Some(service) => {
                debug!(child = child.local_name(), "reading KeyValue child");
                service.read_xml(key, child, ctx)?;
            }
            None => {
                if ctx
                    .flags()
                    .contains(ProcessingFlags::KEYVALUE_STOP_ON_UNKNOWN_CHILD)
                {
                    return Err(KeyInfoError::unexpected_node(format!(
                        "unknown KeyValue child {}",
                        child.local_name()
                    )));
                }
                warn!(child = child.local_name(), "ignoring unknown KeyValue child");
            }
        }

        if let Some(extra) = children.next() {
            return Err(KeyInfoError::unexpected_node(format!(
                "{} after the KeyValue child",
                extra.local_name()
            )));
        }
        Ok(())
    }

    fn write_xml(
        &self,
        key: &Key,
        node: &mut XmlElement,
        ctx: &mut KeyInfoContext,
    ) -> Result<WriteOutcome, KeyInfoError> {
        let Some(data_id) = key.data_id() else {
            return Ok(WriteOutcome::Skipped);
        };
        let Some(service) = ctx.registry().find_by_id(data_id) else {
            return Ok(WriteOutcome::Skipped);
        };
        if !service.usage().contains(KeyDataUsage::KEY_VALUE_WRITE) {
            return Ok(WriteOutcome::Skipped);
        }
        if !ctx.is_key_data_enabled(data_id) {
            return Ok(WriteOutcome::Skipped);
        }
        if !key.matches(ctx.key_requirement()) {
            return Ok(WriteOutcome::Skipped);
        }
        let local = service.node_name().ok_or_else(|| {
            KeyInfoError::internal(format!("key data '{}' has no element form", data_id))
        })?;

        node.clear_children();
        let child = node.add_child_element(XmlElement::new(local, service.node_namespace()));
        service.write_xml(key, child, ctx)?;
        Ok(WriteOutcome::Wrote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::keydata::rsa_key_value::RsaKeyValueService;
    use std::sync::Arc;
    use xml_keyinfo_domain::entities::key::RsaPublicParams;
    use xml_keyinfo_domain::services::key_data_registry::KeyDataRegistry;

    fn context() -> KeyInfoContext {
        let mut registry = KeyDataRegistry::new();
        registry.register(Arc::new(RsaKeyValueService)).unwrap();
        KeyInfoContext::new(Arc::new(registry))
    }

    fn rsa_key() -> Key {
        Key::with_material(RsaPublicParams {
            modulus: vec![0xc3; 128],
            exponent: vec![1, 0, 1],
        })
    }

    #[test]
    fn test_read_empty_key_value_is_allowed() {
        let mut ctx = context();
        let mut key = Key::new();
        let node = XmlElement::new("KeyValue", Some(NS_DSIG));
        KeyValueService.read_xml(&mut key, &node, &mut ctx).unwrap();
        assert!(!key.is_valid());
    }

    /// Tests the unknown-child policy inside KeyValue.
    #[test]
    fn test_read_unknown_child_policy() {
        let mut ctx = context();
        let mut key = Key::new();
        let mut node = XmlElement::new("KeyValue", Some(NS_DSIG));
        node.add_child_element(XmlElement::new("MysteryKeyValue", Some(NS_DSIG)));

        KeyValueService.read_xml(&mut key, &node, &mut ctx).unwrap();

        ctx.set_flags(ProcessingFlags::KEYVALUE_STOP_ON_UNKNOWN_CHILD);
        assert!(matches!(
            KeyValueService.read_xml(&mut key, &node, &mut ctx),
            Err(KeyInfoError::UnexpectedNode(_))
        ));
    }

    /// Tests that a sibling after the key-value child is fatal.
    #[test]
    fn test_read_extra_sibling() {
        let mut ctx = context();
        let mut key = Key::new();

        let mut node = XmlElement::new("KeyValue", Some(NS_DSIG));
        let mut wrote = XmlElement::new("KeyValue", Some(NS_DSIG));
        KeyValueService
            .write_xml(&rsa_key(), &mut wrote, &mut ctx)
            .unwrap();
        node.add_child_element(wrote.first_element_child().unwrap().clone());
        node.add_child_element(XmlElement::new("ExtraElt", None));

        assert!(matches!(
            KeyValueService.read_xml(&mut key, &node, &mut ctx),
            Err(KeyInfoError::UnexpectedNode(_))
        ));
    }

    /// Tests write refusal paths and the delegating write.
    ///
    /// Validates that:
    /// - A key without a value is skipped
    /// - A key filtered out by the enabled list is skipped
    /// - A key failing the requirement is skipped
    /// - An RSA key produces an RSAKeyValue child
    #[test]
    fn test_write() {
        let mut ctx = context();
        let mut node = XmlElement::new("KeyValue", Some(NS_DSIG));

        assert_eq!(
            KeyValueService.write_xml(&Key::new(), &mut node, &mut ctx).unwrap(),
            WriteOutcome::Skipped
        );

        ctx.set_enabled_key_data(vec![KeyDataId("rsa-key-value")]).unwrap();
        let mut req_ctx = context();
        req_ctx.set_key_requirement(
            xml_keyinfo_domain::KeyRequirement::default()
                .with_key_type(xml_keyinfo_domain::KeyType::Symmetric),
        );
        assert_eq!(
            KeyValueService
                .write_xml(&rsa_key(), &mut node, &mut req_ctx)
                .unwrap(),
            WriteOutcome::Skipped
        );

        assert_eq!(
            KeyValueService.write_xml(&rsa_key(), &mut node, &mut ctx).unwrap(),
            WriteOutcome::Wrote
        );
        let child = node.first_element_child().unwrap();
        assert!(child.is_named("RSAKeyValue", Some(NS_DSIG)));
    }
}
