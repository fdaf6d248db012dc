// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # KeyInfo Driver
//!
//! The generic walk over a `<KeyInfo>` element. The driver iterates the
//! element children in document order, resolves each against the context's
//! registry (restricted to the enabled subset when one is installed), and
//! delegates to the resolved service. It knows nothing about the individual
//! child vocabularies; that knowledge lives entirely in the registered
//! services.
//!
//! ## Early Termination
//!
//! When reading, the walk stops as soon as the key under population
//! satisfies the context's requirement, unless the caller asked to keep
//! going with `DONT_STOP_ON_KEY_FOUND`. Writing always visits every child:
//! each element of the template is an independent offer to serialize.
//!
//! ## Unknown Children
//!
//! An element no service claims is ignored (lax validation) unless
//! `STOP_ON_UNKNOWN_CHILD` is set, in which case it is fatal. The same
//! policy applies in both directions.

use crate::entities::key::Key;
use crate::entities::key_info_context::KeyInfoContext;
use crate::error::KeyInfoError;
use crate::value_objects::{KeyDataUsage, ProcessingFlags, ProcessingMode, XmlElement};

/// Checks whether a read walk can stop: the caller did not opt out, the key
/// has a value, and the value satisfies the requirement.
pub fn key_is_satisfied(key: &Key, ctx: &KeyInfoContext) -> bool {
    !ctx.flags().contains(ProcessingFlags::DONT_STOP_ON_KEY_FOUND)
        && key.is_valid()
        && key.matches(ctx.key_requirement())
}

/// Populates `key` from the children of a `<KeyInfo>` element.
///
/// The context must be in read mode. The first handler failure aborts the
/// walk; a partially populated key is left as-is for the caller to inspect.
pub fn read_key_info(
    node: &XmlElement,
    key: &mut Key,
    ctx: &mut KeyInfoContext,
) -> Result<(), KeyInfoError> {
    if ctx.mode() != ProcessingMode::Read {
        return Err(KeyInfoError::internal(
            "read_key_info requires a context in read mode",
        ));
    }
    for child in node.element_children() {
        let service = ctx.resolve_by_node(
            child.local_name(),
            child.namespace(),
            KeyDataUsage::KEY_INFO_READ,
        );
        match service {
            Some(service) => service.read_xml(key, child, ctx)?,
            None => {
                if ctx.flags().contains(ProcessingFlags::STOP_ON_UNKNOWN_CHILD) {
                    return Err(KeyInfoError::unexpected_node(format!(
                        "unknown KeyInfo child {}",
                        child.local_name()
                    )));
                }
            }
        }
        if key_is_satisfied(key, ctx) {
            break;
        }
    }
    Ok(())
}

/// Populates the children of a `<KeyInfo>` template from `key`.
///
/// The context must be in write mode. Every child is visited; services
/// report `Skipped` when the key offers nothing for their element.
pub fn write_key_info(
    node: &mut XmlElement,
    key: &Key,
    ctx: &mut KeyInfoContext,
) -> Result<(), KeyInfoError> {
    if ctx.mode() != ProcessingMode::Write {
        return Err(KeyInfoError::internal(
            "write_key_info requires a context in write mode",
        ));
    }
    for child in node.element_children_mut() {
        let service = ctx.resolve_by_node(
            child.local_name(),
            child.namespace(),
            KeyDataUsage::KEY_INFO_WRITE,
        );
        match service {
            Some(service) => {
                service.write_xml(key, child, ctx)?;
            }
            None => {
                if ctx.flags().contains(ProcessingFlags::STOP_ON_UNKNOWN_CHILD) {
                    return Err(KeyInfoError::unexpected_node(format!(
                        "unknown KeyInfo child {}",
                        child.local_name()
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::key::SymmetricMaterial;
    use crate::services::key_data_registry::{KeyDataRegistry, KeyDataService, WriteOutcome};
    use crate::value_objects::namespaces::NS_DSIG;
    use crate::value_objects::KeyDataId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Service that counts invocations and populates the key on read.
    struct CountingService {
        calls: Arc<AtomicUsize>,
        populate: bool,
    }

    impl KeyDataService for CountingService {
        fn id(&self) -> KeyDataId {
            KeyDataId("counting")
        }
        fn display_name(&self) -> &'static str {
            "Counting"
        }
        fn usage(&self) -> crate::value_objects::KeyDataUsage {
            crate::value_objects::KeyDataUsage::KEY_INFO_READ
                | crate::value_objects::KeyDataUsage::KEY_INFO_WRITE
        }
        fn node_name(&self) -> Option<&'static str> {
            Some("Counting")
        }
        fn node_namespace(&self) -> Option<&'static str> {
            Some(NS_DSIG)
        }
        fn read_xml(
            &self,
            key: &mut Key,
            _node: &XmlElement,
            _ctx: &mut KeyInfoContext,
        ) -> Result<(), KeyInfoError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.populate {
                key.set_material(SymmetricMaterial::new(vec![7; 16]).into());
            }
            Ok(())
        }
        fn write_xml(
            &self,
            _key: &Key,
            _node: &mut XmlElement,
            _ctx: &mut KeyInfoContext,
        ) -> Result<WriteOutcome, KeyInfoError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(WriteOutcome::Skipped)
        }
    }

    fn setup(populate: bool) -> (Arc<AtomicUsize>, KeyInfoContext) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = KeyDataRegistry::new();
        registry
            .register(Arc::new(CountingService {
                calls: calls.clone(),
                populate,
            }))
            .unwrap();
        (calls, KeyInfoContext::new(Arc::new(registry)))
    }

    fn key_info_with_children(count: usize) -> XmlElement {
        let mut node = XmlElement::new("KeyInfo", Some(NS_DSIG));
        for _ in 0..count {
            node.add_child_element(XmlElement::new("Counting", Some(NS_DSIG)));
        }
        node
    }

    /// Tests the early-termination rule.
    ///
    /// Validates that:
    /// - A populating handler stops the walk after its first invocation
    /// - `DONT_STOP_ON_KEY_FOUND` visits every child anyway
    #[test]
    fn test_read_early_termination() {
        let (calls, mut ctx) = setup(true);
        let node = key_info_with_children(3);
        let mut key = Key::new();
        read_key_info(&node, &mut key, &mut ctx).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(key.is_valid());

        let (calls, mut ctx) = setup(true);
        ctx.set_flags(ProcessingFlags::DONT_STOP_ON_KEY_FOUND);
        let mut key = Key::new();
        read_key_info(&node, &mut key, &mut ctx).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    /// Tests lax versus strict unknown-child handling on read.
    #[test]
    fn test_read_unknown_child_policy() {
        let (_calls, mut ctx) = setup(false);
        let mut node = key_info_with_children(0);
        node.add_child_element(XmlElement::new("Foo", None));

        let mut key = Key::new();
        read_key_info(&node, &mut key, &mut ctx).unwrap();
        assert!(!key.is_valid());

        ctx.set_flags(ProcessingFlags::STOP_ON_UNKNOWN_CHILD);
        assert!(matches!(
            read_key_info(&node, &mut key, &mut ctx),
            Err(KeyInfoError::UnexpectedNode(_))
        ));
    }

    /// Tests that writing visits every child with no early termination.
    #[test]
    fn test_write_visits_all_children() {
        let (calls, mut ctx) = setup(false);
        ctx.set_mode(ProcessingMode::Write);
        let mut node = key_info_with_children(3);
        let key = Key::symmetric("k", vec![1; 16]);
        write_key_info(&mut node, &key, &mut ctx).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    /// Tests the mode precondition in both directions.
    #[test]
    fn test_mode_mismatch_is_internal_error() {
        let (_calls, mut ctx) = setup(false);
        let mut node = key_info_with_children(1);
        let mut key = Key::new();

        ctx.set_mode(ProcessingMode::Write);
        assert!(matches!(
            read_key_info(&node, &mut key, &mut ctx),
            Err(KeyInfoError::Internal(_))
        ));

        ctx.set_mode(ProcessingMode::Read);
        assert!(matches!(
            write_key_info(&mut node, &key, &mut ctx),
            Err(KeyInfoError::Internal(_))
        ));
    }

    /// Tests the restriction to enabled key data.
    #[test]
    fn test_enabled_key_data_restriction() {
        let (calls, mut ctx) = setup(false);
        ctx.set_enabled_key_data(vec![KeyDataId("counting")]).unwrap();
        let node = key_info_with_children(1);
        let mut key = Key::new();
        read_key_info(&node, &mut key, &mut ctx).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
