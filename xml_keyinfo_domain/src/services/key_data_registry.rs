// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Data Service Interface and Registry
//!
//! The dispatch seam of the processor. Every recognized `KeyInfo` child
//! element, built-in or plugged in by the application, is a
//! [`KeyDataService`]: an identity, a usage bitset, an optional canonical
//! element name and href, and read/write callbacks in both XML and binary
//! form.
//!
//! The [`KeyDataRegistry`] is an ordered collection of services queried by
//! `(local name, namespace, usage)` or by `(href, usage)`. It is injected
//! into each processing context; there is no process-global registry, and a
//! context may further restrict dispatch to an enabled subset of the
//! registered identifiers.

use std::fmt;
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::entities::key::Key;
use crate::entities::key_info_context::KeyInfoContext;
use crate::error::KeyInfoError;
use crate::value_objects::{KeyDataId, KeyDataUsage, XmlElement};

/// What a write-direction callback did with the node it was handed.
///
/// `Skipped` is the explicit "nothing to write" signal: the handler looked
/// at the key, decided the element does not apply, and left the node alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The node was populated (or already carried the right content)
    Wrote,
    /// The key offers nothing for this element; the node was left alone
    Skipped,
}

/// A registered handler for one kind of `KeyInfo` child element.
///
/// Implementations must be stateless (`Send + Sync`); all per-run state
/// lives on the [`KeyInfoContext`] passed into every callback.
pub trait KeyDataService: Send + Sync {
    /// Gets the registry identifier of this service.
    fn id(&self) -> KeyDataId;

    /// Gets a short human-readable name for diagnostics.
    fn display_name(&self) -> &'static str;

    /// Gets the dispatch contexts this service participates in.
    fn usage(&self) -> KeyDataUsage;

    /// Gets the href identifying this kind in `RetrievalMethod` `Type`
    /// attributes, if it has one.
    fn href(&self) -> Option<&'static str> {
        None
    }

    /// Gets the canonical element local name, if this kind has an element
    /// form.
    fn node_name(&self) -> Option<&'static str> {
        None
    }

    /// Gets the canonical element namespace URI.
    fn node_namespace(&self) -> Option<&'static str> {
        None
    }

    /// Reads `node` and contributes to `key`.
    fn read_xml(
        &self,
        key: &mut Key,
        node: &XmlElement,
        ctx: &mut KeyInfoContext,
    ) -> Result<(), KeyInfoError>;

    /// Populates `node` from `key`, or reports that there is nothing to
    /// write.
    fn write_xml(
        &self,
        key: &Key,
        node: &mut XmlElement,
        ctx: &mut KeyInfoContext,
    ) -> Result<WriteOutcome, KeyInfoError>;

    /// Interprets raw bytes as key material. Only kinds with a binary form
    /// override this.
    fn read_binary(
        &self,
        _key: &mut Key,
        _data: &[u8],
        _ctx: &mut KeyInfoContext,
    ) -> Result<(), KeyInfoError> {
        Err(KeyInfoError::not_supported(format!(
            "{} has no binary reader",
            self.display_name()
        )))
    }

    /// Serializes key material to raw bytes. Only kinds with a binary form
    /// override this. The buffer is wiped when dropped.
    fn write_binary(
        &self,
        _key: &Key,
        _ctx: &mut KeyInfoContext,
    ) -> Result<Zeroizing<Vec<u8>>, KeyInfoError> {
        Err(KeyInfoError::not_supported(format!(
            "{} has no binary writer",
            self.display_name()
        )))
    }
}

impl fmt::Debug for dyn KeyDataService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyDataService({})", self.id())
    }
}

/// Ordered collection of key-data services.
#[derive(Clone, Default)]
pub struct KeyDataRegistry {
    services: Vec<Arc<dyn KeyDataService>>,
}

impl KeyDataRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        KeyDataRegistry::default()
    }

    /// Registers a service. Identifiers must be unique.
    pub fn register(&mut self, service: Arc<dyn KeyDataService>) -> Result<(), KeyInfoError> {
        if self.contains(service.id()) {
            return Err(KeyInfoError::internal(format!(
                "key data '{}' registered twice",
                service.id()
            )));
        }
        self.services.push(service);
        Ok(())
    }

    /// Finds the first service whose canonical element matches
    /// `(local, namespace)` and whose declared usage intersects `usage`.
    pub fn find_by_node(
        &self,
        local: &str,
        namespace: Option<&str>,
        usage: KeyDataUsage,
    ) -> Option<Arc<dyn KeyDataService>> {
        self.services
            .iter()
            .find(|s| {
                s.usage().intersects(usage)
                    && s.node_name() == Some(local)
                    && s.node_namespace() == namespace
            })
            .cloned()
    }

    /// Finds the first service with the given href whose declared usage
    /// intersects `usage`.
    pub fn find_by_href(&self, href: &str, usage: KeyDataUsage) -> Option<Arc<dyn KeyDataService>> {
        self.services
            .iter()
            .find(|s| s.usage().intersects(usage) && s.href() == Some(href))
            .cloned()
    }

    /// Finds a service by identifier.
    pub fn find_by_id(&self, id: KeyDataId) -> Option<Arc<dyn KeyDataService>> {
        self.services.iter().find(|s| s.id() == id).cloned()
    }

    /// Checks registry membership.
    pub fn contains(&self, id: KeyDataId) -> bool {
        self.services.iter().any(|s| s.id() == id)
    }

    /// Gets the registered identifiers in registration order.
    pub fn ids(&self) -> Vec<KeyDataId> {
        self.services.iter().map(|s| s.id()).collect()
    }

    /// Gets the number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Checks whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for KeyDataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDataRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::namespaces::NS_DSIG;

    struct StubService {
        id: KeyDataId,
        usage: KeyDataUsage,
        node: Option<&'static str>,
        href: Option<&'static str>,
    }

    impl KeyDataService for StubService {
        fn id(&self) -> KeyDataId {
            self.id
        }
        fn display_name(&self) -> &'static str {
            "Stub"
        }
        fn usage(&self) -> KeyDataUsage {
            self.usage
        }
        fn href(&self) -> Option<&'static str> {
            self.href
        }
        fn node_name(&self) -> Option<&'static str> {
            self.node
        }
        fn node_namespace(&self) -> Option<&'static str> {
            self.node.map(|_| NS_DSIG)
        }
        fn read_xml(
            &self,
            _key: &mut Key,
            _node: &XmlElement,
            _ctx: &mut KeyInfoContext,
        ) -> Result<(), KeyInfoError> {
            Ok(())
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

    fn registry() -> KeyDataRegistry {
        let mut reg = KeyDataRegistry::new();
        reg.register(Arc::new(StubService {
            id: KeyDataId("alpha"),
            usage: KeyDataUsage::KEY_INFO_READ,
            node: Some("Alpha"),
            href: Some("urn:example:alpha"),
        }))
        .unwrap();
        reg.register(Arc::new(StubService {
            id: KeyDataId("beta"),
            usage: KeyDataUsage::RETRIEVAL_METHOD_BIN,
            node: None,
            href: Some("urn:example:beta"),
        }))
        .unwrap();
        reg
    }

    /// Tests lookup by node identity with usage filtering.
    ///
    /// Validates that:
    /// - Matching name, namespace, and usage resolves the service
    /// - A usage the service does not declare hides it
    /// - Namespace is part of the identity
    #[test]
    fn test_find_by_node() {
        let reg = registry();
        assert!(reg
            .find_by_node("Alpha", Some(NS_DSIG), KeyDataUsage::KEY_INFO_READ)
            .is_some());
        assert!(reg
            .find_by_node("Alpha", Some(NS_DSIG), KeyDataUsage::KEY_INFO_WRITE)
            .is_none());
        assert!(reg
            .find_by_node("Alpha", None, KeyDataUsage::KEY_INFO_READ)
            .is_none());
    }

    #[test]
    fn test_find_by_href() {
        let reg = registry();
        assert!(reg
            .find_by_href("urn:example:beta", KeyDataUsage::retrieval_method())
            .is_some());
        assert!(reg
            .find_by_href("urn:example:beta", KeyDataUsage::KEY_INFO_READ)
            .is_none());
        assert!(reg
            .find_by_href("urn:example:missing", KeyDataUsage::retrieval_method())
            .is_none());
    }

    #[test]
    fn test_membership_and_duplicate_rejection() {
        let mut reg = registry();
        assert!(reg.contains(KeyDataId("alpha")));
        assert!(!reg.contains(KeyDataId("gamma")));
        assert_eq!(reg.ids(), vec![KeyDataId("alpha"), KeyDataId("beta")]);

        let duplicate = Arc::new(StubService {
            id: KeyDataId("alpha"),
            usage: KeyDataUsage::KEY_INFO_READ,
            node: None,
            href: None,
        });
        assert!(matches!(
            reg.register(duplicate),
            Err(KeyInfoError::Internal(_))
        ));
    }
}
