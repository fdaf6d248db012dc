// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # In-Memory Keys Store
//!
//! The simple keys-manager implementation: an ordered list of keys,
//! searched front to back. A lookup matches the first key that carries the
//! requested name (when one is requested) and satisfies the requirement.
//! The store is built up front and shared read-only.

use tracing::debug;

use xml_keyinfo_domain::error::KeyInfoError;
use xml_keyinfo_domain::services::keys_manager_service::KeysManagerService;
use xml_keyinfo_domain::value_objects::KeyRequirement;
use xml_keyinfo_domain::Key;

/// Ordered in-memory key list implementing the keys-manager seam.
#[derive(Debug, Default)]
pub struct MemoryKeysStore {
    keys: Vec<Key>,
}

impl MemoryKeysStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        MemoryKeysStore::default()
    }

    /// Adds a key, builder style.
    pub fn with_key(mut self, key: Key) -> Self {
        self.keys.push(key);
        self
    }

    /// Adds a key.
    pub fn add_key(&mut self, key: Key) {
        self.keys.push(key);
    }

    /// Gets the number of stored keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Checks whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeysManagerService for MemoryKeysStore {
    fn find_key(
        &self,
        name: Option<&str>,
        requirement: &KeyRequirement,
    ) -> Result<Option<Key>, KeyInfoError> {
        let found = self
            .keys
            .iter()
            .find(|key| {
                let name_matches = match name {
                    Some(wanted) => key.name() == Some(wanted),
                    None => true,
                };
                name_matches && key.matches(requirement)
            })
            .cloned();
        debug!(
            name = name.unwrap_or("<any>"),
            hit = found.is_some(),
            "keys store lookup"
        );
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xml_keyinfo_domain::value_objects::{KeyType, KeyUse};

    fn store() -> MemoryKeysStore {
        MemoryKeysStore::new()
            .with_key(Key::symmetric("alice", vec![1; 16]))
            .with_key(Key::symmetric("bob", vec![2; 32]))
    }

    /// Tests lookup by name.
    #[test]
    fn test_find_by_name() {
        let store = store();
        let found = store
            .find_key(Some("bob"), &KeyRequirement::default())
            .unwrap()
            .unwrap();
        assert_eq!(found.name(), Some("bob"));
        assert!(store
            .find_key(Some("carol"), &KeyRequirement::default())
            .unwrap()
            .is_none());
    }

    /// Tests that the requirement filters candidates.
    ///
    /// Validates that:
    /// - A size constraint skips too-small keys
    /// - An anonymous lookup returns the first satisfying key
    /// - Usage restrictions are enforced
    #[test]
    fn test_requirement_filtering() {
        let store = store();
        let big = store
            .find_key(None, &KeyRequirement::default().with_min_bits(256))
            .unwrap()
            .unwrap();
        assert_eq!(big.name(), Some("bob"));

        let first = store.find_key(None, &KeyRequirement::default()).unwrap().unwrap();
        assert_eq!(first.name(), Some("alice"));

        let mut restricted = Key::symmetric("sig-only", vec![3; 16]);
        restricted.set_usage(KeyUse::SIGN);
        let store = store.with_key(restricted);
        assert!(store
            .find_key(Some("sig-only"), &KeyRequirement::default().with_usage(KeyUse::DECRYPT))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_type_filtering() {
        let store = store();
        assert!(store
            .find_key(None, &KeyRequirement::default().with_key_type(KeyType::Public))
            .unwrap()
            .is_none());
    }
}
