// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Registry Bootstrap
//!
//! Assembles the registry with every built-in key-data service.
//! Applications extend the result with their own services before handing it
//! to a context; there is no process-global registry.

use std::sync::Arc;

use xml_keyinfo_domain::services::key_data_registry::KeyDataRegistry;

use crate::infrastructure::keydata::{
    AgreementMethodService, DerivedKeyService, EcKeyValueService, EncryptedKeyService,
    KeyInfoReferenceService, KeyNameService, KeyValueService, RetrievalMethodService,
    RsaKeyValueService, SymmetricKeyService,
};

/// Builds a registry containing all built-in services, in dispatch order.
pub fn default_registry() -> KeyDataRegistry {
    let mut registry = KeyDataRegistry::new();
    // Registration order is lookup order; the structural handlers come
    // first, the concrete key-value codecs after them.
    let services: [Arc<dyn xml_keyinfo_domain::KeyDataService>; 10] = [
        Arc::new(KeyNameService),
        Arc::new(KeyValueService),
        Arc::new(RetrievalMethodService),
        Arc::new(KeyInfoReferenceService),
        Arc::new(EncryptedKeyService),
        Arc::new(DerivedKeyService),
        Arc::new(AgreementMethodService),
        Arc::new(RsaKeyValueService),
        Arc::new(EcKeyValueService),
        Arc::new(SymmetricKeyService),
    ];
    for service in services {
        registry
            .register(service)
            .expect("built-in identifiers are unique");
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use xml_keyinfo_domain::value_objects::namespaces::{HREF_RSA_KEY_VALUE, NS_DSIG, NS_XMLENC};
    use xml_keyinfo_domain::value_objects::KeyDataUsage;

    /// Tests that every built-in element resolves from the default
    /// registry.
    #[test]
    fn test_default_registry_contents() {
        let registry = default_registry();
        assert_eq!(registry.len(), 10);
        for (local, ns) in [
            ("KeyName", NS_DSIG),
            ("KeyValue", NS_DSIG),
            ("RetrievalMethod", NS_DSIG),
            ("EncryptedKey", NS_XMLENC),
            ("AgreementMethod", NS_XMLENC),
        ] {
            assert!(
                registry
                    .find_by_node(local, Some(ns), KeyDataUsage::KEY_INFO_READ)
                    .is_some(),
                "{} should resolve",
                local
            );
        }
        assert!(registry
            .find_by_href(HREF_RSA_KEY_VALUE, KeyDataUsage::retrieval_method())
            .is_some());
    }
}
