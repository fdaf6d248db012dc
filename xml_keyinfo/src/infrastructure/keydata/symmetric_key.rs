// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Symmetric Key Data
//!
//! Raw symmetric key octets. This kind has no element form; it exists for
//! the binary paths: the plaintext of an `<EncryptedKey>`, and binary
//! `<RetrievalMethod>` dereferences advertising the AES key-value type.

use zeroize::Zeroizing;

use xml_keyinfo_domain::entities::key::{SymmetricMaterial, SYMMETRIC_KEY_DATA_ID};
use xml_keyinfo_domain::error::KeyInfoError;
use xml_keyinfo_domain::services::key_data_registry::{KeyDataService, WriteOutcome};
use xml_keyinfo_domain::value_objects::namespaces::HREF_AES_KEY_VALUE;
use xml_keyinfo_domain::value_objects::{KeyDataId, KeyDataUsage, XmlElement};
use xml_keyinfo_domain::{Key, KeyInfoContext, KeyMaterial};

/// Binary codec for raw symmetric key material.
#[derive(Debug, Default)]
pub struct SymmetricKeyService;

impl KeyDataService for SymmetricKeyService {
    fn id(&self) -> KeyDataId {
        SYMMETRIC_KEY_DATA_ID
    }

    fn display_name(&self) -> &'static str {
        "SymmetricKey"
    }

    fn usage(&self) -> KeyDataUsage {
        KeyDataUsage::RETRIEVAL_METHOD_BIN
    }

    fn href(&self) -> Option<&'static str> {
        Some(HREF_AES_KEY_VALUE)
    }

    fn read_xml(
        &self,
        _key: &mut Key,
        _node: &XmlElement,
        _ctx: &mut KeyInfoContext,
    ) -> Result<(), KeyInfoError> {
        Err(KeyInfoError::not_supported(
            "symmetric key data has no element form",
        ))
    }

    fn write_xml(
        &self,
        _key: &Key,
        _node: &mut XmlElement,
        _ctx: &mut KeyInfoContext,
    ) -> Result<WriteOutcome, KeyInfoError> {
        Err(KeyInfoError::not_supported(
            "symmetric key data has no element form",
        ))
    }

    fn read_binary(
        &self,
        key: &mut Key,
        data: &[u8],
        _ctx: &mut KeyInfoContext,
    ) -> Result<(), KeyInfoError> {
        if key.is_valid() {
            return Err(KeyInfoError::invalid_key_data(
                "key already has a value, refusing symmetric material",
            ));
        }
        if data.is_empty() {
            return Err(KeyInfoError::invalid_content("empty symmetric key material"));
        }
        key.set_material(KeyMaterial::Symmetric(SymmetricMaterial::new(data.to_vec())));
        Ok(())
    }

    fn write_binary(
        &self,
        key: &Key,
        _ctx: &mut KeyInfoContext,
    ) -> Result<Zeroizing<Vec<u8>>, KeyInfoError> {
        match key.material() {
            Some(KeyMaterial::Symmetric(material)) => {
                Ok(Zeroizing::new(material.bytes().to_vec()))
            }
            _ => Err(KeyInfoError::internal(
                "symmetric writer given a non-symmetric key",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use xml_keyinfo_domain::services::key_data_registry::KeyDataRegistry;

    fn context() -> KeyInfoContext {
        KeyInfoContext::new(Arc::new(KeyDataRegistry::new()))
    }

    /// Tests the binary round trip.
    #[test]
    fn test_binary_round_trip() {
        let mut ctx = context();
        let mut key = Key::new();
        SymmetricKeyService
            .read_binary(&mut key, &[0xab; 32], &mut ctx)
            .unwrap();
        assert_eq!(key.bits(), 256);

        let bytes = SymmetricKeyService.write_binary(&key, &mut ctx).unwrap();
        assert_eq!(&bytes[..], &[0xab; 32]);
    }

    /// Tests refusal paths.
    ///
    /// Validates that:
    /// - Empty material is invalid content
    /// - A populated key refuses new material
    /// - The XML callbacks refuse outright
    #[test]
    fn test_refusals() {
        let mut ctx = context();
        let mut key = Key::new();
        assert!(matches!(
            SymmetricKeyService.read_binary(&mut key, &[], &mut ctx),
            Err(KeyInfoError::InvalidContent(_))
        ));

        let mut populated = Key::symmetric("k", vec![1; 16]);
        assert!(matches!(
            SymmetricKeyService.read_binary(&mut populated, &[2; 16], &mut ctx),
            Err(KeyInfoError::InvalidKeyData(_))
        ));

        let node = XmlElement::new("AESKeyValue", None);
        assert!(matches!(
            SymmetricKeyService.read_xml(&mut key, &node, &mut ctx),
            Err(KeyInfoError::NotSupported(_))
        ));
    }
}
