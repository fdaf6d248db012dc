// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # RSAKeyValue Codec
//!
//! `<RSAKeyValue>` carries an RSA public key as `<Modulus>` and
//! `<Exponent>` CryptoBinary values, in that order.

use xml_keyinfo_domain::entities::key::{RsaPublicParams, RSA_KEY_DATA_ID};
use xml_keyinfo_domain::error::KeyInfoError;
use xml_keyinfo_domain::services::key_data_registry::{KeyDataService, WriteOutcome};
use xml_keyinfo_domain::value_objects::crypto_binary;
use xml_keyinfo_domain::value_objects::namespaces::{HREF_RSA_KEY_VALUE, NS_DSIG};
use xml_keyinfo_domain::value_objects::{KeyDataId, KeyDataUsage, XmlElement};
use xml_keyinfo_domain::{Key, KeyInfoContext, KeyMaterial};

/// Codec for `<RSAKeyValue>` (DSig namespace).
#[derive(Debug, Default)]
pub struct RsaKeyValueService;

impl KeyDataService for RsaKeyValueService {
    fn id(&self) -> KeyDataId {
        RSA_KEY_DATA_ID
    }

    fn display_name(&self) -> &'static str {
        "RSAKeyValue"
    }

    fn usage(&self) -> KeyDataUsage {
        KeyDataUsage::KEY_VALUE_READ
            | KeyDataUsage::KEY_VALUE_WRITE
            | KeyDataUsage::RETRIEVAL_METHOD_XML
    }

    fn href(&self) -> Option<&'static str> {
        Some(HREF_RSA_KEY_VALUE)
    }

    fn node_name(&self) -> Option<&'static str> {
        Some("RSAKeyValue")
    }

    fn node_namespace(&self) -> Option<&'static str> {
        Some(NS_DSIG)
    }

    fn read_xml(
        &self,
        key: &mut Key,
        node: &XmlElement,
        _ctx: &mut KeyInfoContext,
    ) -> Result<(), KeyInfoError> {
        if key.is_valid() {
            return Err(KeyInfoError::invalid_key_data(
                "key already has a value, refusing RSAKeyValue",
            ));
        }
        let mut children = node.element_children();

        let modulus_node = children
            .next()
            .filter(|c| c.is_named("Modulus", Some(NS_DSIG)))
            .ok_or_else(|| KeyInfoError::invalid_node("RSAKeyValue requires Modulus first"))?;
        let exponent_node = children
            .next()
            .filter(|c| c.is_named("Exponent", Some(NS_DSIG)))
            .ok_or_else(|| KeyInfoError::invalid_node("RSAKeyValue requires Exponent after Modulus"))?;
        if let Some(extra) = children.next() {
            return Err(KeyInfoError::unexpected_node(format!(
                "{} inside RSAKeyValue",
                extra.local_name()
            )));
        }

        let params = RsaPublicParams {
            modulus: crypto_binary::decode(&modulus_node.text_content())?,
            exponent: crypto_binary::decode(&exponent_node.text_content())?,
        };
        key.set_material(KeyMaterial::Rsa(params));
        Ok(())
    }

    fn write_xml(
        &self,
        key: &Key,
        node: &mut XmlElement,
        ctx: &mut KeyInfoContext,
    ) -> Result<WriteOutcome, KeyInfoError> {
        let Some(KeyMaterial::Rsa(params)) = key.material() else {
            return Err(KeyInfoError::internal("RSAKeyValue writer given a non-RSA key"));
        };
        let line_size = ctx.base64_line_size();
        node.clear_children();
        node.add_child_element(XmlElement::new("Modulus", Some(NS_DSIG)))
            .set_text(crypto_binary::encode(&params.modulus, line_size));
        node.add_child_element(XmlElement::new("Exponent", Some(NS_DSIG)))
            .set_text(crypto_binary::encode(&params.exponent, line_size));
        Ok(WriteOutcome::Wrote)
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

    fn params() -> RsaPublicParams {
        RsaPublicParams {
            modulus: vec![0xc3, 0x36, 0x9a, 0x01],
            exponent: vec![1, 0, 1],
        }
    }

    /// Tests write-then-read equivalence.
    #[test]
    fn test_round_trip() {
        let mut ctx = context();
        let key = Key::with_material(params());

        let mut node = XmlElement::new("RSAKeyValue", Some(NS_DSIG));
        RsaKeyValueService.write_xml(&key, &mut node, &mut ctx).unwrap();

        let mut restored = Key::new();
        RsaKeyValueService.read_xml(&mut restored, &node, &mut ctx).unwrap();
        assert_eq!(restored.material(), key.material());
    }

    /// Tests structural requirements.
    ///
    /// Validates that:
    /// - A missing Modulus is an invalid node
    /// - Reversed child order is an invalid node
    /// - Trailing children are unexpected nodes
    #[test]
    fn test_structure_errors() {
        let mut ctx = context();
        let mut key = Key::new();

        let empty = XmlElement::new("RSAKeyValue", Some(NS_DSIG));
        assert!(matches!(
            RsaKeyValueService.read_xml(&mut key, &empty, &mut ctx),
            Err(KeyInfoError::InvalidNode(_))
        ));

        let mut reversed = XmlElement::new("RSAKeyValue", Some(NS_DSIG));
        reversed
            .add_child_element(XmlElement::new("Exponent", Some(NS_DSIG)))
            .set_text("AQAB");
        reversed
            .add_child_element(XmlElement::new("Modulus", Some(NS_DSIG)))
            .set_text("wzY=");
        assert!(matches!(
            RsaKeyValueService.read_xml(&mut key, &reversed, &mut ctx),
            Err(KeyInfoError::InvalidNode(_))
        ));

        let mut trailing = XmlElement::new("RSAKeyValue", Some(NS_DSIG));
        trailing
            .add_child_element(XmlElement::new("Modulus", Some(NS_DSIG)))
            .set_text("wzY=");
        trailing
            .add_child_element(XmlElement::new("Exponent", Some(NS_DSIG)))
            .set_text("AQAB");
        trailing.add_child_element(XmlElement::new("Extra", Some(NS_DSIG)));
        assert!(matches!(
            RsaKeyValueService.read_xml(&mut key, &trailing, &mut ctx),
            Err(KeyInfoError::UnexpectedNode(_))
        ));
    }

    #[test]
    fn test_read_refuses_populated_key() {
        let mut ctx = context();
        let mut key = Key::with_material(params());
        let mut node = XmlElement::new("RSAKeyValue", Some(NS_DSIG));
        RsaKeyValueService
            .write_xml(&key.clone(), &mut node, &mut ctx)
            .unwrap();
        assert!(matches!(
            RsaKeyValueService.read_xml(&mut key, &node, &mut ctx),
            Err(KeyInfoError::InvalidKeyData(_))
        ));
    }
}
