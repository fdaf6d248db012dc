// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # ECKeyValue Codec
//!
//! `<ECKeyValue>` (DSig 1.1) carries an elliptic curve public key as a
//! `<NamedCurve URI="…">` reference and a base64 `<PublicKey>` point.

use xml_keyinfo_domain::entities::key::{EcPublicParams, EC_KEY_DATA_ID};
use xml_keyinfo_domain::error::KeyInfoError;
use xml_keyinfo_domain::services::key_data_registry::{KeyDataService, WriteOutcome};
use xml_keyinfo_domain::value_objects::crypto_binary;
use xml_keyinfo_domain::value_objects::namespaces::{HREF_EC_KEY_VALUE, NS_DSIG11};
use xml_keyinfo_domain::value_objects::{KeyDataId, KeyDataUsage, XmlElement};
use xml_keyinfo_domain::{Key, KeyInfoContext, KeyMaterial};

/// Codec for `<ECKeyValue>` (DSig 1.1 namespace).
#[derive(Debug, Default)]
pub struct EcKeyValueService;

impl KeyDataService for EcKeyValueService {
    fn id(&self) -> KeyDataId {
        EC_KEY_DATA_ID
    }

    fn display_name(&self) -> &'static str {
        "ECKeyValue"
    }

    fn usage(&self) -> KeyDataUsage {
        KeyDataUsage::KEY_VALUE_READ
            | KeyDataUsage::KEY_VALUE_WRITE
            | KeyDataUsage::RETRIEVAL_METHOD_XML
    }

    fn href(&self) -> Option<&'static str> {
        Some(HREF_EC_KEY_VALUE)
    }

    fn node_name(&self) -> Option<&'static str> {
        Some("ECKeyValue")
    }

    fn node_namespace(&self) -> Option<&'static str> {
        Some(NS_DSIG11)
    }

    fn read_xml(
        &self,
        key: &mut Key,
        node: &XmlElement,
        _ctx: &mut KeyInfoContext,
    ) -> Result<(), KeyInfoError> {
        if key.is_valid() {
            return Err(KeyInfoError::invalid_key_data(
                "key already has a value, refusing ECKeyValue",
            ));
        }
        let curve_node = node
            .element_children()
            .find(|c| c.is_named("NamedCurve", Some(NS_DSIG11)))
            .ok_or_else(|| KeyInfoError::invalid_node("ECKeyValue requires NamedCurve"))?;
        let named_curve = curve_node
            .attribute("URI")
            .ok_or_else(|| KeyInfoError::invalid_attribute("NamedCurve requires a URI"))?
            .to_string();
        let point_node = node
            .element_children()
            .find(|c| c.is_named("PublicKey", Some(NS_DSIG11)))
            .ok_or_else(|| KeyInfoError::invalid_node("ECKeyValue requires PublicKey"))?;

        key.set_material(KeyMaterial::Ec(EcPublicParams {
            named_curve,
            public_key: crypto_binary::decode(&point_node.text_content())?,
        }));
        Ok(())
    }

    fn write_xml(
        &self,
        key: &Key,
        node: &mut XmlElement,
        ctx: &mut KeyInfoContext,
    ) -> Result<WriteOutcome, KeyInfoError> {
        let Some(KeyMaterial::Ec(params)) = key.material() else {
            return Err(KeyInfoError::internal("ECKeyValue writer given a non-EC key"));
        };
        node.clear_children();
        node.add_child_element(XmlElement::new("NamedCurve", Some(NS_DSIG11)))
            .set_attribute("URI", params.named_curve.clone());
        node.add_child_element(XmlElement::new("PublicKey", Some(NS_DSIG11)))
            .set_text(crypto_binary::encode(&params.public_key, ctx.base64_line_size()));
        Ok(WriteOutcome::Wrote)
    }
}
