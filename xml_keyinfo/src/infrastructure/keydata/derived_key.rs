// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # DerivedKey Handler
//!
//! `<DerivedKey>` (xmlenc 1.1) tells the recipient to derive the key from
//! master material instead of transporting it. The encrypted-data context
//! performs the derivation; a result that fails the requirement is
//! discarded without error so sibling candidates can be tried.
//!
//! Derivation shares the encrypted-key level counter with `<EncryptedKey>`.
//! A derived key that carries a `<DerivedKeyName>` is registered in the
//! run's key cache so a later `<KeyName>` in the same `KeyInfo` can refer
//! back to it.

use tracing::{debug, warn};

use xml_keyinfo_domain::error::KeyInfoError;
use xml_keyinfo_domain::services::key_data_registry::{KeyDataService, WriteOutcome};
use xml_keyinfo_domain::value_objects::namespaces::NS_XMLENC11;
use xml_keyinfo_domain::value_objects::{KeyDataId, KeyDataUsage, ProcessingFlags, XmlElement};
use xml_keyinfo_domain::{Key, KeyInfoContext};

/// Identifier of the `DerivedKey` handler.
pub const DERIVED_KEY_ID: KeyDataId = KeyDataId("derived-key");

/// Handler for `<DerivedKey>` (xmlenc 1.1 namespace).
#[derive(Debug, Default)]
pub struct DerivedKeyService;

impl KeyDataService for DerivedKeyService {
    fn id(&self) -> KeyDataId {
        DERIVED_KEY_ID
    }

    fn display_name(&self) -> &'static str {
        "DerivedKey"
    }

    fn usage(&self) -> KeyDataUsage {
        KeyDataUsage::KEY_INFO_READ | KeyDataUsage::KEY_INFO_WRITE
    }

    fn node_name(&self) -> Option<&'static str> {
        Some("DerivedKey")
    }

    fn node_namespace(&self) -> Option<&'static str> {
        Some(NS_XMLENC11)
    }

    fn read_xml(
        &self,
        key: &mut Key,
        node: &XmlElement,
        ctx: &mut KeyInfoContext,
    ) -> Result<(), KeyInfoError> {
        ctx.check_encrypted_key_level()?;
        ctx.prepare_enc_ctx()?;
        let mut enc_ctx = ctx
            .take_enc_ctx()
            .ok_or_else(|| KeyInfoError::internal("encrypted-data context missing after prepare"))?;

        let requirement = ctx.key_requirement().clone();
        ctx.enter_encrypted_key_level()?;
        let derived = enc_ctx.derive_key(node, &requirement);
        ctx.exit_encrypted_key_level();
        ctx.put_enc_ctx(enc_ctx);

        match derived {
            Ok(derived) => {
                // Register named results before matching so they stay
                // addressable even when this requirement rejects them.
                if derived.name().is_some() {
                    ctx.cache_resolved_key(derived.clone());
                }
                if !derived.matches(&requirement) {
                    debug!("derived key does not satisfy the requirement, discarding");
                    return Ok(());
                }
                key.copy_from(&derived);
                Ok(())
            }
            Err(err) => {
                if ctx
                    .flags()
                    .contains(ProcessingFlags::ENCKEY_DONT_STOP_ON_FAILED_DECRYPTION)
                {
                    warn!(error = %err, "DerivedKey failed, trying remaining siblings");
                    Ok(())
                } else {
                    Err(err)
                }
            }
        }
    }

    fn write_xml(
        &self,
        _key: &Key,
        _node: &mut XmlElement,
        _ctx: &mut KeyInfoContext,
    ) -> Result<WriteOutcome, KeyInfoError> {
        // The template is assumed to already carry the derivation
        // parameters.
        Ok(WriteOutcome::Skipped)
    }
}
