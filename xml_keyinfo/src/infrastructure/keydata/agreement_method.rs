// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # AgreementMethod Handler
//!
//! `<AgreementMethod>` asks the recipient to compute the key by agreement
//! over the nested `<OriginatorKeyInfo>`/`<RecipientKeyInfo>` pair. Reading
//! mirrors `<DerivedKey>`: generate through the encrypted-data context,
//! discard results that miss the requirement, share the encrypted-key level
//! counter, cache named results.
//!
//! The write direction is not a no-op here: the encrypted-data context
//! populates the template with the originator key material.

use tracing::{debug, warn};

use xml_keyinfo_domain::error::KeyInfoError;
use xml_keyinfo_domain::services::key_data_registry::{KeyDataService, WriteOutcome};
use xml_keyinfo_domain::value_objects::namespaces::NS_XMLENC;
use xml_keyinfo_domain::value_objects::{KeyDataId, KeyDataUsage, ProcessingFlags, XmlElement};
use xml_keyinfo_domain::{Key, KeyInfoContext};

/// Identifier of the `AgreementMethod` handler.
pub const AGREEMENT_METHOD_ID: KeyDataId = KeyDataId("agreement-method");

/// Handler for `<AgreementMethod>` (xmlenc namespace).
#[derive(Debug, Default)]
pub struct AgreementMethodService;

impl KeyDataService for AgreementMethodService {
    fn id(&self) -> KeyDataId {
        AGREEMENT_METHOD_ID
    }

    fn display_name(&self) -> &'static str {
        "AgreementMethod"
    }

    fn usage(&self) -> KeyDataUsage {
        KeyDataUsage::KEY_INFO_READ | KeyDataUsage::KEY_INFO_WRITE
    }

    fn node_name(&self) -> Option<&'static str> {
        Some("AgreementMethod")
    }

    fn node_namespace(&self) -> Option<&'static str> {
        Some(NS_XMLENC)
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
        let agreed = enc_ctx.agreement_generate(node, &requirement);
        ctx.exit_encrypted_key_level();
        ctx.put_enc_ctx(enc_ctx);

        match agreed {
            Ok(agreed) => {
                if agreed.name().is_some() {
                    ctx.cache_resolved_key(agreed.clone());
                }
                if !agreed.matches(&requirement) {
                    debug!("agreed key does not satisfy the requirement, discarding");
                    return Ok(());
                }
                key.copy_from(&agreed);
                Ok(())
            }
            Err(err) => {
                if ctx
                    .flags()
                    .contains(ProcessingFlags::ENCKEY_DONT_STOP_ON_FAILED_DECRYPTION)
                {
                    warn!(error = %err, "AgreementMethod failed, trying remaining siblings");
                    Ok(())
                } else {
                    Err(err)
                }
            }
        }
    }

    fn write_xml(
        &self,
        key: &Key,
        node: &mut XmlElement,
        ctx: &mut KeyInfoContext,
    ) -> Result<WriteOutcome, KeyInfoError> {
        ctx.check_encrypted_key_level()?;
        ctx.prepare_enc_ctx()?;
        let mut enc_ctx = ctx
            .take_enc_ctx()
            .ok_or_else(|| KeyInfoError::internal("encrypted-data context missing after prepare"))?;

        ctx.enter_encrypted_key_level()?;
        let result = enc_ctx.agreement_write(node, key);
        ctx.exit_encrypted_key_level();
        ctx.put_enc_ctx(enc_ctx);

        result.map(|_| WriteOutcome::Wrote)
    }
}
