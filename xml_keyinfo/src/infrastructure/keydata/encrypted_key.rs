// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # EncryptedKey Handler
//!
//! `<EncryptedKey>` (xmlenc) transports a symmetric key encrypted for the
//! recipient. Reading decrypts the cipher data through the encrypted-data
//! context and feeds the plaintext to the binary reader of the key-data
//! kind the requirement asks for. A document may carry several
//! `<EncryptedKey>` siblings for different recipients; with
//! `ENCKEY_DONT_STOP_ON_FAILED_DECRYPTION` a failing one is swallowed so
//! the others get their turn.

use tracing::{debug, warn};

use xml_keyinfo_domain::error::KeyInfoError;
use xml_keyinfo_domain::services::key_data_registry::{KeyDataService, WriteOutcome};
use xml_keyinfo_domain::value_objects::namespaces::NS_XMLENC;
use xml_keyinfo_domain::value_objects::{
    KeyDataId, KeyDataUsage, KeyRequirement, ProcessingFlags, ProcessingMode, XmlElement,
};
use xml_keyinfo_domain::{Key, KeyInfoContext};

/// Identifier of the `EncryptedKey` handler.
pub const ENCRYPTED_KEY_ID: KeyDataId = KeyDataId("encrypted-key");

/// Handler for `<EncryptedKey>` (xmlenc namespace).
#[derive(Debug, Default)]
pub struct EncryptedKeyService;

impl KeyDataService for EncryptedKeyService {
    fn id(&self) -> KeyDataId {
        ENCRYPTED_KEY_ID
    }

    fn display_name(&self) -> &'static str {
        "EncryptedKey"
    }

    fn usage(&self) -> KeyDataUsage {
        KeyDataUsage::KEY_INFO_READ | KeyDataUsage::KEY_INFO_WRITE
    }

    fn node_name(&self) -> Option<&'static str> {
        Some("EncryptedKey")
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

        ctx.enter_encrypted_key_level()?;
        let decrypted = enc_ctx.decrypt_to_buffer(node);
        ctx.exit_encrypted_key_level();
        ctx.put_enc_ctx(enc_ctx);

        match decrypted {
            Ok(plain) if !plain.is_empty() => {
                let key_id = ctx.key_requirement().key_id.ok_or_else(|| {
                    KeyInfoError::invalid_key_data(
                        "EncryptedKey needs a requested key data kind to interpret the plaintext",
                    )
                })?;
                let service = ctx.registry().find_by_id(key_id).ok_or_else(|| {
                    KeyInfoError::internal(format!("requested key data '{}' not registered", key_id))
                })?;
                debug!(kind = %key_id, bits = plain.len() * 8, "EncryptedKey decrypted");
                service.read_binary(key, &plain, ctx)
            }
            Ok(_) => swallow_or_fail(
                ctx,
                KeyInfoError::encryption_failed("EncryptedKey decrypted to an empty buffer"),
            ),
            Err(err) => swallow_or_fail(ctx, err),
        }
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
        let service = ctx.registry().find_by_id(data_id).ok_or_else(|| {
            KeyInfoError::internal(format!("key data '{}' not registered", data_id))
        })?;

        // Serialize through a fresh context so the inner run cannot disturb
        // this context's sub-pipeline state. The requirement is cleared so
        // no further filtering applies.
        let mut serialize_ctx = KeyInfoContext::new(ctx.registry().clone());
        serialize_ctx.copy_user_pref_from(ctx);
        serialize_ctx.set_mode(ProcessingMode::Write);
        serialize_ctx.set_key_requirement(KeyRequirement::default());
        let plain = service.write_binary(key, &mut serialize_ctx)?;

        ctx.prepare_enc_ctx()?;
        let mut enc_ctx = ctx
            .take_enc_ctx()
            .ok_or_else(|| KeyInfoError::internal("encrypted-data context missing after prepare"))?;
        let result = enc_ctx.binary_encrypt(node, &plain, ctx.base64_line_size());
        ctx.put_enc_ctx(enc_ctx);
        result.map(|_| WriteOutcome::Wrote)
        // `plain` is wiped when it drops here, on success and on error.
    }
}

/// Applies the sibling-fallthrough policy to a failed decryption.
fn swallow_or_fail(ctx: &KeyInfoContext, err: KeyInfoError) -> Result<(), KeyInfoError> {
    if ctx
        .flags()
        .contains(ProcessingFlags::ENCKEY_DONT_STOP_ON_FAILED_DECRYPTION)
    {
        warn!(error = %err, "EncryptedKey failed, trying remaining siblings");
        Ok(())
    } else {
        Err(err)
    }
}
