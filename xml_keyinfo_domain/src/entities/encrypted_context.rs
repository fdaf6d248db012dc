// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Encrypted-Data Context
//!
//! The context driving `<EncryptedKey>`, `<DerivedKey>`, and
//! `<AgreementMethod>` processing. It owns two inner [`KeyInfoContext`]s,
//! one reading and one writing, which receive the outer context's
//! preferences by value before every use; the outer context owns this
//! context in turn.
//! Recursion through nested encrypted keys is therefore tracked by the level
//! counters alone, never by structural self-reference.
//!
//! Structure parsing and key resolution happen here; the cipher, derivation,
//! and agreement computations are delegated to the installed
//! [`EncryptionEngine`].

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::entities::key::Key;
use crate::entities::key_info_context::KeyInfoContext;
use crate::error::KeyInfoError;
use crate::services::encryption_engine::EncryptionEngine;
use crate::services::key_data_registry::KeyDataRegistry;
use crate::services::key_info_processor::{read_key_info, write_key_info};
use crate::services::keys_manager_service::KeysManagerService;
use crate::services::transform_service::UriResolver;
use crate::value_objects::crypto_binary;
use crate::value_objects::namespaces::{NS_DSIG, NS_XMLENC, NS_XMLENC11};
use crate::value_objects::{KeyRequirement, ProcessingMode, XmlElement};

/// What kind of encrypted node this context processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptedDataMode {
    /// An `<EncryptedData>` element carrying content
    EncryptedData,
    /// An `<EncryptedKey>` element carrying a wrapped key
    EncryptedKey,
}

/// Context for decrypting, deriving, and agreeing on keys.
pub struct EncryptedContext {
    mode: EncryptedDataMode,
    engine: Arc<dyn EncryptionEngine>,
    keys_manager: Option<Arc<dyn KeysManagerService>>,
    key_info_read_ctx: KeyInfoContext,
    key_info_write_ctx: KeyInfoContext,
}

impl EncryptedContext {
    /// Creates a context in `EncryptedKey` mode bound to a keys manager and
    /// an engine.
    pub fn new(
        registry: Arc<KeyDataRegistry>,
        engine: Arc<dyn EncryptionEngine>,
        keys_manager: Option<Arc<dyn KeysManagerService>>,
        resolver: Arc<dyn UriResolver>,
    ) -> Self {
        let mut key_info_read_ctx = KeyInfoContext::new(registry.clone());
        key_info_read_ctx.set_mode(ProcessingMode::Read);
        key_info_read_ctx.set_uri_resolver(resolver.clone());
        key_info_read_ctx.set_keys_manager(keys_manager.clone());
        key_info_read_ctx.set_encryption_engine(Some(engine.clone()));

        let mut key_info_write_ctx = KeyInfoContext::new(registry);
        key_info_write_ctx.set_mode(ProcessingMode::Write);
        key_info_write_ctx.set_uri_resolver(resolver);
        key_info_write_ctx.set_keys_manager(keys_manager.clone());
        key_info_write_ctx.set_encryption_engine(Some(engine.clone()));

        EncryptedContext {
            mode: EncryptedDataMode::EncryptedKey,
            engine,
            keys_manager,
            key_info_read_ctx,
            key_info_write_ctx,
        }
    }

    /// Gets the processing mode.
    pub fn mode(&self) -> EncryptedDataMode {
        self.mode
    }

    /// Sets the processing mode.
    pub fn set_mode(&mut self, mode: EncryptedDataMode) {
        self.mode = mode;
    }

    /// Gets the inner read-direction context.
    pub fn key_info_read_ctx(&self) -> &KeyInfoContext {
        &self.key_info_read_ctx
    }

    /// Gets the inner write-direction context.
    pub fn key_info_write_ctx(&self) -> &KeyInfoContext {
        &self.key_info_write_ctx
    }

    /// Clears per-run state in both inner contexts.
    pub fn reset(&mut self) {
        self.key_info_read_ctx.reset();
        self.key_info_write_ctx.reset();
    }

    /// Refreshes both inner contexts with the outer context's current
    /// preferences and source document.
    pub fn copy_user_prefs_from(&mut self, outer: &KeyInfoContext) {
        self.keys_manager = outer.keys_manager().cloned();
        self.key_info_read_ctx.copy_user_pref_from(outer);
        self.key_info_write_ctx.copy_user_pref_from(outer);
        self.key_info_read_ctx.set_source_document(outer.source_document());
        self.key_info_write_ctx.set_source_document(outer.source_document());
    }

    fn expected_node_name(&self) -> &'static str {
        match self.mode {
            EncryptedDataMode::EncryptedData => "EncryptedData",
            EncryptedDataMode::EncryptedKey => "EncryptedKey",
        }
    }

    fn expect_node(&self, node: &XmlElement) -> Result<(), KeyInfoError> {
        let expected = self.expected_node_name();
        if !node.is_named(expected, Some(NS_XMLENC)) {
            return Err(KeyInfoError::invalid_node(format!(
                "expected {}, found {}",
                expected,
                node.local_name()
            )));
        }
        Ok(())
    }

    fn encryption_method(node: &XmlElement) -> Option<String> {
        node.element_children()
            .find(|c| c.is_named("EncryptionMethod", Some(NS_XMLENC)))
            .and_then(|m| m.attribute("Algorithm").map(|a| a.to_string()))
    }

    fn cipher_value(node: &XmlElement) -> Result<Vec<u8>, KeyInfoError> {
        let cipher_data = node
            .element_children()
            .find(|c| c.is_named("CipherData", Some(NS_XMLENC)))
            .ok_or_else(|| {
                KeyInfoError::invalid_node(format!("{} requires CipherData", node.local_name()))
            })?;
        if let Some(value) = cipher_data
            .element_children()
            .find(|c| c.is_named("CipherValue", Some(NS_XMLENC)))
        {
            return crypto_binary::decode(&value.text_content());
        }
        if cipher_data
            .element_children()
            .any(|c| c.is_named("CipherReference", Some(NS_XMLENC)))
        {
            return Err(KeyInfoError::not_supported("CipherReference dereferencing"));
        }
        Err(KeyInfoError::invalid_node("CipherData requires CipherValue"))
    }

    /// Resolves the key-encryption key: the node's own `<KeyInfo>` first,
    /// then a keys-manager lookup without a name.
    fn resolve_kek(&mut self, node: &XmlElement) -> Result<Key, KeyInfoError> {
        self.key_info_read_ctx
            .set_key_requirement(KeyRequirement::default());
        if let Some(key_info) = node
            .element_children()
            .find(|c| c.is_named("KeyInfo", Some(NS_DSIG)))
        {
            let mut kek = Key::new();
            read_key_info(key_info, &mut kek, &mut self.key_info_read_ctx)?;
            if kek.is_valid() {
                return Ok(kek);
            }
        }
        if let Some(manager) = &self.keys_manager {
            if let Some(found) = manager.find_key(None, &KeyRequirement::default())? {
                return Ok(found);
            }
        }
        Err(KeyInfoError::encryption_failed(
            "key encryption key could not be resolved",
        ))
    }

    /// Decrypts the node's cipher data to plaintext.
    pub fn decrypt_to_buffer(&mut self, node: &XmlElement) -> Result<Zeroizing<Vec<u8>>, KeyInfoError> {
        self.expect_node(node)?;
        let algorithm = Self::encryption_method(node);
        let kek = self.resolve_kek(node)?;
        let cipher = Self::cipher_value(node)?;
        self.engine.decrypt(algorithm.as_deref(), &cipher, &kek)
    }

    /// Encrypts plaintext into the node's `<CipherData>/<CipherValue>`,
    /// creating the structure when the template lacks it.
    pub fn binary_encrypt(
        &mut self,
        node: &mut XmlElement,
        plain: &[u8],
        base64_line_size: usize,
    ) -> Result<(), KeyInfoError> {
        self.expect_node(node)?;
        let algorithm = Self::encryption_method(node);
        let kek = self.resolve_kek(node)?;
        let cipher = self.engine.encrypt(algorithm.as_deref(), plain, &kek)?;
        let encoded = crypto_binary::encode(&cipher, base64_line_size);

        if !node
            .element_children()
            .any(|c| c.is_named("CipherData", Some(NS_XMLENC)))
        {
            node.add_child_element(XmlElement::new("CipherData", Some(NS_XMLENC)));
        }
        let cipher_data = node
            .element_children_mut()
            .find(|c| c.is_named("CipherData", Some(NS_XMLENC)))
            .ok_or_else(|| KeyInfoError::internal("CipherData vanished"))?;
        if !cipher_data
            .element_children()
            .any(|c| c.is_named("CipherValue", Some(NS_XMLENC)))
        {
            cipher_data.add_child_element(XmlElement::new("CipherValue", Some(NS_XMLENC)));
        }
        let cipher_value = cipher_data
            .element_children_mut()
            .find(|c| c.is_named("CipherValue", Some(NS_XMLENC)))
            .ok_or_else(|| KeyInfoError::internal("CipherValue vanished"))?;
        cipher_value.set_text(encoded);
        Ok(())
    }

    fn resolve_master_key(&mut self, node: &XmlElement) -> Result<Key, KeyInfoError> {
        if let Some(master_name) = node
            .element_children()
            .find(|c| c.is_named("MasterKeyName", Some(NS_XMLENC11)))
        {
            let name = master_name.text_content();
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(KeyInfoError::invalid_content("MasterKeyName is empty"));
            }
            if let Some(manager) = &self.keys_manager {
                if let Some(found) = manager.find_key(Some(&name), &KeyRequirement::default())? {
                    return Ok(found);
                }
            }
            return Err(KeyInfoError::encryption_failed(format!(
                "master key '{}' not found",
                name
            )));
        }
        if let Some(manager) = &self.keys_manager {
            if let Some(found) = manager.find_key(None, &KeyRequirement::default())? {
                return Ok(found);
            }
        }
        Err(KeyInfoError::encryption_failed("master key could not be resolved"))
    }

    /// Derives a key as described by a `<DerivedKey>` element. The derived
    /// key carries the `<DerivedKeyName>` when the document names it.
    pub fn derive_key(
        &mut self,
        node: &XmlElement,
        requirement: &KeyRequirement,
    ) -> Result<Key, KeyInfoError> {
        if !node.is_named("DerivedKey", Some(NS_XMLENC11)) {
            return Err(KeyInfoError::invalid_node(format!(
                "expected DerivedKey, found {}",
                node.local_name()
            )));
        }
        let method = node
            .element_children()
            .find(|c| c.is_named("KeyDerivationMethod", Some(NS_XMLENC11)));
        let master = self.resolve_master_key(node)?;
        let mut derived = self.engine.derive(method, &master, requirement)?;
        if let Some(name_node) = node
            .element_children()
            .find(|c| c.is_named("DerivedKeyName", Some(NS_XMLENC11)))
        {
            let name = name_node.text_content();
            let name = name.trim();
            if !name.is_empty() {
                derived.set_name(Some(name.to_string()));
            }
        }
        Ok(derived)
    }

    fn read_party_key_info(
        &mut self,
        node: &XmlElement,
        local: &str,
    ) -> Result<Option<Key>, KeyInfoError> {
        let Some(child) = node
            .element_children()
            .find(|c| c.is_named(local, Some(NS_XMLENC)))
        else {
            return Ok(None);
        };
        self.key_info_read_ctx
            .set_key_requirement(KeyRequirement::default());
        let mut key = Key::new();
        read_key_info(child, &mut key, &mut self.key_info_read_ctx)?;
        Ok(if key.is_valid() { Some(key) } else { None })
    }

    /// Computes the shared key of an `<AgreementMethod>` element.
    pub fn agreement_generate(
        &mut self,
        node: &XmlElement,
        requirement: &KeyRequirement,
    ) -> Result<Key, KeyInfoError> {
        if !node.is_named("AgreementMethod", Some(NS_XMLENC)) {
            return Err(KeyInfoError::invalid_node(format!(
                "expected AgreementMethod, found {}",
                node.local_name()
            )));
        }
        let algorithm = node.attribute("Algorithm").map(|a| a.to_string());
        let nonce = node
            .element_children()
            .find(|c| c.is_named("KA-Nonce", Some(NS_XMLENC)))
            .map(|n| crypto_binary::decode(&n.text_content()))
            .transpose()?;
        let originator = self.read_party_key_info(node, "OriginatorKeyInfo")?;
        let recipient = self.read_party_key_info(node, "RecipientKeyInfo")?;
        self.engine.agree(
            algorithm.as_deref(),
            originator.as_ref(),
            recipient.as_ref(),
            nonce.as_deref(),
            requirement,
        )
    }

    /// Populates an `<AgreementMethod>` template with the originator key
    /// material for `key`.
    pub fn agreement_write(&mut self, node: &mut XmlElement, key: &Key) -> Result<(), KeyInfoError> {
        if !node.is_named("AgreementMethod", Some(NS_XMLENC)) {
            return Err(KeyInfoError::invalid_node(format!(
                "expected AgreementMethod, found {}",
                node.local_name()
            )));
        }
        let originator = self.engine.agreement_originator_key(key)?;
        if !node
            .element_children()
            .any(|c| c.is_named("OriginatorKeyInfo", Some(NS_XMLENC)))
        {
            let party = node.add_child_element(XmlElement::new("OriginatorKeyInfo", Some(NS_XMLENC)));
            party.add_child_element(XmlElement::new("KeyValue", Some(NS_DSIG)));
        }
        let party = node
            .element_children_mut()
            .find(|c| c.is_named("OriginatorKeyInfo", Some(NS_XMLENC)))
            .ok_or_else(|| KeyInfoError::internal("OriginatorKeyInfo vanished"))?;
        self.key_info_write_ctx
            .set_key_requirement(KeyRequirement::default());
        write_key_info(party, &originator, &mut self.key_info_write_ctx)
    }
}
