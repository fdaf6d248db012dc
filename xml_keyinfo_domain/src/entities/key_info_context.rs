// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # KeyInfo Processing Context
//!
//! The `KeyInfoContext` entity carries everything one `KeyInfo` processing
//! run needs: the caller's preferences (registry, enabled subset, flags, key
//! requirement, recursion caps, formatting) and the per-run state the
//! handlers mutate (recursion depths, sub-pipeline contexts, diagnostics).
//!
//! ## Lifecycle
//!
//! A context is created once, may be `reset` between uses (per-run state is
//! cleared, preferences survive), and is dropped when done. Preferences can
//! be propagated into another context with `copy_user_pref_from`, which
//! deep-copies the enabled-key-data list and never touches the recursion
//! counters; the inner contexts of an encrypted-data context are refreshed
//! this way before every use.
//!
//! ## Recursion Accounting
//!
//! Retrieval-method, key-info-reference, and encrypted-key processing are
//! each bounded by a `cur`/`max` level pair. Handlers enter a level before
//! descending and exit it on every path out; on any successful return from
//! the driver all three `cur` counters equal their entry values.
//!
//! ## Concurrency
//!
//! A context serves one flow at a time. Callers that process documents
//! concurrently use one context per flow.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::entities::encrypted_context::EncryptedContext;
use crate::entities::key::Key;
use crate::error::KeyInfoError;
use crate::services::encryption_engine::EncryptionEngine;
use crate::services::key_data_registry::{KeyDataRegistry, KeyDataService};
use crate::services::keys_manager_service::KeysManagerService;
use crate::services::transform_service::{NullUriResolver, TransformContext, UriResolver};
use crate::value_objects::{
    CryptoOperation, KeyDataId, KeyDataUsage, KeyRequirement, ProcessingFlags, ProcessingMode,
    XmlDocument,
};

/// Default recursion cap for retrieval-method, key-info-reference, and
/// encrypted-key processing.
pub const DEFAULT_MAX_LEVEL: u32 = 1;

/// Default certificate chain verification depth.
pub const DEFAULT_CERTS_VERIFICATION_DEPTH: u32 = 9;

/// Default line size for base64 output.
pub const DEFAULT_BASE64_LINE_SIZE: usize = 64;

/// Mutable state of one `KeyInfo` processing run.
pub struct KeyInfoContext {
    // Operation direction and surroundings
    mode: ProcessingMode,
    operation: CryptoOperation,

    // Collaborators (shared, read-only)
    registry: Arc<KeyDataRegistry>,
    keys_manager: Option<Arc<dyn KeysManagerService>>,
    uri_resolver: Arc<dyn UriResolver>,
    encryption_engine: Option<Arc<dyn EncryptionEngine>>,

    // User preferences
    flags: ProcessingFlags,
    enabled_key_data: Vec<KeyDataId>,
    key_requirement: KeyRequirement,
    base64_line_size: usize,
    max_retrieval_method_level: u32,
    max_key_info_reference_level: u32,
    max_encrypted_key_level: u32,
    certs_verification_time: Option<DateTime<Utc>>,
    certs_verification_depth: u32,
    user_data: Option<Arc<dyn Any + Send + Sync>>,

    // Per-run state
    cur_retrieval_method_level: u32,
    cur_key_info_reference_level: u32,
    cur_encrypted_key_level: u32,
    retrieval_method_ctx: Option<TransformContext>,
    key_info_reference_ctx: Option<TransformContext>,
    enc_ctx: Option<Box<EncryptedContext>>,
    source_document: Option<Arc<XmlDocument>>,
    failed_key_names: Vec<String>,
    resolved_key_cache: Vec<Key>,
}

impl KeyInfoContext {
    /// Creates a read-mode context with default preferences over the given
    /// registry.
    pub fn new(registry: Arc<KeyDataRegistry>) -> Self {
        KeyInfoContext {
            mode: ProcessingMode::Read,
            operation: CryptoOperation::None,
            registry,
            keys_manager: None,
            uri_resolver: Arc::new(NullUriResolver),
            encryption_engine: None,
            flags: ProcessingFlags::empty(),
            enabled_key_data: Vec::new(),
            key_requirement: KeyRequirement::default(),
            base64_line_size: DEFAULT_BASE64_LINE_SIZE,
            max_retrieval_method_level: DEFAULT_MAX_LEVEL,
            max_key_info_reference_level: DEFAULT_MAX_LEVEL,
            max_encrypted_key_level: DEFAULT_MAX_LEVEL,
            certs_verification_time: None,
            certs_verification_depth: DEFAULT_CERTS_VERIFICATION_DEPTH,
            user_data: None,
            cur_retrieval_method_level: 0,
            cur_key_info_reference_level: 0,
            cur_encrypted_key_level: 0,
            retrieval_method_ctx: None,
            key_info_reference_ctx: None,
            enc_ctx: None,
            source_document: None,
            failed_key_names: Vec::new(),
            resolved_key_cache: Vec::new(),
        }
    }

    // ---- direction and surroundings -------------------------------------

    /// Gets the operation direction.
    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    /// Sets the operation direction. Must be done before driving.
    pub fn set_mode(&mut self, mode: ProcessingMode) {
        self.mode = mode;
    }

    /// Gets the surrounding cryptographic operation.
    pub fn operation(&self) -> CryptoOperation {
        self.operation
    }

    /// Sets the surrounding cryptographic operation.
    pub fn set_operation(&mut self, operation: CryptoOperation) {
        self.operation = operation;
    }

    // ---- collaborators --------------------------------------------------

    /// Gets the registry dispatch goes through.
    pub fn registry(&self) -> &Arc<KeyDataRegistry> {
        &self.registry
    }

    /// Gets the keys manager, if one is installed.
    pub fn keys_manager(&self) -> Option<&Arc<dyn KeysManagerService>> {
        self.keys_manager.as_ref()
    }

    /// Installs a keys manager.
    pub fn set_keys_manager(&mut self, manager: Option<Arc<dyn KeysManagerService>>) {
        self.keys_manager = manager;
    }

    /// Gets the URI resolver used by dereference pipelines.
    pub fn uri_resolver(&self) -> &Arc<dyn UriResolver> {
        &self.uri_resolver
    }

    /// Installs the URI resolver. Existing dereference contexts are
    /// discarded so the next use picks the new resolver up.
    pub fn set_uri_resolver(&mut self, resolver: Arc<dyn UriResolver>) {
        self.uri_resolver = resolver;
        self.retrieval_method_ctx = None;
        self.key_info_reference_ctx = None;
    }

    /// Gets the encryption engine, if one is installed.
    pub fn encryption_engine(&self) -> Option<&Arc<dyn EncryptionEngine>> {
        self.encryption_engine.as_ref()
    }

    /// Installs an encryption engine.
    pub fn set_encryption_engine(&mut self, engine: Option<Arc<dyn EncryptionEngine>>) {
        self.encryption_engine = engine;
    }

    // ---- user preferences -----------------------------------------------

    /// Gets the strictness flags.
    pub fn flags(&self) -> ProcessingFlags {
        self.flags
    }

    /// Sets the strictness flags.
    pub fn set_flags(&mut self, flags: ProcessingFlags) {
        self.flags = flags;
    }

    /// Gets the enabled key-data restriction list (empty = unrestricted).
    pub fn enabled_key_data(&self) -> &[KeyDataId] {
        &self.enabled_key_data
    }

    /// Restricts dispatch to the given identifiers.
    ///
    /// Every identifier must name a registered service; restricting to an
    /// unknown kind is a caller bug.
    pub fn set_enabled_key_data(&mut self, ids: Vec<KeyDataId>) -> Result<(), KeyInfoError> {
        for id in &ids {
            if !self.registry.contains(*id) {
                return Err(KeyInfoError::internal(format!(
                    "cannot enable unregistered key data '{}'",
                    id
                )));
            }
        }
        self.enabled_key_data = ids;
        Ok(())
    }

    /// Checks whether a kind passes the enabled-key-data restriction.
    pub fn is_key_data_enabled(&self, id: KeyDataId) -> bool {
        self.enabled_key_data.is_empty() || self.enabled_key_data.contains(&id)
    }

    /// Gets the key requirement candidates are matched against.
    pub fn key_requirement(&self) -> &KeyRequirement {
        &self.key_requirement
    }

    /// Sets the key requirement.
    pub fn set_key_requirement(&mut self, requirement: KeyRequirement) {
        self.key_requirement = requirement;
    }

    /// Gets the base64 output line size.
    pub fn base64_line_size(&self) -> usize {
        self.base64_line_size
    }

    /// Sets the base64 output line size (0 disables wrapping).
    pub fn set_base64_line_size(&mut self, size: usize) {
        self.base64_line_size = size;
    }

    /// Sets the retrieval-method recursion cap.
    pub fn set_max_retrieval_method_level(&mut self, max: u32) {
        self.max_retrieval_method_level = max;
    }

    /// Sets the key-info-reference recursion cap.
    pub fn set_max_key_info_reference_level(&mut self, max: u32) {
        self.max_key_info_reference_level = max;
    }

    /// Sets the encrypted-key recursion cap.
    pub fn set_max_encrypted_key_level(&mut self, max: u32) {
        self.max_encrypted_key_level = max;
    }

    /// Gets the retrieval-method recursion cap.
    pub fn max_retrieval_method_level(&self) -> u32 {
        self.max_retrieval_method_level
    }

    /// Gets the key-info-reference recursion cap.
    pub fn max_key_info_reference_level(&self) -> u32 {
        self.max_key_info_reference_level
    }

    /// Gets the encrypted-key recursion cap.
    pub fn max_encrypted_key_level(&self) -> u32 {
        self.max_encrypted_key_level
    }

    /// Gets the certificate verification time override.
    pub fn certs_verification_time(&self) -> Option<DateTime<Utc>> {
        self.certs_verification_time
    }

    /// Sets the certificate verification time override (`None` = now).
    pub fn set_certs_verification_time(&mut self, time: Option<DateTime<Utc>>) {
        self.certs_verification_time = time;
    }

    /// Gets the certificate chain verification depth.
    pub fn certs_verification_depth(&self) -> u32 {
        self.certs_verification_depth
    }

    /// Sets the certificate chain verification depth.
    pub fn set_certs_verification_depth(&mut self, depth: u32) {
        self.certs_verification_depth = depth;
    }

    /// Gets the opaque user data handed through to handlers.
    pub fn user_data(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.user_data.as_ref()
    }

    /// Installs opaque user data.
    pub fn set_user_data(&mut self, data: Option<Arc<dyn Any + Send + Sync>>) {
        self.user_data = data;
    }

    // ---- dispatch helpers -----------------------------------------------

    /// Resolves a service by element identity, honoring the enabled-key-data
    /// restriction.
    pub fn resolve_by_node(
        &self,
        local: &str,
        namespace: Option<&str>,
        usage: KeyDataUsage,
    ) -> Option<Arc<dyn KeyDataService>> {
        self.registry
            .find_by_node(local, namespace, usage)
            .filter(|s| self.is_key_data_enabled(s.id()))
    }

    /// Resolves a service by href, honoring the enabled-key-data
    /// restriction.
    pub fn resolve_by_href(&self, href: &str, usage: KeyDataUsage) -> Option<Arc<dyn KeyDataService>> {
        self.registry
            .find_by_href(href, usage)
            .filter(|s| self.is_key_data_enabled(s.id()))
    }

    // ---- source document ------------------------------------------------

    /// Gets the document same-document references resolve against.
    pub fn source_document(&self) -> Option<Arc<XmlDocument>> {
        self.source_document.clone()
    }

    /// Installs the document same-document references resolve against.
    /// Per-run state; cleared by `reset`.
    pub fn set_source_document(&mut self, doc: Option<Arc<XmlDocument>>) {
        self.source_document = doc;
    }

    // ---- dereference contexts -------------------------------------------

    /// Gets the retrieval-method dereference context, creating it on first
    /// use.
    pub fn ensure_retrieval_method_ctx(&mut self) -> &mut TransformContext {
        let resolver = self.uri_resolver.clone();
        self.retrieval_method_ctx
            .get_or_insert_with(|| TransformContext::new(resolver))
    }

    /// Gets the key-info-reference dereference context, creating it on
    /// first use.
    pub fn ensure_key_info_reference_ctx(&mut self) -> &mut TransformContext {
        let resolver = self.uri_resolver.clone();
        self.key_info_reference_ctx
            .get_or_insert_with(|| TransformContext::new(resolver))
    }

    // ---- encrypted-data context -----------------------------------------

    /// Ensures the encrypted-data context exists and carries this context's
    /// current preferences.
    ///
    /// Created lazily on first use, bound to the keys manager and the
    /// installed engine; reset and refreshed on reuse. Fails with
    /// `NotSupported` when no engine is installed.
    pub fn prepare_enc_ctx(&mut self) -> Result<(), KeyInfoError> {
        let mut ec = match self.enc_ctx.take() {
            Some(mut ec) => {
                ec.reset();
                ec
            }
            None => {
                let engine = self.encryption_engine.clone().ok_or_else(|| {
                    KeyInfoError::not_supported(
                        "encrypted key processing requires an encryption engine",
                    )
                })?;
                Box::new(EncryptedContext::new(
                    self.registry.clone(),
                    engine,
                    self.keys_manager.clone(),
                    self.uri_resolver.clone(),
                ))
            }
        };
        // The outer preferences may have changed since creation; the inner
        // contexts must see the current ones.
        ec.copy_user_prefs_from(self);
        self.enc_ctx = Some(ec);
        Ok(())
    }

    /// Takes the encrypted-data context out for use; put it back with
    /// [`put_enc_ctx`](Self::put_enc_ctx).
    pub fn take_enc_ctx(&mut self) -> Option<Box<EncryptedContext>> {
        self.enc_ctx.take()
    }

    /// Returns a previously taken encrypted-data context.
    pub fn put_enc_ctx(&mut self, ec: Box<EncryptedContext>) {
        self.enc_ctx = Some(ec);
    }

    // ---- recursion accounting -------------------------------------------

    /// Gets the current retrieval-method depth.
    pub fn cur_retrieval_method_level(&self) -> u32 {
        self.cur_retrieval_method_level
    }

    /// Gets the current key-info-reference depth.
    pub fn cur_key_info_reference_level(&self) -> u32 {
        self.cur_key_info_reference_level
    }

    /// Gets the current encrypted-key depth.
    pub fn cur_encrypted_key_level(&self) -> u32 {
        self.cur_encrypted_key_level
    }

    /// Enters one retrieval-method level, failing at the cap.
    pub fn enter_retrieval_method_level(&mut self) -> Result<(), KeyInfoError> {
        if self.cur_retrieval_method_level >= self.max_retrieval_method_level {
            return Err(KeyInfoError::max_level_exceeded(format!(
                "RetrievalMethod level {} reached (max {})",
                self.cur_retrieval_method_level, self.max_retrieval_method_level
            )));
        }
        self.cur_retrieval_method_level += 1;
        Ok(())
    }

    /// Exits one retrieval-method level.
    pub fn exit_retrieval_method_level(&mut self) {
        self.cur_retrieval_method_level = self.cur_retrieval_method_level.saturating_sub(1);
    }

    /// Enters one key-info-reference level, failing at the cap.
    pub fn enter_key_info_reference_level(&mut self) -> Result<(), KeyInfoError> {
        if self.cur_key_info_reference_level >= self.max_key_info_reference_level {
            return Err(KeyInfoError::max_level_exceeded(format!(
                "KeyInfoReference level {} reached (max {})",
                self.cur_key_info_reference_level, self.max_key_info_reference_level
            )));
        }
        self.cur_key_info_reference_level += 1;
        Ok(())
    }

    /// Exits one key-info-reference level.
    pub fn exit_key_info_reference_level(&mut self) {
        self.cur_key_info_reference_level = self.cur_key_info_reference_level.saturating_sub(1);
    }

    /// Checks the encrypted-key cap without entering.
    pub fn check_encrypted_key_level(&self) -> Result<(), KeyInfoError> {
        if self.cur_encrypted_key_level >= self.max_encrypted_key_level {
            return Err(KeyInfoError::max_level_exceeded(format!(
                "EncryptedKey level {} reached (max {})",
                self.cur_encrypted_key_level, self.max_encrypted_key_level
            )));
        }
        Ok(())
    }

    /// Enters one encrypted-key level, failing at the cap.
    pub fn enter_encrypted_key_level(&mut self) -> Result<(), KeyInfoError> {
        self.check_encrypted_key_level()?;
        self.cur_encrypted_key_level += 1;
        Ok(())
    }

    /// Exits one encrypted-key level.
    pub fn exit_encrypted_key_level(&mut self) {
        self.cur_encrypted_key_level = self.cur_encrypted_key_level.saturating_sub(1);
    }

    // ---- per-run diagnostics and key cache ------------------------------

    /// Records a name the keys manager was asked for without success.
    pub fn record_failed_name(&mut self, name: &str) {
        self.failed_key_names.push(name.to_string());
    }

    /// Gets the names tried against the keys manager without a hit.
    pub fn failed_key_names(&self) -> &[String] {
        &self.failed_key_names
    }

    /// Registers a key resolved mid-run (derived or agreed) so that a later
    /// `<KeyName>` in the same `KeyInfo` can reference it by name.
    pub fn cache_resolved_key(&mut self, key: Key) {
        self.resolved_key_cache.push(key);
    }

    /// Finds a cached mid-run key by name.
    pub fn find_cached_key(&self, name: &str) -> Option<&Key> {
        self.resolved_key_cache
            .iter()
            .find(|k| k.name() == Some(name))
    }

    // ---- lifecycle ------------------------------------------------------

    /// Clears per-run state; preferences survive.
    pub fn reset(&mut self) {
        self.cur_retrieval_method_level = 0;
        self.cur_key_info_reference_level = 0;
        self.cur_encrypted_key_level = 0;
        if let Some(ctx) = self.retrieval_method_ctx.as_mut() {
            ctx.reset();
        }
        if let Some(ctx) = self.key_info_reference_ctx.as_mut() {
            ctx.reset();
        }
        if let Some(ec) = self.enc_ctx.as_mut() {
            ec.reset();
        }
        self.source_document = None;
        self.failed_key_names.clear();
        self.resolved_key_cache.clear();
    }

    /// Copies every user preference from `src`; never the direction, the
    /// recursion depths, or other per-run state. The enabled-key-data list
    /// is deep-copied; sub-pipeline contexts are rebuilt from the copied
    /// preferences at their next use.
    pub fn copy_user_pref_from(&mut self, src: &KeyInfoContext) {
        self.operation = src.operation;
        self.registry = src.registry.clone();
        self.keys_manager = src.keys_manager.clone();
        self.uri_resolver = src.uri_resolver.clone();
        self.encryption_engine = src.encryption_engine.clone();
        self.flags = src.flags;
        self.enabled_key_data = src.enabled_key_data.clone();
        self.key_requirement = src.key_requirement.clone();
        self.base64_line_size = src.base64_line_size;
        self.max_retrieval_method_level = src.max_retrieval_method_level;
        self.max_key_info_reference_level = src.max_key_info_reference_level;
        self.max_encrypted_key_level = src.max_encrypted_key_level;
        self.certs_verification_time = src.certs_verification_time;
        self.certs_verification_depth = src.certs_verification_depth;
        self.user_data = src.user_data.clone();
        // Dereference contexts are bound to the resolver; rebuild lazily.
        self.retrieval_method_ctx = None;
        self.key_info_reference_ctx = None;
    }
}

impl fmt::Debug for KeyInfoContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyInfoContext")
            .field("mode", &self.mode)
            .field("operation", &self.operation)
            .field("flags", &self.flags)
            .field("enabled_key_data", &self.enabled_key_data)
            .field("key_requirement", &self.key_requirement)
            .field(
                "levels",
                &(
                    self.cur_retrieval_method_level,
                    self.cur_key_info_reference_level,
                    self.cur_encrypted_key_level,
                ),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::KeyType;

    fn context() -> KeyInfoContext {
        KeyInfoContext::new(Arc::new(KeyDataRegistry::new()))
    }

    /// Tests construction defaults.
    ///
    /// Validates that:
    /// - All recursion caps default to 1 with zero current depth
    /// - Certificate verification depth defaults to 9
    /// - Flags are clear and no restriction list is installed
    #[test]
    fn test_defaults() {
        let ctx = context();
        assert_eq!(ctx.mode(), ProcessingMode::Read);
        assert_eq!(ctx.max_retrieval_method_level(), 1);
        assert_eq!(ctx.max_key_info_reference_level(), 1);
        assert_eq!(ctx.max_encrypted_key_level(), 1);
        assert_eq!(ctx.cur_retrieval_method_level(), 0);
        assert_eq!(ctx.certs_verification_depth(), 9);
        assert_eq!(ctx.base64_line_size(), 64);
        assert!(ctx.flags().is_empty());
        assert!(ctx.enabled_key_data().is_empty());
    }

    /// Tests level accounting at the cap.
    #[test]
    fn test_level_accounting() {
        let mut ctx = context();
        ctx.enter_retrieval_method_level().unwrap();
        assert_eq!(ctx.cur_retrieval_method_level(), 1);
        assert!(matches!(
            ctx.enter_retrieval_method_level(),
            Err(KeyInfoError::MaxLevelExceeded(_))
        ));
        ctx.exit_retrieval_method_level();
        assert_eq!(ctx.cur_retrieval_method_level(), 0);

        ctx.set_max_encrypted_key_level(2);
        ctx.enter_encrypted_key_level().unwrap();
        ctx.enter_encrypted_key_level().unwrap();
        assert!(ctx.check_encrypted_key_level().is_err());
        ctx.exit_encrypted_key_level();
        ctx.exit_encrypted_key_level();
        assert_eq!(ctx.cur_encrypted_key_level(), 0);
    }

    /// Tests that reset clears per-run state and keeps preferences.
    #[test]
    fn test_reset_preserves_preferences() {
        let mut ctx = context();
        ctx.set_flags(ProcessingFlags::STOP_ON_UNKNOWN_CHILD);
        ctx.set_base64_line_size(76);
        ctx.set_max_retrieval_method_level(3);
        ctx.enter_retrieval_method_level().unwrap();
        ctx.record_failed_name("alice");
        ctx.cache_resolved_key(Key::symmetric("derived", vec![1; 16]));

        ctx.reset();

        assert_eq!(ctx.cur_retrieval_method_level(), 0);
        assert!(ctx.failed_key_names().is_empty());
        assert!(ctx.find_cached_key("derived").is_none());
        assert_eq!(ctx.flags(), ProcessingFlags::STOP_ON_UNKNOWN_CHILD);
        assert_eq!(ctx.base64_line_size(), 76);
        assert_eq!(ctx.max_retrieval_method_level(), 3);
    }

    /// Tests preference copying.
    ///
    /// Validates that:
    /// - Every user preference transfers
    /// - The enabled list is an independent copy
    /// - Direction and recursion depths do not transfer
    #[test]
    fn test_copy_user_pref() {
        let mut src = context();
        src.set_mode(ProcessingMode::Write);
        src.set_operation(CryptoOperation::Decrypt);
        src.set_flags(ProcessingFlags::DONT_STOP_ON_KEY_FOUND);
        src.set_key_requirement(KeyRequirement::default().with_key_type(KeyType::Symmetric));
        src.set_base64_line_size(0);
        src.set_max_encrypted_key_level(4);
        src.set_certs_verification_depth(3);
        src.set_user_data(Some(Arc::new("caller state".to_string())));
        src.enter_encrypted_key_level().unwrap();

        let mut dst = context();
        dst.copy_user_pref_from(&src);

        assert_eq!(dst.operation(), CryptoOperation::Decrypt);
        assert_eq!(dst.flags(), ProcessingFlags::DONT_STOP_ON_KEY_FOUND);
        assert_eq!(dst.key_requirement(), src.key_requirement());
        assert_eq!(dst.base64_line_size(), 0);
        assert_eq!(dst.max_encrypted_key_level(), 4);
        assert_eq!(dst.certs_verification_depth(), 3);
        let user_data = dst.user_data().expect("user data transfers");
        assert_eq!(user_data.downcast_ref::<String>().map(String::as_str), Some("caller state"));
        // Per-run and direction state is not a preference.
        assert_eq!(dst.mode(), ProcessingMode::Read);
        assert_eq!(dst.cur_encrypted_key_level(), 0);
    }

    #[test]
    fn test_enabling_unregistered_key_data_is_rejected() {
        let mut ctx = context();
        let result = ctx.set_enabled_key_data(vec![KeyDataId("ghost")]);
        assert!(matches!(result, Err(KeyInfoError::Internal(_))));
        assert!(ctx.is_key_data_enabled(KeyDataId("anything")));
    }

    #[test]
    fn test_prepare_enc_ctx_requires_engine() {
        let mut ctx = context();
        assert!(matches!(
            ctx.prepare_enc_ctx(),
            Err(KeyInfoError::NotSupported(_))
        ));
    }
}
