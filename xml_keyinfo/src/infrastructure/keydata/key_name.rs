// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # KeyName Handler
//!
//! `<KeyName>` carries a textual name for the key. Reading it resolves the
//! name against keys cached earlier in the same run (derived or agreed
//! keys) and then against the keys manager; writing emits the key's name
//! into the template.
//!
//! A name that contradicts a name the key already carries is a fatal
//! semantic error: two children of one `KeyInfo` describing different keys
//! is a malformed document, not something to recover from.

use tracing::debug;

use xml_keyinfo_domain::error::KeyInfoError;
use xml_keyinfo_domain::services::key_data_registry::{KeyDataService, WriteOutcome};
use xml_keyinfo_domain::value_objects::namespaces::NS_DSIG;
use xml_keyinfo_domain::value_objects::{KeyDataId, KeyDataUsage, XmlElement};
use xml_keyinfo_domain::{Key, KeyInfoContext};

/// Identifier of the `KeyName` handler.
pub const KEY_NAME_ID: KeyDataId = KeyDataId("key-name");

/// Handler for `<KeyName>` (DSig namespace).
#[derive(Debug, Default)]
pub struct KeyNameService;

impl KeyDataService for KeyNameService {
    fn id(&self) -> KeyDataId {
        KEY_NAME_ID
    }

    fn display_name(&self) -> &'static str {
        "KeyName"
    }

    fn usage(&self) -> KeyDataUsage {
        KeyDataUsage::KEY_INFO_READ | KeyDataUsage::KEY_INFO_WRITE
    }

    fn node_name(&self) -> Option<&'static str> {
        Some("KeyName")
    }

    fn node_namespace(&self) -> Option<&'static str> {
        Some(NS_DSIG)
    }

    fn read_xml(
        &self,
        key: &mut Key,
        node: &XmlElement,
        ctx: &mut KeyInfoContext,
    ) -> Result<(), KeyInfoError> {
        let content = node.text_content();
        let name = content.trim();
        if name.is_empty() {
            return Err(KeyInfoError::invalid_content("KeyName element is empty"));
        }

        if !key.is_valid() {
            if let Some(cached) = ctx.find_cached_key(name).cloned() {
                debug!(name, "KeyName resolved from the run's key cache");
                key.empty();
                key.copy_from(&cached);
                key.set_name(Some(name.to_string()));
            } else if let Some(manager) = ctx.keys_manager().cloned() {
                match manager.find_key(Some(name), ctx.key_requirement())? {
                    Some(found) => {
                        debug!(name, "KeyName resolved through the keys manager");
                        key.empty();
                        key.copy_from(&found);
                        key.set_name(Some(name.to_string()));
                    }
                    None => {
                        debug!(name, "keys manager has no key under this name");
                        ctx.record_failed_name(name);
                    }
                }
            }
        }

        match key.name() {
            Some(existing) if existing != name => Err(KeyInfoError::invalid_key_data(format!(
                "key is named '{}' but KeyName says '{}'",
                existing, name
            ))),
            _ => {
                key.set_name(Some(name.to_string()));
                Ok(())
            }
        }
    }

    fn write_xml(
        &self,
        key: &Key,
        node: &mut XmlElement,
        _ctx: &mut KeyInfoContext,
    ) -> Result<WriteOutcome, KeyInfoError> {
        let Some(name) = key.name() else {
            return Ok(WriteOutcome::Skipped);
        };
        // A template that already carries content is left alone.
        if node.has_text_content() {
            return Ok(WriteOutcome::Wrote);
        }
        node.set_text(name);
        Ok(WriteOutcome::Wrote)
    }
}
