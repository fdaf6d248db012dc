// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shared fixtures for the integration tests: contexts over the default
//! registry, stores, resolvers, and document helpers.

use std::sync::Arc;

use xml_keyinfo::infrastructure::dereference::InMemoryUriResolver;
use xml_keyinfo::infrastructure::encryption::GcmEncryptionEngine;
use xml_keyinfo::infrastructure::keystore::MemoryKeysStore;
use xml_keyinfo::infrastructure::registry::default_registry;
use xml_keyinfo_domain::{Key, KeyInfoContext, XmlDocument};

pub const DSIG: &str = "http://www.w3.org/2000/09/xmldsig#";
pub const DSIG11: &str = "http://www.w3.org/2009/xmldsig11#";
pub const XMLENC: &str = "http://www.w3.org/2001/04/xmlenc#";

/// A read-mode context over the default registry.
pub fn read_context() -> KeyInfoContext {
    KeyInfoContext::new(Arc::new(default_registry()))
}

/// A write-mode context over the default registry.
pub fn write_context() -> KeyInfoContext {
    let mut ctx = read_context();
    ctx.set_mode(xml_keyinfo_domain::ProcessingMode::Write);
    ctx
}

/// A read-mode context with a keys store, resolver, and engine installed.
pub fn full_context(store: MemoryKeysStore, resolver: InMemoryUriResolver) -> KeyInfoContext {
    let mut ctx = read_context();
    ctx.set_keys_manager(Some(Arc::new(store)));
    ctx.set_uri_resolver(Arc::new(resolver));
    ctx.set_encryption_engine(Some(Arc::new(GcmEncryptionEngine::new())));
    ctx
}

/// Parses a strict test document.
pub fn parse(xml: &str) -> XmlDocument {
    XmlDocument::parse(xml).expect("test document must parse")
}

/// A `<KeyInfo>` document with the given inner XML, DSig default
/// namespace, and the DSig 1.1 and XMLEnc prefixes predeclared.
pub fn key_info_doc(inner: &str) -> XmlDocument {
    parse(&format!(
        "<KeyInfo xmlns=\"{DSIG}\" xmlns:dsig11=\"{DSIG11}\" xmlns:xenc=\"{XMLENC}\">{inner}</KeyInfo>"
    ))
}

/// A 256-bit symmetric key under the given name.
pub fn symmetric_key(name: &str, fill: u8) -> Key {
    Key::symmetric(name, vec![fill; 32])
}
