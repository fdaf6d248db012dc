// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # XML KeyInfo Processor
//!
//! Processing of the `<KeyInfo>` element of XML Digital Signature and XML
//! Encryption documents: given a parsed `KeyInfo` node and a processing
//! context, resolve the key it describes (read) or serialize a key into its
//! template children (write).
//!
//! The domain crate supplies the dispatch driver, the contexts, and the
//! service seams; this crate supplies the built-in handlers for
//! `<KeyName>`, `<KeyValue>`, `<RetrievalMethod>`, `<KeyInfoReference>`,
//! `<EncryptedKey>`, `<DerivedKey>`, and `<AgreementMethod>`, the concrete
//! key-value codecs, an in-memory keys store and URI resolver, and an
//! AES-GCM engine.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use xml_keyinfo::infrastructure::keystore::MemoryKeysStore;
//! use xml_keyinfo::infrastructure::registry::default_registry;
//! use xml_keyinfo_domain::{read_key_info, Key, KeyInfoContext, XmlDocument};
//!
//! let doc = XmlDocument::parse(
//!     "<KeyInfo xmlns=\"http://www.w3.org/2000/09/xmldsig#\">\
//!      <KeyName>alice</KeyName></KeyInfo>",
//! )
//! .unwrap();
//!
//! let store = MemoryKeysStore::new().with_key(Key::symmetric("alice", vec![7; 32]));
//! let mut ctx = KeyInfoContext::new(Arc::new(default_registry()));
//! ctx.set_keys_manager(Some(Arc::new(store)));
//!
//! let mut key = Key::new();
//! read_key_info(doc.root(), &mut key, &mut ctx).unwrap();
//! assert_eq!(key.name(), Some("alice"));
//! assert!(key.is_valid());
//! ```

pub mod infrastructure;

pub use infrastructure::dereference::InMemoryUriResolver;
pub use infrastructure::encryption::GcmEncryptionEngine;
pub use infrastructure::keystore::MemoryKeysStore;
pub use infrastructure::registry::default_registry;
