// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # KeyInfo Domain
//!
//! The domain layer of the XML KeyInfo processor: the core business logic
//! of resolving, populating, and serializing cryptographic keys through the
//! `<KeyInfo>` element of XML Digital Signature and XML Encryption
//! documents. It is independent of external concerns: all I/O, logging,
//! and concrete cryptography live behind service seams implemented by the
//! infrastructure layer.
//!
//! ## Module Structure
//!
//! ### Entities
//! Mutable objects with identity through time:
//!
//! - `Key`: the key aggregate a processing run populates or serializes
//! - `KeyInfoContext`: preferences and per-run state of one processing run
//! - `EncryptedContext`: the encrypted-data context owning its own inner
//!   read/write `KeyInfoContext`s
//!
//! ### Value Objects
//! Immutable, attribute-equal objects:
//!
//! - `XmlElement`/`XmlDocument`: the namespace-aware element tree
//! - `KeyDataId`, `KeyDataUsage`: registry identity and dispatch contexts
//! - `KeyRequirement`, `KeyType`, `KeyUse`: the key-selection predicate
//! - `ProcessingFlags`, `ProcessingMode`, `CryptoOperation`: run options
//!
//! ### Domain Services
//! Stateless logic and collaborator seams:
//!
//! - `read_key_info`/`write_key_info`: the generic dispatch driver
//! - `KeyDataService`/`KeyDataRegistry`: the handler interface and its
//!   registry
//! - `KeysManagerService`, `EncryptionEngine`, `UriResolver`: seams to the
//!   keys store, the cryptographic backend, and the dereference I/O policy
//! - `TransformContext`: the dereference pipeline state
//!
//! ## Concurrency
//!
//! Processing is single-threaded and synchronous. Contexts serve one flow
//! at a time; collaborators shared by reference must be `Send + Sync`.

pub mod entities;
pub mod error;
pub mod services;
pub mod value_objects;

// Re-export commonly used types for convenient access
// These exports provide a clean API surface for consumers of the domain layer
pub use entities::{
    EncryptedContext, EncryptedDataMode, Key, KeyInfoContext, KeyMaterial, SymmetricMaterial,
};
pub use error::KeyInfoError;
pub use services::{
    read_key_info, write_key_info, EncryptionEngine, KeyDataRegistry, KeyDataService,
    KeysManagerService, UriResolver, WriteOutcome,
};
pub use value_objects::{
    CryptoOperation, KeyDataId, KeyDataUsage, KeyRequirement, KeyType, KeyUse, ProcessingFlags,
    ProcessingMode, XmlDocument, XmlElement,
};
