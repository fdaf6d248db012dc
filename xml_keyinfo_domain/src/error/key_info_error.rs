// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! This module provides the error system for the KeyInfo processing domain.
//! Failures are categorized by what the processor was looking at when it gave
//! up, so that callers can distinguish structural problems in the document
//! from semantic contradictions in the key material and from failures of the
//! collaborating subsystems.
//!
//! ## Error Categories
//!
//! ### Structural Errors
//! - **InvalidNode**: An element's name or namespace is not what the handler
//!   requires (e.g. a `KeyInfoReference` dereferencing to something other
//!   than `<KeyInfo>`)
//! - **InvalidAttribute**: A required attribute is missing or malformed
//!   (`URI`, `Type`)
//! - **InvalidContent**: Required text content is empty or undecodable
//! - **UnexpectedNode**: A sibling element where none is permitted
//!
//! ### Semantic Errors
//! - **InvalidKeyData**: The document contradicts the key being populated
//!   (two different names for the same key)
//! - **TypeMismatch**: A `RetrievalMethod` advertised one key-data type and
//!   dereferenced to another
//! - **MaxLevelExceeded**: A recursion cap on retrieval, reference, or
//!   encrypted-key processing was hit
//!
//! ### Collaborator Errors
//! - **XmlParse**: Input or dereferenced content is not parseable XML
//! - **EncryptionFailed**: Decryption, derivation, or key agreement failed
//! - **NotSupported**: A feature is not wired into this context (e.g. no
//!   encryption engine installed)
//! - **Internal**: A lower-layer collaborator failed in a way the processor
//!   cannot interpret
//!
//! ## Recovery
//!
//! Errors abort the current walk immediately. The only recovery paths are the
//! flag-gated policies on the processing context (lax unknown children,
//! tolerated decryption failures); those are decided by the handlers before
//! an error is ever constructed, never by inspecting an error after the fact.

use thiserror::Error;

/// Domain-specific errors for KeyInfo processing.
///
/// Each variant carries a descriptive message naming the element, attribute,
/// or collaborator involved. Variants map one-to-one to the failure kinds the
/// dispatch layer distinguishes; handlers pick the variant, the driver only
/// propagates.
#[derive(Error, Debug, Clone)]
pub enum KeyInfoError {
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("Invalid key data: {0}")]
    InvalidKeyData(String),

    #[error("Unexpected node: {0}")]
    UnexpectedNode(String),

    #[error("Max level exceeded: {0}")]
    MaxLevelExceeded(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("Encryption error: {0}")]
    EncryptionFailed(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl KeyInfoError {
    /// Creates a new invalid-node error
    pub fn invalid_node(msg: impl Into<String>) -> Self {
        Self::InvalidNode(msg.into())
    }

    /// Creates a new invalid-attribute error
    pub fn invalid_attribute(msg: impl Into<String>) -> Self {
        Self::InvalidAttribute(msg.into())
    }

    /// Creates a new invalid-content error
    pub fn invalid_content(msg: impl Into<String>) -> Self {
        Self::InvalidContent(msg.into())
    }

    /// Creates a new invalid-key-data error
    pub fn invalid_key_data(msg: impl Into<String>) -> Self {
        Self::InvalidKeyData(msg.into())
    }

    /// Creates a new unexpected-node error
    pub fn unexpected_node(msg: impl Into<String>) -> Self {
        Self::UnexpectedNode(msg.into())
    }

    /// Creates a new max-level-exceeded error
    pub fn max_level_exceeded(msg: impl Into<String>) -> Self {
        Self::MaxLevelExceeded(msg.into())
    }

    /// Creates a new type-mismatch error
    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }

    /// Creates a new XML parse error
    pub fn xml_parse(msg: impl Into<String>) -> Self {
        Self::XmlParse(msg.into())
    }

    /// Creates a new encryption error
    pub fn encryption_failed(msg: impl Into<String>) -> Self {
        Self::EncryptionFailed(msg.into())
    }

    /// Creates a new not-supported error
    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    /// Creates a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Checks if the error describes document structure rather than key
    /// semantics or collaborator failure
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            KeyInfoError::InvalidNode(_)
                | KeyInfoError::InvalidAttribute(_)
                | KeyInfoError::InvalidContent(_)
                | KeyInfoError::UnexpectedNode(_)
        )
    }

    /// Gets the error category
    pub fn category(&self) -> &'static str {
        match self {
            KeyInfoError::InvalidNode(_) => "node",
            KeyInfoError::InvalidAttribute(_) => "attribute",
            KeyInfoError::InvalidContent(_) => "content",
            KeyInfoError::InvalidKeyData(_) => "key-data",
            KeyInfoError::UnexpectedNode(_) => "node",
            KeyInfoError::MaxLevelExceeded(_) => "recursion",
            KeyInfoError::TypeMismatch(_) => "retrieval",
            KeyInfoError::XmlParse(_) => "xml",
            KeyInfoError::EncryptionFailed(_) => "encryption",
            KeyInfoError::NotSupported(_) => "support",
            KeyInfoError::Internal(_) => "internal",
        }
    }
}
