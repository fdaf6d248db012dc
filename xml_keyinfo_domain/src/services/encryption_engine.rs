// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Encryption Engine Seam
//!
//! The cryptographic backend behind the encrypted-data context. The domain
//! layer parses `<EncryptedKey>`, `<DerivedKey>`, and `<AgreementMethod>`
//! structure and resolves the keys involved; the engine performs the actual
//! cipher, derivation, and agreement computations. Algorithms are passed as
//! opaque hrefs, and an engine refuses what it does not implement with
//! `NotSupported`.

use zeroize::Zeroizing;

use crate::entities::key::Key;
use crate::error::KeyInfoError;
use crate::value_objects::{KeyRequirement, XmlElement};

/// Cryptographic backend for encrypted-key, derived-key, and key-agreement
/// processing.
///
/// Implementations must be stateless (`Send + Sync`). Plaintext outputs are
/// returned in wiping buffers.
pub trait EncryptionEngine: Send + Sync {
    /// Decrypts cipher bytes with the key-encryption key.
    fn decrypt(
        &self,
        algorithm: Option<&str>,
        cipher: &[u8],
        kek: &Key,
    ) -> Result<Zeroizing<Vec<u8>>, KeyInfoError>;

    /// Encrypts plaintext bytes with the key-encryption key.
    fn encrypt(
        &self,
        algorithm: Option<&str>,
        plain: &[u8],
        kek: &Key,
    ) -> Result<Vec<u8>, KeyInfoError>;

    /// Derives a key from master material.
    ///
    /// `method` is the `<KeyDerivationMethod>` element when the document
    /// carries one; the requirement supplies the desired size.
    fn derive(
        &self,
        method: Option<&XmlElement>,
        master: &Key,
        requirement: &KeyRequirement,
    ) -> Result<Key, KeyInfoError>;

    /// Computes the shared key of a key agreement.
    fn agree(
        &self,
        algorithm: Option<&str>,
        originator: Option<&Key>,
        recipient: Option<&Key>,
        nonce: Option<&[u8]>,
        requirement: &KeyRequirement,
    ) -> Result<Key, KeyInfoError>;

    /// Gets the public originator key to advertise when writing an
    /// `<AgreementMethod>` element for `local`.
    fn agreement_originator_key(&self, local: &Key) -> Result<Key, KeyInfoError>;
}
