// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # AES-GCM Encryption Engine
//!
//! The concrete cryptographic backend: AES-256-GCM key wrapping with a
//! random 96-bit nonce prepended to the ciphertext, a SHA-256 counter-mode
//! concatenation KDF for derivation, and a digest-based shared-key
//! computation for agreement. Key-encryption keys and master keys must be
//! symmetric; asymmetric transport stays behind other engines.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use xml_keyinfo_domain::entities::key::SymmetricMaterial;
use xml_keyinfo_domain::error::KeyInfoError;
use xml_keyinfo_domain::services::encryption_engine::EncryptionEngine;
use xml_keyinfo_domain::value_objects::namespaces::{HREF_AES256_GCM, HREF_CONCAT_KDF};
use xml_keyinfo_domain::value_objects::{KeyRequirement, XmlElement};
use xml_keyinfo_domain::{Key, KeyMaterial};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// AES-256-GCM based [`EncryptionEngine`].
#[derive(Debug, Default)]
pub struct GcmEncryptionEngine;

impl GcmEncryptionEngine {
    /// Creates the engine.
    pub fn new() -> Self {
        GcmEncryptionEngine
    }

    fn cipher_for(kek: &Key) -> Result<Aes256Gcm, KeyInfoError> {
        let Some(KeyMaterial::Symmetric(material)) = kek.material() else {
            return Err(KeyInfoError::encryption_failed(
                "key encryption key must be symmetric",
            ));
        };
        if material.bytes().len() != KEY_LEN {
            return Err(KeyInfoError::encryption_failed(format!(
                "key encryption key must be {} bits, got {}",
                KEY_LEN * 8,
                material.bits()
            )));
        }
        Aes256Gcm::new_from_slice(material.bytes())
            .map_err(|_| KeyInfoError::encryption_failed("bad key encryption key length"))
    }

    fn check_algorithm(algorithm: Option<&str>) -> Result<(), KeyInfoError> {
        match algorithm {
            None | Some(HREF_AES256_GCM) => Ok(()),
            Some(other) => Err(KeyInfoError::not_supported(format!(
                "encryption algorithm '{}'",
                other
            ))),
        }
    }

    fn material_octets(key: &Key) -> Result<Vec<u8>, KeyInfoError> {
        match key.material() {
            Some(KeyMaterial::Symmetric(m)) => Ok(m.bytes().to_vec()),
            Some(KeyMaterial::Rsa(p)) => {
                let mut out = p.modulus.clone();
                out.extend_from_slice(&p.exponent);
                Ok(out)
            }
            Some(KeyMaterial::Ec(p)) => Ok(p.public_key.clone()),
            None => Err(KeyInfoError::encryption_failed("party key has no material")),
            Some(_) => Err(KeyInfoError::not_supported("key material variant")),
        }
    }

    fn requested_len(requirement: &KeyRequirement) -> usize {
        if requirement.min_bits > 0 {
            requirement.min_bits.div_ceil(8)
        } else {
            KEY_LEN
        }
    }

    /// SHA-256 counter-mode expansion of `secret` to `out_len` bytes.
    fn expand(secret: &[u8], info: &[u8], out_len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(out_len.next_multiple_of(32));
        let mut counter: u32 = 1;
        while out.len() < out_len {
            let mut hasher = Sha256::new();
            hasher.update(counter.to_be_bytes());
            hasher.update(secret);
            hasher.update(info);
            out.extend_from_slice(&hasher.finalize());
            counter += 1;
        }
        out.truncate(out_len);
        out
    }
}

impl EncryptionEngine for GcmEncryptionEngine {
    fn decrypt(
        &self,
        algorithm: Option<&str>,
        cipher: &[u8],
        kek: &Key,
    ) -> Result<Zeroizing<Vec<u8>>, KeyInfoError> {
        Self::check_algorithm(algorithm)?;
        if cipher.len() < NONCE_LEN + TAG_LEN {
            return Err(KeyInfoError::encryption_failed("ciphertext is truncated"));
        }
        let aead = Self::cipher_for(kek)?;
        let nonce = Nonce::from_slice(&cipher[..NONCE_LEN]);
        let plain = aead
            .decrypt(nonce, &cipher[NONCE_LEN..])
            .map_err(|_| KeyInfoError::encryption_failed("authentication failed"))?;
        debug!(bytes = plain.len(), "unwrapped key material");
        Ok(Zeroizing::new(plain))
    }

    fn encrypt(
        &self,
        algorithm: Option<&str>,
        plain: &[u8],
        kek: &Key,
    ) -> Result<Vec<u8>, KeyInfoError> {
        Self::check_algorithm(algorithm)?;
        let aead = Self::cipher_for(kek)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let cipher = aead
            .encrypt(&nonce, plain)
            .map_err(|_| KeyInfoError::encryption_failed("encryption failed"))?;
        let mut out = nonce.to_vec();
        out.extend_from_slice(&cipher);
        Ok(out)
    }

    fn derive(
        &self,
        method: Option<&XmlElement>,
        master: &Key,
        requirement: &KeyRequirement,
    ) -> Result<Key, KeyInfoError> {
        if let Some(method) = method {
            match method.attribute("Algorithm") {
                None | Some(HREF_CONCAT_KDF) => {}
                Some(other) => {
                    return Err(KeyInfoError::not_supported(format!(
                        "key derivation algorithm '{}'",
                        other
                    )));
                }
            }
        }
        let Some(KeyMaterial::Symmetric(material)) = master.material() else {
            return Err(KeyInfoError::encryption_failed("master key must be symmetric"));
        };
        let out_len = Self::requested_len(requirement);
        let bytes = Self::expand(material.bytes(), b"derived", out_len);
        Ok(Key::with_material(SymmetricMaterial::new(bytes)))
    }

    fn agree(
        &self,
        _algorithm: Option<&str>,
        originator: Option<&Key>,
        recipient: Option<&Key>,
        nonce: Option<&[u8]>,
        requirement: &KeyRequirement,
    ) -> Result<Key, KeyInfoError> {
        if originator.is_none() && recipient.is_none() {
            return Err(KeyInfoError::encryption_failed(
                "key agreement needs at least one party key",
            ));
        }
        let mut secret = Vec::new();
        if let Some(key) = originator {
            secret.extend_from_slice(&Self::material_octets(key)?);
        }
        if let Some(key) = recipient {
            secret.extend_from_slice(&Self::material_octets(key)?);
        }
        let out_len = Self::requested_len(requirement);
        let bytes = Self::expand(&secret, nonce.unwrap_or_default(), out_len);
        Ok(Key::with_material(SymmetricMaterial::new(bytes)))
    }

    fn agreement_originator_key(&self, local: &Key) -> Result<Key, KeyInfoError> {
        match local.material() {
            Some(KeyMaterial::Rsa(_)) | Some(KeyMaterial::Ec(_)) => {
                let mut public = Key::new();
                public.copy_from(local);
                public.set_name(None);
                Ok(public)
            }
            Some(KeyMaterial::Symmetric(_)) => Err(KeyInfoError::not_supported(
                "symmetric keys cannot be advertised as originator material",
            )),
            None => Err(KeyInfoError::encryption_failed("originator key has no material")),
            Some(_) => Err(KeyInfoError::not_supported("key material variant")),
        }
    }
}
