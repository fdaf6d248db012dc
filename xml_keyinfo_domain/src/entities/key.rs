// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Entity
//!
//! The key aggregate a `KeyInfo` walk populates or serializes. A key is a
//! name, an optional piece of typed key material, and an intended-use
//! bitset. The processor interacts with keys only through the operations
//! here: validity, naming, material access, copying, emptying, and matching
//! against a requirement.
//!
//! ## Key Material
//!
//! Material is a closed set of tagged variants. Symmetric secrets are wiped
//! from memory when dropped; the asymmetric variants carry only public
//! parameters, so they are plain data.
//!
//! ## Matching
//!
//! `Key::matches` evaluates a [`KeyRequirement`]: key-data kind, structural
//! class, permitted uses, and minimum bit size. An empty key never matches.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::value_objects::key_requirement::{KeyRequirement, KeyType, KeyUse};
use crate::value_objects::KeyDataId;

/// Identifier of the symmetric key-data kind.
pub const SYMMETRIC_KEY_DATA_ID: KeyDataId = KeyDataId("symmetric");

/// Identifier of the RSA key-value kind.
pub const RSA_KEY_DATA_ID: KeyDataId = KeyDataId("rsa-key-value");

/// Identifier of the EC key-value kind.
pub const EC_KEY_DATA_ID: KeyDataId = KeyDataId("ec-key-value");

/// Secret octets for a symmetric key. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricMaterial {
    bytes: Vec<u8>,
}

impl SymmetricMaterial {
    /// Wraps raw key octets.
    pub fn new(bytes: Vec<u8>) -> Self {
        SymmetricMaterial { bytes }
    }

    /// Gets the key octets.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Gets the key size in bits.
    pub fn bits(&self) -> usize {
        self.bytes.len() * 8
    }
}

// Secret bytes stay out of debug output.
impl std::fmt::Debug for SymmetricMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricMaterial({} bits)", self.bits())
    }
}

/// RSA public parameters, big-endian octets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaPublicParams {
    /// RSA modulus parameter
    pub modulus: Vec<u8>,
    /// RSA exponent parameter
    pub exponent: Vec<u8>,
}

impl RsaPublicParams {
    /// Gets the modulus size in bits, ignoring leading zero octets.
    pub fn bits(&self) -> usize {
        let significant = self.modulus.iter().skip_while(|b| **b == 0).count();
        significant * 8
    }
}

/// EC public parameters: a curve identified by URI and an encoded point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcPublicParams {
    /// Curve identifier URI (e.g. `urn:oid:1.2.840.10045.3.1.7`)
    pub named_curve: String,
    /// Encoded public key point
    pub public_key: Vec<u8>,
}

impl EcPublicParams {
    /// Approximates the curve strength from the encoded point length
    /// (uncompressed points carry two coordinates plus a tag octet).
    pub fn bits(&self) -> usize {
        self.public_key.len().saturating_sub(1) / 2 * 8
    }
}

/// Typed key material.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum KeyMaterial {
    /// A symmetric key
    Symmetric(SymmetricMaterial),
    /// An RSA public key
    Rsa(RsaPublicParams),
    /// An elliptic curve public key
    Ec(EcPublicParams),
}

impl KeyMaterial {
    /// Gets the key-data kind this material belongs to.
    pub fn data_id(&self) -> KeyDataId {
        match self {
            KeyMaterial::Symmetric(_) => SYMMETRIC_KEY_DATA_ID,
            KeyMaterial::Rsa(_) => RSA_KEY_DATA_ID,
            KeyMaterial::Ec(_) => EC_KEY_DATA_ID,
        }
    }

    /// Gets the structural class of the material.
    pub fn key_type(&self) -> KeyType {
        match self {
            KeyMaterial::Symmetric(_) => KeyType::Symmetric,
            KeyMaterial::Rsa(_) | KeyMaterial::Ec(_) => KeyType::Public,
        }
    }

    /// Gets the key size in bits.
    pub fn bits(&self) -> usize {
        match self {
            KeyMaterial::Symmetric(m) => m.bits(),
            KeyMaterial::Rsa(m) => m.bits(),
            KeyMaterial::Ec(m) => m.bits(),
        }
    }
}

impl From<SymmetricMaterial> for KeyMaterial {
    fn from(material: SymmetricMaterial) -> Self {
        KeyMaterial::Symmetric(material)
    }
}

impl From<RsaPublicParams> for KeyMaterial {
    fn from(params: RsaPublicParams) -> Self {
        KeyMaterial::Rsa(params)
    }
}

impl From<EcPublicParams> for KeyMaterial {
    fn from(params: EcPublicParams) -> Self {
        KeyMaterial::Ec(params)
    }
}

/// A cryptographic key under population or serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Key {
    name: Option<String>,
    material: Option<KeyMaterial>,
    usage: Option<KeyUse>,
}

impl Key {
    /// Creates an empty key with no name, no material, and unrestricted use.
    pub fn new() -> Self {
        Key::default()
    }

    /// Creates a key holding the given material.
    pub fn with_material(material: impl Into<KeyMaterial>) -> Self {
        Key {
            name: None,
            material: Some(material.into()),
            usage: None,
        }
    }

    /// Creates a named symmetric key. Convenience for stores and tests.
    pub fn symmetric(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Key {
            name: Some(name.into()),
            material: Some(KeyMaterial::Symmetric(SymmetricMaterial::new(bytes))),
            usage: None,
        }
    }

    /// Checks whether the key has a value.
    pub fn is_valid(&self) -> bool {
        self.material.is_some()
    }

    /// Gets the key name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sets or clears the key name.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Gets the key material.
    pub fn material(&self) -> Option<&KeyMaterial> {
        self.material.as_ref()
    }

    /// Sets the key material.
    pub fn set_material(&mut self, material: KeyMaterial) {
        self.material = Some(material);
    }

    /// Gets the declared uses; `None` means unrestricted.
    pub fn usage(&self) -> Option<KeyUse> {
        self.usage
    }

    /// Restricts the declared uses.
    pub fn set_usage(&mut self, usage: KeyUse) {
        self.usage = Some(usage);
    }

    /// Gets the key size in bits, or 0 for an empty key.
    pub fn bits(&self) -> usize {
        self.material.as_ref().map(KeyMaterial::bits).unwrap_or(0)
    }

    /// Gets the key-data kind of the material, if any.
    pub fn data_id(&self) -> Option<KeyDataId> {
        self.material.as_ref().map(KeyMaterial::data_id)
    }

    /// Clears name, material, and usage.
    pub fn empty(&mut self) {
        self.name = None;
        self.material = None;
        self.usage = None;
    }

    /// Replaces this key's contents with a copy of another key's.
    pub fn copy_from(&mut self, other: &Key) {
        self.name = other.name.clone();
        self.material = other.material.clone();
        self.usage = other.usage;
    }

    /// Evaluates a requirement against this key. An empty key never
    /// matches.
    pub fn matches(&self, req: &KeyRequirement) -> bool {
        let Some(material) = &self.material else {
            return false;
        };
        if let Some(required_id) = req.key_id {
            if material.data_id() != required_id {
                return false;
            }
        }
        match req.key_type {
            KeyType::Any => {}
            required => {
                if material.key_type() != required {
                    return false;
                }
            }
        }
        if let Some(required_usage) = req.usage {
            let permitted = self.usage.unwrap_or_else(KeyUse::any);
            if !permitted.contains(required_usage) {
                return false;
            }
        }
        if req.min_bits > 0 && material.bits() < req.min_bits {
            return false;
        }
        true
    }
}
