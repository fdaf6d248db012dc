// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Requirement
//!
//! The predicate a processing run uses to decide whether a candidate key is
//! the key the caller is looking for. A read walk stops as soon as the key
//! under population satisfies the requirement (unless the caller opted out),
//! and derived or agreed keys that fail it are discarded so later siblings
//! can be tried.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::key_data_id::KeyDataId;

/// Broad structural class of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyType {
    /// Any class is acceptable
    #[default]
    Any,
    /// Secret octets shared by both parties
    Symmetric,
    /// The public half of an asymmetric pair
    Public,
    /// The private half of an asymmetric pair
    Private,
}

bitflags! {
    /// Intended cryptographic uses of a key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeyUse: u32 {
        const SIGN = 0x0000_0001;
        const VERIFY = 0x0000_0002;
        const ENCRYPT = 0x0000_0004;
        const DECRYPT = 0x0000_0008;
        const KEY_EXCHANGE = 0x0000_0010;
    }
}

impl KeyUse {
    /// A key usable for everything; the default for keys with no declared
    /// restriction.
    pub fn any() -> Self {
        KeyUse::all()
    }
}

impl Default for KeyUse {
    fn default() -> Self {
        KeyUse::all()
    }
}

/// What the surrounding operation needs from the key being resolved.
///
/// A requirement with all fields at their defaults accepts every valid key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyRequirement {
    /// Required key-data kind; `None` accepts any kind
    pub key_id: Option<KeyDataId>,
    /// Required structural class
    pub key_type: KeyType,
    /// Uses the key must permit
    pub usage: Option<KeyUse>,
    /// Minimum key size in bits; 0 disables the check
    pub min_bits: usize,
}

impl KeyRequirement {
    /// Creates a requirement for a specific key-data kind.
    pub fn for_key_data(key_id: KeyDataId) -> Self {
        KeyRequirement {
            key_id: Some(key_id),
            ..Default::default()
        }
    }

    /// Sets the required structural class.
    pub fn with_key_type(mut self, key_type: KeyType) -> Self {
        self.key_type = key_type;
        self
    }

    /// Sets the required uses.
    pub fn with_usage(mut self, usage: KeyUse) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Sets the minimum key size in bits.
    pub fn with_min_bits(mut self, min_bits: usize) -> Self {
        self.min_bits = min_bits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_requirement_is_unconstrained() {
        let req = KeyRequirement::default();
        assert!(req.key_id.is_none());
        assert_eq!(req.key_type, KeyType::Any);
        assert!(req.usage.is_none());
        assert_eq!(req.min_bits, 0);
    }

    #[test]
    fn test_builder_setters() {
        let req = KeyRequirement::for_key_data(KeyDataId("symmetric"))
            .with_key_type(KeyType::Symmetric)
            .with_usage(KeyUse::DECRYPT)
            .with_min_bits(256);
        assert_eq!(req.key_id, Some(KeyDataId("symmetric")));
        assert_eq!(req.key_type, KeyType::Symmetric);
        assert_eq!(req.usage, Some(KeyUse::DECRYPT));
        assert_eq!(req.min_bits, 256);
    }
}
