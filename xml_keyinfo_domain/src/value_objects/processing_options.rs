// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Processing Options
//!
//! Direction, surrounding operation, and the strictness flags that govern a
//! `KeyInfo` processing run.
//!
//! ## Flag Semantics
//!
//! | Flag | Effect |
//! |---|---|
//! | `DONT_STOP_ON_KEY_FOUND` | Read continues even after a matching key is available |
//! | `STOP_ON_UNKNOWN_CHILD` | Unknown top-level `KeyInfo` child is fatal |
//! | `KEYVALUE_STOP_ON_UNKNOWN_CHILD` | Unknown `KeyValue` child (and unknown XML retrieval result) is fatal |
//! | `RETRMETHOD_STOP_ON_UNKNOWN_HREF` | Unresolved `Type=` on `RetrievalMethod` is fatal |
//! | `RETRMETHOD_STOP_ON_MISMATCH_HREF` | Dereference result's root element must match the advertised `Type` |
//! | `ENCKEY_DONT_STOP_ON_FAILED_DECRYPTION` | Failed `EncryptedKey`/`DerivedKey`/`AgreementMethod` is swallowed so siblings can be tried |
//!
//! All flags are clear by default: unknown children are ignored laxly, reads
//! stop as soon as the key satisfies the requirement, and a failed
//! decryption aborts.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of the current processing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingMode {
    /// Populate a key from a `<KeyInfo>` element
    Read,
    /// Populate a `<KeyInfo>` template from a key
    Write,
}

/// The cryptographic operation surrounding this `KeyInfo` run.
///
/// Propagated into sub-contexts so that nested processing (e.g. the
/// `KeyInfo` inside an `EncryptedKey`) knows what the ultimate key is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CryptoOperation {
    #[default]
    None,
    Sign,
    Verify,
    Encrypt,
    Decrypt,
}

impl fmt::Display for CryptoOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CryptoOperation::None => "none",
            CryptoOperation::Sign => "sign",
            CryptoOperation::Verify => "verify",
            CryptoOperation::Encrypt => "encrypt",
            CryptoOperation::Decrypt => "decrypt",
        };
        write!(f, "{}", name)
    }
}

bitflags! {
    /// Strictness switches for a processing run. See the module table for
    /// the effect of each bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ProcessingFlags: u32 {
        const DONT_STOP_ON_KEY_FOUND = 0x0000_0001;
        const STOP_ON_UNKNOWN_CHILD = 0x0000_0002;
        const KEYVALUE_STOP_ON_UNKNOWN_CHILD = 0x0000_0004;
        const RETRMETHOD_STOP_ON_UNKNOWN_HREF = 0x0000_0008;
        const RETRMETHOD_STOP_ON_MISMATCH_HREF = 0x0000_0010;
        const ENCKEY_DONT_STOP_ON_FAILED_DECRYPTION = 0x0000_0020;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_default_clear() {
        let flags = ProcessingFlags::default();
        assert!(flags.is_empty());
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(CryptoOperation::None.to_string(), "none");
        assert_eq!(CryptoOperation::Decrypt.to_string(), "decrypt");
    }
}
