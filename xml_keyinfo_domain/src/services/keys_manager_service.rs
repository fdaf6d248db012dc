// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Keys Manager Seam
//!
//! Interface to the external directory that maps names to keys. The
//! processor shares a manager by reference and treats it as read-only;
//! `<KeyName>` and `<DerivedKey>`/`<MasterKeyName>` resolution go through
//! it.

use crate::entities::key::Key;
use crate::error::KeyInfoError;
use crate::value_objects::KeyRequirement;

/// Lookup service resolving names to keys.
pub trait KeysManagerService: Send + Sync {
    /// Finds a key matching the requirement.
    ///
    /// When `name` is given, only keys carrying exactly that name qualify.
    /// Returns `Ok(None)` when nothing matches; errors are reserved for
    /// store failures.
    fn find_key(
        &self,
        name: Option<&str>,
        requirement: &KeyRequirement,
    ) -> Result<Option<Key>, KeyInfoError>;
}
