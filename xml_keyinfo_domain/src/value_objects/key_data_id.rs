// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Data Identifier
//!
//! Type-safe identifier for a registered key-data service. Identifiers are
//! static strings chosen by the service implementation ("key-name",
//! "rsa-key-value", ...); equality is by string identity, so two services
//! must never register the same id.

use serde::Serialize;
use std::fmt;

/// Identifier of one kind of `KeyInfo` child handler.
///
/// Copyable and comparable; used for registry membership tests, the
/// enabled-key-data restriction list, and key requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct KeyDataId(pub &'static str);

impl KeyDataId {
    /// Gets the identifier as a string slice.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for KeyDataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
