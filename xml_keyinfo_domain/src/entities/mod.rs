// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Entities of the KeyInfo domain: the key aggregate and the two mutable
//! processing contexts.

pub mod encrypted_context;
pub mod key;
pub mod key_info_context;

pub use encrypted_context::{EncryptedContext, EncryptedDataMode};
pub use key::{
    EcPublicParams, Key, KeyMaterial, RsaPublicParams, SymmetricMaterial, EC_KEY_DATA_ID,
    RSA_KEY_DATA_ID, SYMMETRIC_KEY_DATA_ID,
};
pub use key_info_context::KeyInfoContext;
