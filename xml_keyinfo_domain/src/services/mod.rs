// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain services: the dispatch registry and driver, and the seams to the
//! external collaborators (keys manager, encryption engine, URI resolver).

pub mod encryption_engine;
pub mod key_data_registry;
pub mod key_info_processor;
pub mod keys_manager_service;
pub mod transform_service;

pub use encryption_engine::EncryptionEngine;
pub use key_data_registry::{KeyDataRegistry, KeyDataService, WriteOutcome};
pub use key_info_processor::{key_is_satisfied, read_key_info, write_key_info};
pub use keys_manager_service::KeysManagerService;
pub use transform_service::{
    NullUriResolver, TransformContext, TransformData, TransformUsage, UriResolver,
};
