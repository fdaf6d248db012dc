// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Value objects of the KeyInfo domain: identifiers, usage bitsets,
//! processing options, key requirements, the XML element tree, and the
//! namespace vocabulary.

pub mod crypto_binary;
pub mod key_data_id;
pub mod key_data_usage;
pub mod key_requirement;
pub mod namespaces;
pub mod processing_options;
pub mod xml_node;

pub use key_data_id::KeyDataId;
pub use key_data_usage::KeyDataUsage;
pub use key_requirement::{KeyRequirement, KeyType, KeyUse};
pub use processing_options::{CryptoOperation, ProcessingFlags, ProcessingMode};
pub use xml_node::{XmlAttribute, XmlDocument, XmlElement, XmlNode};
