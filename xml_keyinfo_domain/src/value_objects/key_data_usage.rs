// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Data Usage Bitset
//!
//! Declares the contexts in which a registered key-data service may be
//! dispatched. Registry lookups always carry a usage; a service whose
//! declared usage does not intersect the requested one is invisible to that
//! lookup.

use bitflags::bitflags;

bitflags! {
    /// Dispatch contexts a key-data service participates in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeyDataUsage: u32 {
        /// May read a direct `<KeyInfo>` child element
        const KEY_INFO_READ = 0x0000_0001;
        /// May write a direct `<KeyInfo>` child element
        const KEY_INFO_WRITE = 0x0000_0002;
        /// May read a `<KeyValue>` child element
        const KEY_VALUE_READ = 0x0000_0004;
        /// May write a `<KeyValue>` child element
        const KEY_VALUE_WRITE = 0x0000_0008;
        /// May be the XML result of a `<RetrievalMethod>` dereference
        const RETRIEVAL_METHOD_XML = 0x0000_0010;
        /// May be the binary result of a `<RetrievalMethod>` dereference
        const RETRIEVAL_METHOD_BIN = 0x0000_0020;
    }
}

impl KeyDataUsage {
    /// Usage filter for resolving a `RetrievalMethod` `Type` attribute:
    /// either dereference form qualifies.
    pub fn retrieval_method() -> Self {
        KeyDataUsage::RETRIEVAL_METHOD_XML | KeyDataUsage::RETRIEVAL_METHOD_BIN
    }
}
