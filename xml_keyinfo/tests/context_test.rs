// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Context Invariants
//!
//! The recursion counters return to their entry values on every outcome,
//! and preference copying produces equal, independently owned state.

mod common;

use std::sync::Arc;

use common::*;
use proptest::prelude::*;
use xml_keyinfo::infrastructure::dereference::InMemoryUriResolver;
use xml_keyinfo::infrastructure::keystore::MemoryKeysStore;
use xml_keyinfo_domain::{read_key_info, Key, KeyDataId, KeyInfoContext, ProcessingFlags};

/// Builds a resolver carrying a chain of `KeyInfoReference` documents
/// `ref0 -> ref1 -> ... -> ref{depth}`, with the last link resolving to a
/// plain `KeyName`.
fn reference_chain(depth: usize) -> InMemoryUriResolver {
    let mut resolver = InMemoryUriResolver::new();
    for i in 0..=depth {
        let inner = if i == depth {
            format!("<KeyName xmlns=\"{DSIG}\">leaf</KeyName>")
        } else {
            format!(
                "<KeyInfoReference xmlns=\"{DSIG11}\" URI=\"http://keys.example/ref{}\"/>",
                i + 1
            )
        };
        let doc = format!("<KeyInfo xmlns=\"{DSIG}\">{inner}</KeyInfo>");
        resolver = resolver.with_binary(format!("http://keys.example/ref{}", i), doc.into_bytes());
    }
    resolver
}

proptest! {
    /// For any nesting depth and cap, a read leaves all three level
    /// counters at zero whether it succeeded or failed.
    #[test]
    fn prop_counters_restored(depth in 0usize..4, max_level in 1u32..4) {
        let mut ctx = full_context(MemoryKeysStore::new(), reference_chain(depth));
        ctx.set_max_key_info_reference_level(max_level);

        let doc = key_info_doc("<dsig11:KeyInfoReference URI=\"http://keys.example/ref0\"/>");
        let mut key = Key::new();
        let result = read_key_info(doc.root(), &mut key, &mut ctx);

        // Depth within the cap succeeds, beyond it fails; counters are
        // restored either way.
        prop_assert_eq!(result.is_ok(), (depth as u32) < max_level);
        prop_assert_eq!(ctx.cur_retrieval_method_level(), 0);
        prop_assert_eq!(ctx.cur_key_info_reference_level(), 0);
        prop_assert_eq!(ctx.cur_encrypted_key_level(), 0);
    }
}

/// Preference copying transfers every user preference and deep-copies the
/// enabled list.
#[test]
fn test_copy_user_pref_equality_and_ownership() {
    let registry = Arc::new(xml_keyinfo::infrastructure::registry::default_registry());
    let mut src = KeyInfoContext::new(registry.clone());
    src.set_flags(ProcessingFlags::STOP_ON_UNKNOWN_CHILD | ProcessingFlags::DONT_STOP_ON_KEY_FOUND);
    src.set_enabled_key_data(vec![KeyDataId("key-name"), KeyDataId("key-value")])
        .unwrap();
    src.set_base64_line_size(76);
    src.set_max_retrieval_method_level(5);
    src.set_max_key_info_reference_level(6);
    src.set_max_encrypted_key_level(7);
    src.set_certs_verification_depth(2);

    let mut dst = KeyInfoContext::new(registry);
    dst.copy_user_pref_from(&src);

    assert_eq!(dst.flags(), src.flags());
    assert_eq!(dst.enabled_key_data(), src.enabled_key_data());
    assert_eq!(dst.base64_line_size(), src.base64_line_size());
    assert_eq!(dst.max_retrieval_method_level(), src.max_retrieval_method_level());
    assert_eq!(dst.max_key_info_reference_level(), src.max_key_info_reference_level());
    assert_eq!(dst.max_encrypted_key_level(), src.max_encrypted_key_level());
    assert_eq!(dst.certs_verification_depth(), src.certs_verification_depth());
    assert_eq!(dst.key_requirement(), src.key_requirement());

    // Independent ownership: emptying the source list leaves the copy.
    src.set_enabled_key_data(Vec::new()).unwrap();
    assert_eq!(dst.enabled_key_data().len(), 2);
}

/// Reset clears diagnostics and depths while the preferences survive a
/// failed run.
#[test]
fn test_reset_after_failure() {
    let mut ctx = full_context(MemoryKeysStore::new(), reference_chain(3));
    ctx.set_flags(ProcessingFlags::STOP_ON_UNKNOWN_CHILD);

    let doc = key_info_doc("<dsig11:KeyInfoReference URI=\"http://keys.example/ref0\"/>");
    let mut key = Key::new();
    assert!(read_key_info(doc.root(), &mut key, &mut ctx).is_err());

    ctx.reset();
    assert_eq!(ctx.cur_key_info_reference_level(), 0);
    assert!(ctx.failed_key_names().is_empty());
    assert_eq!(ctx.flags(), ProcessingFlags::STOP_ON_UNKNOWN_CHILD);
}
