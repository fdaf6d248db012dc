// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # KeyInfo Round Trips
//!
//! Write-then-read equivalence through `<KeyName>` and `<KeyValue>`
//! templates, the early-termination property, and the enabled-key-data
//! restriction.

mod common;

use common::*;
use xml_keyinfo_domain::entities::key::RsaPublicParams;
use xml_keyinfo_domain::value_objects::namespaces::NS_DSIG;
use xml_keyinfo_domain::{
    read_key_info, write_key_info, Key, KeyDataId, ProcessingFlags, XmlElement,
};

/// A key with only a name survives a `<KeyName>` write-then-read with no
/// keys manager involved.
#[test]
fn test_key_name_round_trip() {
    let mut key = Key::new();
    key.set_name(Some("alice".to_string()));

    let mut template = XmlElement::new("KeyInfo", Some(NS_DSIG));
    template.add_child_element(XmlElement::new("KeyName", Some(NS_DSIG)));

    let mut ctx = write_context();
    write_key_info(&mut template, &key, &mut ctx).unwrap();

    let mut restored = Key::new();
    let mut read_ctx = read_context();
    read_key_info(&template, &mut restored, &mut read_ctx).unwrap();
    assert_eq!(restored.name(), Some("alice"));
}

/// An RSA key survives a `<KeyValue>` write-then-read, including the
/// serialization to text and back.
#[test]
fn test_key_value_round_trip() {
    let key = Key::with_material(RsaPublicParams {
        modulus: vec![0xc3; 256],
        exponent: vec![1, 0, 1],
    });

    let mut template = XmlElement::new("KeyInfo", Some(NS_DSIG));
    template.add_child_element(XmlElement::new("KeyValue", Some(NS_DSIG)));

    let mut ctx = write_context();
    write_key_info(&mut template, &key, &mut ctx).unwrap();

    // Through text: the serialized form must parse back to the same key.
    let serialized = template.to_xml_string();
    let reparsed = parse(&serialized);

    let mut restored = Key::new();
    let mut read_ctx = read_context();
    read_key_info(reparsed.root(), &mut restored, &mut read_ctx).unwrap();
    assert_eq!(restored.material(), key.material());
    assert_eq!(restored.bits(), 2048);
}

/// A key that already satisfies the requirement stops the read after at
/// most one handler invocation: the second, contradicting `KeyName` is
/// never visited.
#[test]
fn test_read_stops_once_satisfied() {
    let doc = key_info_doc("<KeyName>alice</KeyName><KeyName>bob</KeyName>");
    let mut ctx = read_context();
    let mut key = symmetric_key("alice", 0x01);
    read_key_info(doc.root(), &mut key, &mut ctx).unwrap();
    assert_eq!(key.name(), Some("alice"));

    // Opting out of early termination reaches the contradiction.
    let mut ctx = read_context();
    ctx.set_flags(ProcessingFlags::DONT_STOP_ON_KEY_FOUND);
    let mut key = symmetric_key("alice", 0x01);
    assert!(read_key_info(doc.root(), &mut key, &mut ctx).is_err());
}

/// With a non-empty enabled list, children outside the list are invisible:
/// the `KeyName` is not dispatched even though a handler exists for it.
#[test]
fn test_enabled_key_data_excludes_handlers() {
    let doc = key_info_doc("<KeyName>alice</KeyName>");
    let store =
        xml_keyinfo::infrastructure::keystore::MemoryKeysStore::new().with_key(symmetric_key("alice", 0x02));
    let mut ctx = full_context(store, xml_keyinfo::infrastructure::dereference::InMemoryUriResolver::new());
    ctx.set_enabled_key_data(vec![KeyDataId("key-value")]).unwrap();

    let mut key = Key::new();
    read_key_info(doc.root(), &mut key, &mut ctx).unwrap();
    assert!(!key.is_valid());
    assert!(key.name().is_none());
}
