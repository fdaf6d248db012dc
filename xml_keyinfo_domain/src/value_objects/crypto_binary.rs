// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CryptoBinary Encoding
//!
//! Base64 helpers for the `ds:CryptoBinary` content model: decoding ignores
//! embedded whitespace (signature documents routinely wrap long values), and
//! encoding can wrap output at a configurable line size.

use base64::{engine::general_purpose, Engine as _};

use crate::error::KeyInfoError;

/// Decodes base64 text, ignoring any embedded ASCII whitespace.
pub fn decode(text: &str) -> Result<Vec<u8>, KeyInfoError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| KeyInfoError::invalid_content(format!("bad base64 content: {}", e)))
}

/// Encodes bytes as base64, wrapping lines at `line_size` characters.
/// A line size of 0 disables wrapping.
pub fn encode(data: &[u8], line_size: usize) -> String {
    let encoded = general_purpose::STANDARD.encode(data);
    if line_size == 0 || encoded.len() <= line_size {
        return encoded;
    }
    let mut out = String::with_capacity(encoded.len() + encoded.len() / line_size + 1);
    for (i, c) in encoded.chars().enumerate() {
        if i > 0 && i % line_size == 0 {
            out.push('\n');
        }
        out.push(c);
    }
    out
}
