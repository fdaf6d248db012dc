// /////////////////////////////////////////////////////////////////////////////
// XML KeyInfo RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Namespace URIs and algorithm/type hrefs of the XML Signature and XML
//! Encryption vocabularies. The processor treats these as opaque
//! identifiers; they are collected here so handlers and tests agree on the
//! exact strings.

/// XML Digital Signature namespace.
pub const NS_DSIG: &str = "http://www.w3.org/2000/09/xmldsig#";

/// XML Digital Signature 1.1 namespace.
pub const NS_DSIG11: &str = "http://www.w3.org/2009/xmldsig11#";

/// XML Encryption namespace.
pub const NS_XMLENC: &str = "http://www.w3.org/2001/04/xmlenc#";

/// XML Encryption 1.1 namespace.
pub const NS_XMLENC11: &str = "http://www.w3.org/2009/xmlenc11#";

/// `RetrievalMethod` type href of `<RSAKeyValue>`.
pub const HREF_RSA_KEY_VALUE: &str = "http://www.w3.org/2000/09/xmldsig#RSAKeyValue";

/// `RetrievalMethod` type href of `<ECKeyValue>` (DSig 1.1).
pub const HREF_EC_KEY_VALUE: &str = "http://www.w3.org/2009/xmldsig11#ECKeyValue";

/// Type href for raw symmetric key octets.
pub const HREF_AES_KEY_VALUE: &str = "http://www.w3.org/2001/04/xmlenc#AESKeyValue";

/// Base64 decode transform.
pub const HREF_TRANSFORM_BASE64: &str = "http://www.w3.org/2000/09/xmldsig#base64";

/// Inclusive canonicalization transform.
pub const HREF_TRANSFORM_C14N: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";

/// SHA-256 based concatenation KDF (XML Encryption 1.1).
pub const HREF_CONCAT_KDF: &str = "http://www.w3.org/2009/xmlenc11#ConcatKDF";

/// AES-256-GCM content/key encryption.
pub const HREF_AES256_GCM: &str = "http://www.w3.org/2009/xmlenc11#aes256-gcm";
