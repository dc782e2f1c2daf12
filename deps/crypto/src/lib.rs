// Copyright (c) 2025 The Envelope Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! # Crypto
//!
//! This crate encapsulates the cryptographic primitives used by the
//! envelope protocol crate:
//! - `secretbox`: XSalsa20-Poly1305 authenticated encryption (NaCl layout)
//! - `rsa`: RSA-OAEP-SHA256 key wrapping and public key fingerprints
//! - `mac`: HKDF-SHA256 key derivation and HMAC-SHA256 tagging
//! - `rand`: random byte helpers over a caller-supplied RNG
//!
//! All APIs are synchronous and side-effect free. Error messages on the
//! decrypt/open paths are deliberately generic so callers cannot be used
//! as a padding or tag oracle.

pub mod mac;
pub mod rand;
pub mod rsa;
pub mod secretbox;
