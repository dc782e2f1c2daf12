// Copyright (c) 2025 The Envelope Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! Hybrid envelope encryption: a plaintext is sealed once under a fresh
//! content key, and that key is wrapped separately for each recipient so
//! any one of them can decrypt without re-encrypting the payload.
//!
//! Recipients are [`KeyStrategy`] values, either an RSA-OAEP-SHA256 key
//! pair or a named 256-bit shared secret. A caller-supplied label is
//! cryptographically bound into every wrap, so an envelope cannot be
//! replayed under a different context.
//!
//! The [`marshal`] module adds a compact two-line text form whose header
//! is authenticated by an HMAC keyed from the content key itself.

pub mod error;
pub use error::*;

pub mod envelope;
pub use envelope::{ContentKey, Envelope, CONTENT_KEY_SIZE, CONTENT_NONCE_SIZE};

pub mod slot;
pub use slot::{KeySlot, KeySlotKind, KeyStrategy, RsaKeys};

pub mod marshal;
pub use marshal::{SealedEnvelope, HEADER_MAC_CONTEXT};

/// Encrypt `plaintext` for the given recipients and serialize the result
/// into the authenticated two-line text form.
pub fn seal(plaintext: &[u8], strategies: &[KeyStrategy], label: &str) -> Result<Vec<u8>> {
    marshal::marshal_default(plaintext, strategies, label)
}

/// Parse a two-line text form, decrypt it with the first matching
/// strategy and verify its header MAC.
pub fn unseal(data: &[u8], strategies: &[KeyStrategy]) -> Result<Vec<u8>> {
    let sealed = marshal::unmarshal(data)?;
    sealed.decrypt(strategies)
}
