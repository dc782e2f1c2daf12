// Copyright (c) 2025 The Envelope Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! XSalsa20-Poly1305 secretbox sealing, NaCl wire layout (tag || ciphertext).

use anyhow::{anyhow, bail, Result};
use crypto_secretbox::{
    aead::{AeadInPlace, KeyInit},
    Nonce, XSalsa20Poly1305,
};

pub const KEY_SIZE: usize = 32;
pub const NONCE_SIZE: usize = 24;
pub const TAG_SIZE: usize = 16;

/// Seal `plaintext` under `(key, nonce)`. The returned bytes are the
/// 16-byte Poly1305 tag followed by the ciphertext.
pub fn seal(key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = XSalsa20Poly1305::new(key.into());
    let nonce = Nonce::from_slice(nonce);
    let mut ciphertext = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(nonce, b"", &mut ciphertext)
        .map_err(|_| anyhow!("xsalsa20poly1305 seal failed"))?;

    let mut sealed = Vec::with_capacity(TAG_SIZE + ciphertext.len());
    sealed.extend_from_slice(&tag);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Open a sealed box produced by [`seal`]. Any failure (truncated input,
/// wrong key, wrong nonce, flipped bit) reports the same generic error.
pub fn open(key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE], sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < TAG_SIZE {
        bail!("xsalsa20poly1305 open failed");
    }

    let (tag, ciphertext) = sealed.split_at(TAG_SIZE);
    let cipher = XSalsa20Poly1305::new(key.into());
    let nonce = Nonce::from_slice(nonce);
    let mut plaintext = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(nonce, b"", &mut plaintext, tag.into())
        .map_err(|_| anyhow!("xsalsa20poly1305 open failed"))?;

    Ok(plaintext)
}
