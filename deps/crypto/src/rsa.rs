// Copyright (c) 2025 The Envelope Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! RSA-OAEP-SHA256 key wrapping with label binding, plus deterministic
//! public key fingerprints.

use ::rsa::{pkcs8::EncodePublicKey, Oaep, RsaPrivateKey, RsaPublicKey};
use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

/// Encrypt `plaintext` with RSA-OAEP, SHA-256 as both the OAEP hash and
/// the MGF1 hash, and `label` as the OAEP label. An empty label is
/// equivalent to the unlabeled OAEP encoding.
pub fn encrypt_oaep(
    rng: &mut (impl RngCore + CryptoRng),
    key: &RsaPublicKey,
    label: &str,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    key.encrypt(rng, Oaep::new_with_label::<Sha256, _>(label), plaintext)
        .map_err(|_| anyhow!("rsa-oaep encrypt failed"))
}

/// Decrypt an OAEP ciphertext under the same label it was encrypted with.
///
/// Every failure mode, including a label mismatch, collapses into one
/// generic error so the caller cannot be used as a decryption oracle.
pub fn decrypt_oaep(key: &RsaPrivateKey, label: &str, ciphertext: &[u8]) -> Result<Vec<u8>> {
    key.decrypt(Oaep::new_with_label::<Sha256, _>(label), ciphertext)
        .map_err(|_| anyhow!("rsa-oaep decrypt failed"))
}

/// Deterministic fingerprint of a public key:
/// `SHA256:` + unpadded standard base64 of the SHA-256 digest of the
/// SubjectPublicKeyInfo DER encoding.
pub fn fingerprint(key: &RsaPublicKey) -> Result<String> {
    let der = key
        .to_public_key_der()
        .map_err(|_| anyhow!("public key DER encoding failed"))?;
    let digest = Sha256::digest(der.as_bytes());
    Ok(format!("SHA256:{}", STANDARD_NO_PAD.encode(digest)))
}
