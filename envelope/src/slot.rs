// Copyright (c) 2025 The Envelope Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! Key slots and the per-kind wrap/unwrap strategies.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64_serde::base64_serde_type;
use rand::{CryptoRng, RngCore};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::{envelope::ContentKey, EnvelopeError, Result};

base64_serde_type!(pub Base64Standard, STANDARD);

/// Length of the random seed a symmetric slot stores in front of the
/// sealed key bytes. The actual AEAD nonce is derived from it.
pub const NONCE_SEED_SIZE: usize = 24;

/// Wire-stable numeric tag selecting the wrap/unwrap algorithm of a slot.
/// Values are permanent: new kinds get new numbers, old numbers are never
/// reassigned.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(into = "u8", try_from = "u8")]
pub enum KeySlotKind {
    RsaOaepSha256 = 1,
    SymmetricAeadWrap = 2,
}

impl From<KeySlotKind> for u8 {
    fn from(kind: KeySlotKind) -> Self {
        kind as u8
    }
}

impl TryFrom<u8> for KeySlotKind {
    type Error = UnknownKindError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(KeySlotKind::RsaOaepSha256),
            2 => Ok(KeySlotKind::SymmetricAeadWrap),
            other => Err(UnknownKindError(other)),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownKindError(pub u8);

impl fmt::Display for UnknownKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key slot kind {}", self.0)
    }
}

/// One wrapped copy of the content key for one recipient.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KeySlot {
    pub kind: KeySlotKind,

    /// Identifies which key of that kind can open this slot. For the RSA
    /// kind this is the deterministic public key fingerprint, for the
    /// symmetric kind a caller-chosen name.
    pub kek_id: String,

    /// Wrapped content key, layout dependent on `kind`.
    #[serde(with = "Base64Standard")]
    pub dek_encrypted: Vec<u8>,
}

/// RSA key material held by a strategy. A private key can both wrap and
/// unwrap; a public key can only wrap.
#[derive(Clone)]
pub enum RsaKeys {
    Public(RsaPublicKey),
    Private(RsaPrivateKey),
}

/// A recipient capability: the key material plus the algorithm used to
/// wrap and unwrap the content key. Read-only after construction and safe
/// to share across concurrent calls.
#[derive(Clone)]
pub enum KeyStrategy {
    RsaOaepSha256 { keys: RsaKeys, kek_id: String },
    SymmetricAeadWrap { key: Zeroizing<[u8; 32]>, kek_id: String },
}

impl KeyStrategy {
    /// Wrap-only RSA strategy. The slot id is the key's fingerprint.
    pub fn rsa_public(key: RsaPublicKey) -> Result<Self> {
        let kek_id = crypto::rsa::fingerprint(&key).map_err(|_| EnvelopeError::Crypto)?;
        Ok(KeyStrategy::RsaOaepSha256 {
            keys: RsaKeys::Public(key),
            kek_id,
        })
    }

    /// RSA strategy that can wrap and unwrap.
    pub fn rsa_private(key: RsaPrivateKey) -> Result<Self> {
        let kek_id = crypto::rsa::fingerprint(&RsaPublicKey::from(&key))
            .map_err(|_| EnvelopeError::Crypto)?;
        Ok(KeyStrategy::RsaOaepSha256 {
            keys: RsaKeys::Private(key),
            kek_id,
        })
    }

    /// Shared-secret strategy. `kek_id` is a caller-chosen name used only
    /// for slot selection, e.g. the name of the shared secret.
    pub fn symmetric(key: [u8; 32], kek_id: impl Into<String>) -> Self {
        KeyStrategy::SymmetricAeadWrap {
            key: Zeroizing::new(key),
            kek_id: kek_id.into(),
        }
    }

    pub fn kek_id(&self) -> &str {
        match self {
            KeyStrategy::RsaOaepSha256 { kek_id, .. } => kek_id,
            KeyStrategy::SymmetricAeadWrap { kek_id, .. } => kek_id,
        }
    }

    /// Whether this strategy can open a slot with the given kind and id.
    pub fn can_unwrap(&self, kind: KeySlotKind, kek_id: &str) -> bool {
        match self {
            KeyStrategy::RsaOaepSha256 {
                keys: RsaKeys::Private(_),
                kek_id: own,
            } => kind == KeySlotKind::RsaOaepSha256 && own == kek_id,
            // A public key cannot recover the content key.
            KeyStrategy::RsaOaepSha256 { .. } => false,
            KeyStrategy::SymmetricAeadWrap { kek_id: own, .. } => {
                kind == KeySlotKind::SymmetricAeadWrap && own == kek_id
            }
        }
    }

    /// Wrap the content key for this recipient, binding `label` into the
    /// operation so the slot only opens under the same label.
    pub fn wrap(
        &self,
        dek: &[u8; 32],
        label: &str,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<KeySlot> {
        match self {
            KeyStrategy::RsaOaepSha256 { keys, kek_id } => {
                let public = match keys {
                    RsaKeys::Public(key) => key.clone(),
                    RsaKeys::Private(key) => RsaPublicKey::from(key),
                };
                let dek_encrypted = crypto::rsa::encrypt_oaep(rng, &public, label, dek)
                    .map_err(|_| EnvelopeError::Crypto)?;
                Ok(KeySlot {
                    kind: KeySlotKind::RsaOaepSha256,
                    kek_id: kek_id.clone(),
                    dek_encrypted,
                })
            }
            KeyStrategy::SymmetricAeadWrap { key, kek_id } => {
                let nonce_seed: [u8; NONCE_SEED_SIZE] = crypto::rand::random_bytes(rng);
                let nonce = derive_wrap_nonce(&nonce_seed, label);
                let sealed =
                    crypto::secretbox::seal(key, &nonce, dek).map_err(|_| EnvelopeError::Crypto)?;

                let mut dek_encrypted = Vec::with_capacity(NONCE_SEED_SIZE + sealed.len());
                dek_encrypted.extend_from_slice(&nonce_seed);
                dek_encrypted.extend_from_slice(&sealed);
                Ok(KeySlot {
                    kind: KeySlotKind::SymmetricAeadWrap,
                    kek_id: kek_id.clone(),
                    dek_encrypted,
                })
            }
        }
    }

    /// Recover the content key from a slot. Any failure, including a
    /// label mismatch, reports the same opaque [`EnvelopeError::Crypto`].
    pub fn unwrap_dek(&self, slot: &KeySlot, label: &str) -> Result<ContentKey> {
        match self {
            KeyStrategy::RsaOaepSha256 {
                keys: RsaKeys::Private(key),
                ..
            } => {
                let dek = crypto::rsa::decrypt_oaep(key, label, &slot.dek_encrypted)
                    .map_err(|_| EnvelopeError::Crypto)?;
                content_key_from(dek)
            }
            KeyStrategy::RsaOaepSha256 { .. } => Err(EnvelopeError::Crypto),
            KeyStrategy::SymmetricAeadWrap { key, .. } => {
                if slot.dek_encrypted.len() < NONCE_SEED_SIZE {
                    return Err(EnvelopeError::Crypto);
                }
                let (seed, sealed) = slot.dek_encrypted.split_at(NONCE_SEED_SIZE);
                let seed: [u8; NONCE_SEED_SIZE] =
                    seed.try_into().map_err(|_| EnvelopeError::Crypto)?;
                // The nonce is re-derived from the claimed label, so label
                // tampering surfaces as an authentication failure.
                let nonce = derive_wrap_nonce(&seed, label);
                let dek = crypto::secretbox::open(key, &nonce, sealed)
                    .map_err(|_| EnvelopeError::Crypto)?;
                content_key_from(dek)
            }
        }
    }
}

/// AEAD nonce for a symmetric wrap: first 24 bytes of
/// SHA256(nonce_seed || label).
fn derive_wrap_nonce(seed: &[u8; NONCE_SEED_SIZE], label: &str) -> [u8; 24] {
    let digest = Sha256::new()
        .chain_update(seed)
        .chain_update(label.as_bytes())
        .finalize();
    let mut nonce = [0u8; 24];
    nonce.copy_from_slice(&digest[..24]);
    nonce
}

fn content_key_from(bytes: Vec<u8>) -> Result<ContentKey> {
    let bytes = Zeroizing::new(bytes);
    let key: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| EnvelopeError::Crypto)?;
    Ok(Zeroizing::new(key))
}
