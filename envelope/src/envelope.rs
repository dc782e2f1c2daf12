// Copyright (c) 2025 The Envelope Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! The envelope core: content key generation, content sealing and the
//! fan-out/fan-in across key slot strategies.

use log::debug;
use rand::{rngs::OsRng, CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{
    slot::{Base64Standard, KeySlot, KeyStrategy},
    EnvelopeError, Result,
};

/// Size of the ephemeral content key (DEK) in bytes.
pub const CONTENT_KEY_SIZE: usize = 32;

/// Size of the content nonce stored at the front of `encrypted_content`.
pub const CONTENT_NONCE_SIZE: usize = crypto::secretbox::NONCE_SIZE;

/// The ephemeral content key. Held only in memory, zeroized on drop,
/// never persisted; recoverable only by unwrapping a key slot.
pub type ContentKey = Zeroizing<[u8; CONTENT_KEY_SIZE]>;

/// A hybrid-encrypted payload: the plaintext sealed once under a fresh
/// content key, plus one wrapped copy of that key per recipient.
///
/// Immutable after construction. Serde field order is the wire order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Envelope {
    key_slots: Vec<KeySlot>,

    /// Caller-supplied context string, cryptographically bound into every
    /// slot. Empty means "no context".
    label: String,

    /// `nonce(24) || tag(16) || ciphertext`.
    #[serde(rename = "content", with = "Base64Standard")]
    encrypted_content: Vec<u8>,
}

impl Envelope {
    /// Encrypt `plaintext` once for every strategy in `strategies`,
    /// drawing randomness from the OS.
    pub fn encrypt(plaintext: &[u8], strategies: &[KeyStrategy], label: &str) -> Result<Self> {
        Self::encrypt_with_rng(plaintext, strategies, label, &mut OsRng)
    }

    /// [`Envelope::encrypt`] with an explicit randomness source.
    pub fn encrypt_with_rng(
        plaintext: &[u8],
        strategies: &[KeyStrategy],
        label: &str,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<Self> {
        Self::encrypt_inner(plaintext, strategies, label, rng).map(|(envelope, _)| envelope)
    }

    /// Encrypt and also hand the fresh content key to the caller. Only the
    /// marshaling layer needs the key, to derive the header MAC key.
    pub(crate) fn encrypt_inner(
        plaintext: &[u8],
        strategies: &[KeyStrategy],
        label: &str,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<(Self, ContentKey)> {
        if strategies.is_empty() {
            return Err(EnvelopeError::Configuration(
                "at least one recipient strategy is required",
            ));
        }

        let dek: ContentKey = Zeroizing::new(crypto::rand::random_bytes(rng));
        let nonce: [u8; CONTENT_NONCE_SIZE] = crypto::rand::random_bytes(rng);

        // Wrap in caller order; the first failure aborts the whole
        // operation so no partial envelope escapes.
        let mut key_slots = Vec::with_capacity(strategies.len());
        for strategy in strategies {
            key_slots.push(strategy.wrap(&dek, label, rng)?);
        }

        let sealed =
            crypto::secretbox::seal(&dek, &nonce, plaintext).map_err(|_| EnvelopeError::Crypto)?;
        let mut encrypted_content = Vec::with_capacity(CONTENT_NONCE_SIZE + sealed.len());
        encrypted_content.extend_from_slice(&nonce);
        encrypted_content.extend_from_slice(&sealed);

        let envelope = Envelope {
            key_slots,
            label: label.to_string(),
            encrypted_content,
        };
        Ok((envelope, dek))
    }

    /// Recover the plaintext with the first slot some strategy can open.
    ///
    /// If that slot's unwrap fails, the failure propagates; there is no
    /// fallback to a later matching slot.
    pub fn decrypt(&self, strategies: &[KeyStrategy]) -> Result<Vec<u8>> {
        self.open(strategies).map(|(plaintext, _)| plaintext)
    }

    pub(crate) fn open(&self, strategies: &[KeyStrategy]) -> Result<(Vec<u8>, ContentKey)> {
        let (index, slot, strategy) = self
            .key_slots
            .iter()
            .enumerate()
            .find_map(|(index, slot)| {
                strategies
                    .iter()
                    .find(|strategy| strategy.can_unwrap(slot.kind, &slot.kek_id))
                    .map(|strategy| (index, slot, strategy))
            })
            .ok_or(EnvelopeError::Authorization)?;
        debug!("opening key slot {index} (kek_id {})", slot.kek_id);

        let dek = strategy.unwrap_dek(slot, &self.label)?;

        if self.encrypted_content.len() < CONTENT_NONCE_SIZE {
            return Err(EnvelopeError::Integrity("authentication failed"));
        }
        let (nonce, sealed) = self.encrypted_content.split_at(CONTENT_NONCE_SIZE);
        let nonce: [u8; CONTENT_NONCE_SIZE] = nonce
            .try_into()
            .map_err(|_| EnvelopeError::Integrity("authentication failed"))?;

        let plaintext = crypto::secretbox::open(&dek, &nonce, sealed)
            .map_err(|_| EnvelopeError::Integrity("authentication failed"))?;
        Ok((plaintext, dek))
    }

    pub fn key_slots(&self) -> &[KeySlot] {
        &self.key_slots
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn encrypted_content(&self) -> &[u8] {
        &self.encrypted_content
    }
}

#[cfg(test)]
mod tests {
    use super::Envelope;
    use crate::{EnvelopeError, KeyStrategy};

    #[test]
    fn zero_recipients_is_a_configuration_error() {
        assert_eq!(
            Envelope::encrypt(b"data", &[], "ctx"),
            Err(EnvelopeError::Configuration(
                "at least one recipient strategy is required",
            ))
        );
    }

    #[test]
    fn nonce_is_stored_in_front_of_the_sealed_content() {
        let strategy = KeyStrategy::symmetric([1u8; 32], "k");
        let envelope = Envelope::encrypt(b"data", std::slice::from_ref(&strategy), "").unwrap();
        // nonce(24) || tag(16) || "data"
        assert_eq!(envelope.encrypted_content().len(), 24 + 16 + 4);
    }

    #[test]
    fn wire_field_order_is_fixed() {
        let strategy = KeyStrategy::symmetric([1u8; 32], "k");
        let envelope = Envelope::encrypt(b"data", &[strategy], "ctx").unwrap();
        let json = serde_json::to_string(&envelope).unwrap();

        let slots = json.find("\"key_slots\"").unwrap();
        let label = json.find("\"label\"").unwrap();
        let content = json.find("\"content\"").unwrap();
        assert!(slots < label && label < content);
    }

    #[test]
    fn truncated_content_fails_closed() {
        let strategy = KeyStrategy::symmetric([1u8; 32], "k");
        let envelope = Envelope::encrypt(b"data", &[strategy.clone()], "").unwrap();

        let mut value = serde_json::to_value(&envelope).unwrap();
        value["content"] = serde_json::Value::String("AAAA".into());
        let truncated: Envelope = serde_json::from_value(value).unwrap();

        assert_eq!(
            truncated.decrypt(&[strategy]),
            Err(EnvelopeError::Integrity("authentication failed"))
        );
    }
}
