// Copyright (c) 2025 The Envelope Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! Two-line text serialization with deferred header authentication.
//!
//! Line 1 is the envelope JSON, line 2 an HMAC over line 1 under a key
//! derived from the content key. The MAC can only be checked after a
//! successful decrypt, so tampering with the header (slots or label) is
//! detected without a separate pre-shared MAC key.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, CryptoRng, RngCore};

use crate::{
    envelope::{ContentKey, Envelope},
    slot::KeyStrategy,
    EnvelopeError, Result,
};

/// HKDF info string binding the header MAC key to this use. Public so the
/// derivation is auditable; changing it invalidates all marshaled forms.
pub const HEADER_MAC_CONTEXT: &[u8] = b"envelope header mac key v1";

/// Encrypt `plaintext` and serialize the result as
/// `<envelope-json>\n<base64url-mac>`. Also returns the fresh content key.
pub fn marshal(
    plaintext: &[u8],
    strategies: &[KeyStrategy],
    label: &str,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<(Vec<u8>, ContentKey)> {
    let (envelope, dek) = Envelope::encrypt_inner(plaintext, strategies, label, rng)?;

    let header = serde_json::to_vec(&envelope)
        .map_err(|e| EnvelopeError::Serialization(format!("envelope JSON encoding: {e}")))?;
    let mac = header_mac(&dek, &header)?;

    let mut out = header;
    out.push(b'\n');
    out.extend_from_slice(URL_SAFE_NO_PAD.encode(mac).as_bytes());
    Ok((out, dek))
}

/// [`marshal`] drawing randomness from the OS, discarding the content key.
pub fn marshal_default(
    plaintext: &[u8],
    strategies: &[KeyStrategy],
    label: &str,
) -> Result<Vec<u8>> {
    marshal(plaintext, strategies, label, &mut OsRng).map(|(bytes, _)| bytes)
}

/// A parsed but not yet verified marshaled envelope. The raw header bytes
/// are retained verbatim; verification happens inside
/// [`SealedEnvelope::decrypt`] once the content key is known.
#[derive(Debug, Clone)]
pub struct SealedEnvelope {
    header: Vec<u8>,
    claimed_mac: Vec<u8>,
    envelope: Envelope,
}

/// Parse the two-line text form. Structural problems (wrong line count,
/// malformed JSON, malformed MAC encoding, an envelope without slots) all
/// surface as [`EnvelopeError::Serialization`].
pub fn unmarshal(data: &[u8]) -> Result<SealedEnvelope> {
    let text = std::str::from_utf8(data)
        .map_err(|_| EnvelopeError::Serialization("input is not UTF-8".to_string()))?;

    let mut lines = text.splitn(3, '\n');
    let header = lines
        .next()
        .ok_or_else(|| EnvelopeError::Serialization("empty input".to_string()))?;
    let mac_line = lines
        .next()
        .ok_or_else(|| EnvelopeError::Serialization("expected two lines".to_string()))?;
    if let Some(rest) = lines.next() {
        // Tolerate a single trailing newline, nothing more.
        if !rest.is_empty() {
            return Err(EnvelopeError::Serialization(
                "trailing data after MAC line".to_string(),
            ));
        }
    }

    let envelope: Envelope = serde_json::from_str(header)
        .map_err(|e| EnvelopeError::Serialization(format!("envelope JSON: {e}")))?;
    if envelope.key_slots().is_empty() {
        return Err(EnvelopeError::Serialization(
            "envelope has no key slots".to_string(),
        ));
    }

    if mac_line.is_empty() {
        return Err(EnvelopeError::Serialization("missing MAC line".to_string()));
    }
    let claimed_mac = URL_SAFE_NO_PAD
        .decode(mac_line)
        .map_err(|e| EnvelopeError::Serialization(format!("MAC line: {e}")))?;
    if claimed_mac.len() != 32 {
        return Err(EnvelopeError::Serialization(
            "MAC line is not a 32-byte HMAC".to_string(),
        ));
    }

    Ok(SealedEnvelope {
        header: header.as_bytes().to_vec(),
        claimed_mac,
        envelope,
    })
}

impl SealedEnvelope {
    /// Decrypt the content, then verify the header MAC with a key derived
    /// from the recovered content key. A MAC mismatch fails even though
    /// the decryption itself succeeded.
    pub fn decrypt(&self, strategies: &[KeyStrategy]) -> Result<Vec<u8>> {
        let (plaintext, dek) = self.envelope.open(strategies)?;

        let mac_key = crypto::mac::derive_key(dek.as_slice(), HEADER_MAC_CONTEXT)
            .map_err(|_| EnvelopeError::Crypto)?;
        crypto::mac::verify_hmac_sha256(&mac_key, &self.header, &self.claimed_mac)
            .map_err(|_| EnvelopeError::Integrity("invalid header MAC"))?;

        Ok(plaintext)
    }

    /// The parsed envelope, for inspection before any key is available.
    /// Its header has not been authenticated yet.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

fn header_mac(dek: &ContentKey, header: &[u8]) -> Result<Vec<u8>> {
    let mac_key = crypto::mac::derive_key(dek.as_slice(), HEADER_MAC_CONTEXT)
        .map_err(|_| EnvelopeError::Crypto)?;
    crypto::mac::hmac_sha256(&mac_key, header).map_err(|_| EnvelopeError::Crypto)
}
