// Copyright (c) 2025 The Envelope Authors
//
// SPDX-License-Identifier: Apache-2.0
//

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EnvelopeError>;

/// Failure taxonomy of the envelope protocol. Every failure is
/// deterministic and recoverable; none should be retried.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The caller asked for an operation that can never succeed as
    /// configured, e.g. encrypting to zero recipients.
    #[error("invalid configuration: {0}")]
    Configuration(&'static str),

    /// No key slot in the envelope matches any of the supplied strategies.
    #[error("no suitable key found")]
    Authorization,

    /// A wrap or unwrap operation failed. Deliberately opaque: wrong key,
    /// tampered label and malformed wrapped bytes are indistinguishable.
    #[error("key wrap/unwrap failed")]
    Crypto,

    /// Authenticated decryption or header MAC verification failed.
    #[error("integrity check failed: {0}")]
    Integrity(&'static str),

    /// The serialized form could not be parsed.
    #[error("malformed envelope: {0}")]
    Serialization(String),
}
