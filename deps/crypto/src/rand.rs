// Copyright (c) 2025 The Envelope Authors
//
// SPDX-License-Identifier: Apache-2.0
//

use ::rand::{CryptoRng, RngCore};

/// Fill a fixed-size buffer from the given cryptographically secure RNG.
pub fn random_bytes<const N: usize>(rng: &mut (impl RngCore + CryptoRng)) -> [u8; N] {
    let mut buffer = [0u8; N];
    rng.fill_bytes(&mut buffer);
    buffer
}
