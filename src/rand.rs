// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::error::{Error, Result};
use hpke::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use zeroize::Zeroizing;

/// rng creates a random number stream seeded from the operating system, using
/// a source that also works in WASM.
pub fn rng() -> Result<ChaCha20Rng> {
    let mut seed = Zeroizing::new([0u8; 32]);
    getrandom::fill(&mut *seed)
        .map_err(|e| Error::InternalCrypto(format!("failed to get random seed: {e}")))?;
    Ok(ChaCha20Rng::from_seed(*seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hpke::rand_core::RngCore;

    // Tests that independently seeded streams diverge. This test is more of a
    // smoke-test that the API works; it does not actually test the quality of
    // the generated random numbers.
    #[test]
    fn test_rng() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        rng().unwrap().fill_bytes(&mut a);
        rng().unwrap().fill_bytes(&mut b);
        assert_ne!(a, b);
    }
}
