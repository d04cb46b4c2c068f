// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! HKDF wrappers parametrized by the HPKE suite's KDF.
//!
//! https://datatracker.ietf.org/doc/html/rfc5869

use crate::error::{Error, Result};
use crate::suite::KDF;
use hkdf::Hkdf;
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

/// Prk is a pseudorandom key produced by HKDF-Extract with the hash function
/// selected by the suite.
pub enum Prk {
    Sha256(Hkdf<Sha256>),
    Sha384(Hkdf<Sha384>),
    Sha512(Hkdf<Sha512>),
}

/// extract runs HKDF-Extract over the secret with the given salt. An empty salt
/// is replaced by a string of zeroes, as RFC 5869 prescribes.
pub fn extract(kdf: KDF, salt: &[u8], secret: &[u8]) -> Prk {
    let salt = if salt.is_empty() { None } else { Some(salt) };
    match kdf {
        KDF::HkdfSha256 => Prk::Sha256(Hkdf::new(salt, secret)),
        KDF::HkdfSha384 => Prk::Sha384(Hkdf::new(salt, secret)),
        KDF::HkdfSha512 => Prk::Sha512(Hkdf::new(salt, secret)),
    }
}

impl Prk {
    /// expand runs HKDF-Expand, returning len bytes of output keying material.
    /// Requests above 255 hash lengths are refused.
    pub fn expand(&self, info: &[u8], len: usize) -> Result<Zeroizing<Vec<u8>>> {
        let mut okm = Zeroizing::new(vec![0u8; len]);
        let res = match self {
            Prk::Sha256(hkdf) => hkdf.expand(info, &mut okm),
            Prk::Sha384(hkdf) => hkdf.expand(info, &mut okm),
            Prk::Sha512(hkdf) => hkdf.expand(info, &mut okm),
        };
        res.map_err(|_| Error::InternalCrypto(format!("hkdf output too long: {len} bytes")))?;
        Ok(okm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test vectors from RFC 5869 Appendix A (SHA-256).
    #[test]
    fn test_hkdf() {
        struct TestCase {
            secret: &'static str,
            salt: &'static str,
            info: &'static str,
            out: &'static str,
        }
        let tests = [
            // RFC 5869 A.1: Basic test case with SHA-256
            TestCase {
                secret: "0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b",
                salt: "000102030405060708090a0b0c",
                info: "f0f1f2f3f4f5f6f7f8f9",
                out: "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf\
                      34007208d5b887185865",
            },
            // RFC 5869 A.2: Test with SHA-256 and longer inputs/outputs
            TestCase {
                secret: "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f\
                         202122232425262728292a2b2c2d2e2f303132333435363738393a3b3c3d3e3f\
                         404142434445464748494a4b4c4d4e4f",
                salt: "606162636465666768696a6b6c6d6e6f707172737475767778797a7b7c7d7e7f\
                       808182838485868788898a8b8c8d8e8f909192939495969798999a9b9c9d9e9f\
                       a0a1a2a3a4a5a6a7a8a9aaabacadaeaf",
                info: "b0b1b2b3b4b5b6b7b8b9babbbcbdbebfc0c1c2c3c4c5c6c7c8c9cacbcccdcecf\
                       d0d1d2d3d4d5d6d7d8d9dadbdcdddedfe0e1e2e3e4e5e6e7e8e9eaebecedeeef\
                       f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff",
                out: "b11e398dc80327a1c8e7f78c596a49344f012eda2d4efad8a050cc4c19afa97c\
                      59045a99cac7827271cb41c65e590e09da3275600c2f09b8367793a9aca3db71\
                      cc30c58179ec3e87c14c01d5c1f3434f1d87",
            },
            // RFC 5869 A.3: Test with SHA-256 and zero-length salt/info
            TestCase {
                secret: "0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b",
                salt: "",
                info: "",
                out: "8da4e775a563c18f715f802a063c5a31b8a11f5c5ee1879ec3454e5f3c738d2d\
                      9d201395faa4b61a96c8",
            },
        ];
        for tt in &tests {
            let secret = hex::decode(tt.secret).unwrap();
            let salt = hex::decode(tt.salt).unwrap();
            let info = hex::decode(tt.info).unwrap();
            let expected = hex::decode(tt.out).unwrap();

            let prk = extract(KDF::HkdfSha256, &salt, &secret);
            let got = prk.expand(&info, expected.len()).unwrap();
            assert_eq!(got.as_slice(), expected.as_slice());
        }
    }

    // Tests that the hash function actually follows the suite: identical inputs
    // must yield unrelated outputs across KDFs, and the output length limit is
    // 255 hash lengths for each.
    #[test]
    fn test_hkdf_kdf_separation() {
        let kdfs = [
            (KDF::HkdfSha256, 32),
            (KDF::HkdfSha384, 48),
            (KDF::HkdfSha512, 64),
        ];
        let mut outputs = Vec::new();
        for (kdf, hash_len) in kdfs {
            let prk = extract(kdf, b"salt", b"secret");
            outputs.push(prk.expand(b"key", 32).unwrap());

            assert!(prk.expand(b"key", 255 * hash_len).is_ok());
            assert!(prk.expand(b"key", 255 * hash_len + 1).is_err());
        }
        assert_ne!(outputs[0], outputs[1]);
        assert_ne!(outputs[1], outputs[2]);
        assert_ne!(outputs[0], outputs[2]);
    }
}
