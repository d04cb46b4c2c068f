// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Single-shot AEAD used for the response direction, where the key and nonce
//! come out of the response key schedule instead of an HPKE context.

use crate::error::{Error, Result};
use crate::suite::AEAD;
use aes_gcm::aead::{Aead, KeyInit, Nonce, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use chacha20poly1305::ChaCha20Poly1305;

/// seal encrypts and authenticates the plaintext, returning the ciphertext with
/// the authentication tag appended.
pub fn seal(aead: AEAD, key: &[u8], nonce: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    check_params(aead, key, nonce)?;
    if plaintext.len() as u64 > aead.max_plaintext_len() {
        return Err(Error::InternalCrypto(format!(
            "plaintext too long: {} bytes",
            plaintext.len()
        )));
    }
    let payload = Payload { msg: plaintext, aad };
    let res = match aead {
        AEAD::Aes128Gcm => seal_with::<Aes128Gcm>(key, nonce, payload),
        AEAD::Aes256Gcm => seal_with::<Aes256Gcm>(key, nonce, payload),
        AEAD::ChaCha20Poly1305 => seal_with::<ChaCha20Poly1305>(key, nonce, payload),
    };
    res.ok_or_else(|| Error::InternalCrypto("aead seal failed".into()))
}

/// open verifies and decrypts a ciphertext produced by seal. Any tag mismatch,
/// including ciphertexts shorter than the tag, is an AuthFailure.
pub fn open(aead: AEAD, key: &[u8], nonce: &[u8], aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    check_params(aead, key, nonce)?;

    let payload = Payload { msg: ciphertext, aad };
    let res = match aead {
        AEAD::Aes128Gcm => open_with::<Aes128Gcm>(key, nonce, payload),
        AEAD::Aes256Gcm => open_with::<Aes256Gcm>(key, nonce, payload),
        AEAD::ChaCha20Poly1305 => open_with::<ChaCha20Poly1305>(key, nonce, payload),
    };
    res.ok_or(Error::AuthFailure)
}

// check_params ensures the key schedule produced material of the sizes the
// algorithm expects. A mismatch is a bug, never attacker controlled.
fn check_params(aead: AEAD, key: &[u8], nonce: &[u8]) -> Result<()> {
    if key.len() != aead.key_len() || nonce.len() != aead.nonce_len() {
        return Err(Error::InternalCrypto(format!(
            "invalid aead parameters: key {} bytes, nonce {} bytes",
            key.len(),
            nonce.len()
        )));
    }
    Ok(())
}

fn seal_with<C: KeyInit + Aead>(key: &[u8], nonce: &[u8], payload: Payload) -> Option<Vec<u8>> {
    let cipher = C::new_from_slice(key).ok()?;
    cipher.encrypt(Nonce::<C>::from_slice(nonce), payload).ok()
}

fn open_with<C: KeyInit + Aead>(key: &[u8], nonce: &[u8], payload: Payload) -> Option<Vec<u8>> {
    let cipher = C::new_from_slice(key).ok()?;
    cipher.decrypt(Nonce::<C>::from_slice(nonce), payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests sealing and opening with every supported AEAD, including empty
    // plaintexts and associated data.
    #[test]
    fn test_seal_open() {
        struct TestCase<'a> {
            plaintext: &'a [u8],
            aad: &'a [u8],
        }
        let tests = [
            TestCase {
                plaintext: b"",
                aad: b"",
            },
            TestCase {
                plaintext: b"response body",
                aad: b"",
            },
            TestCase {
                plaintext: b"response body",
                aad: b"bound header",
            },
        ];
        for aead in [AEAD::Aes128Gcm, AEAD::Aes256Gcm, AEAD::ChaCha20Poly1305] {
            let key = vec![0x42; aead.key_len()];
            let nonce = vec![0x24; aead.nonce_len()];

            for tt in &tests {
                let sealed = seal(aead, &key, &nonce, tt.aad, tt.plaintext)
                    .unwrap_or_else(|e| panic!("failed to seal with {:?}: {}", aead, e));
                assert_eq!(sealed.len(), tt.plaintext.len() + aead.tag_len());

                let opened = open(aead, &key, &nonce, tt.aad, &sealed)
                    .unwrap_or_else(|e| panic!("failed to open with {:?}: {}", aead, e));
                assert_eq!(opened, tt.plaintext, "unexpected plaintext");
            }
        }
    }

    // Tests that tampering with any input of the AEAD fails authentication.
    #[test]
    fn test_open_rejects_tampering() {
        let aead = AEAD::ChaCha20Poly1305;
        let key = vec![0x01; aead.key_len()];
        let nonce = vec![0x02; aead.nonce_len()];
        let sealed = seal(aead, &key, &nonce, b"aad", b"message").unwrap();

        for i in 0..sealed.len() {
            let mut tampered = sealed.clone();
            tampered[i] ^= 0x01;
            assert_eq!(open(aead, &key, &nonce, b"aad", &tampered), Err(Error::AuthFailure));
        }
        assert_eq!(open(aead, &key, &nonce, b"aaD", &sealed), Err(Error::AuthFailure));
        assert_eq!(open(aead, &key, &nonce, b"aad", &sealed[..4]), Err(Error::AuthFailure));

        let mut other = key.clone();
        other[0] ^= 0x80;
        assert_eq!(open(aead, &other, &nonce, b"aad", &sealed), Err(Error::AuthFailure));
    }

    // Tests that key schedule bugs surface as internal errors, not panics.
    #[test]
    fn test_invalid_params() {
        let res = seal(AEAD::Aes128Gcm, &[0u8; 32], &[0u8; 12], b"", b"msg");
        assert!(matches!(res, Err(Error::InternalCrypto(_))));

        let res = open(AEAD::Aes256Gcm, &[0u8; 32], &[0u8; 16], b"", b"msg");
        assert!(matches!(res, Err(Error::InternalCrypto(_))));
    }
}
