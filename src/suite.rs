// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! HPKE cipher suite identifiers and the allow-list of supported algorithms.
//!
//! https://datatracker.ietf.org/doc/html/rfc9180#section-7

// Keep the RFC's all-caps abbreviations for the algorithm families.
#![allow(clippy::upper_case_acronyms)]

use crate::error::{Error, Result};

/// KEM is a supported key encapsulation mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KEM {
    /// DHKEM(P-256, HKDF-SHA256).
    #[cfg(feature = "p256")]
    P256Sha256,
    /// DHKEM(X25519, HKDF-SHA256).
    X25519Sha256,
}

impl KEM {
    /// from_id maps a wire identifier onto a supported KEM.
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            #[cfg(feature = "p256")]
            0x0010 => Some(KEM::P256Sha256),
            0x0020 => Some(KEM::X25519Sha256),
            _ => None,
        }
    }

    /// id returns the IANA identifier of the KEM.
    pub fn id(self) -> u16 {
        match self {
            #[cfg(feature = "p256")]
            KEM::P256Sha256 => 0x0010,
            KEM::X25519Sha256 => 0x0020,
        }
    }

    /// public_key_len is Npk, the size of a serialized public key.
    pub fn public_key_len(self) -> usize {
        match self {
            #[cfg(feature = "p256")]
            KEM::P256Sha256 => 65,
            KEM::X25519Sha256 => 32,
        }
    }

    /// encapsulated_key_len is Nenc, the size of an encapsulated key.
    pub fn encapsulated_key_len(self) -> usize {
        // Both DHKEMs transmit a serialized ephemeral public key
        self.public_key_len()
    }

    /// secret_key_len is Nsk, the size of a serialized private key.
    pub fn secret_key_len(self) -> usize {
        32
    }
}

/// KDF is a supported key derivation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KDF {
    HkdfSha256,
    HkdfSha384,
    HkdfSha512,
}

impl KDF {
    /// from_id maps a wire identifier onto a supported KDF.
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            0x0001 => Some(KDF::HkdfSha256),
            0x0002 => Some(KDF::HkdfSha384),
            0x0003 => Some(KDF::HkdfSha512),
            _ => None,
        }
    }

    /// id returns the IANA identifier of the KDF.
    pub fn id(self) -> u16 {
        match self {
            KDF::HkdfSha256 => 0x0001,
            KDF::HkdfSha384 => 0x0002,
            KDF::HkdfSha512 => 0x0003,
        }
    }
}

/// AEAD is a supported authenticated encryption algorithm. The export-only
/// pseudo-AEAD (0xffff) is deliberately absent: a response cannot be sealed
/// with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AEAD {
    Aes128Gcm,
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl AEAD {
    /// from_id maps a wire identifier onto a supported AEAD.
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            0x0001 => Some(AEAD::Aes128Gcm),
            0x0002 => Some(AEAD::Aes256Gcm),
            0x0003 => Some(AEAD::ChaCha20Poly1305),
            _ => None,
        }
    }

    /// id returns the IANA identifier of the AEAD.
    pub fn id(self) -> u16 {
        match self {
            AEAD::Aes128Gcm => 0x0001,
            AEAD::Aes256Gcm => 0x0002,
            AEAD::ChaCha20Poly1305 => 0x0003,
        }
    }

    /// key_len is Nk.
    pub fn key_len(self) -> usize {
        match self {
            AEAD::Aes128Gcm => 16,
            AEAD::Aes256Gcm | AEAD::ChaCha20Poly1305 => 32,
        }
    }

    /// nonce_len is Nn.
    pub fn nonce_len(self) -> usize {
        12
    }

    /// tag_len is Nt.
    pub fn tag_len(self) -> usize {
        16
    }

    /// max_plaintext_len is the largest message a single invocation of the
    /// AEAD may protect.
    pub fn max_plaintext_len(self) -> u64 {
        match self {
            // NIST SP 800-38D: 2^39 - 256 bits
            AEAD::Aes128Gcm | AEAD::Aes256Gcm => (1 << 36) - 32,
            // RFC 8439: 2^32 blocks of 64 bytes
            AEAD::ChaCha20Poly1305 => 1 << 38,
        }
    }
}

/// SymmetricSuite is a KDF and AEAD pair offered by a key configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymmetricSuite {
    pub kdf: u16,
    pub aead: u16,
}

impl SymmetricSuite {
    /// new creates a symmetric suite from supported algorithms.
    pub fn new(kdf: KDF, aead: AEAD) -> Self {
        Self {
            kdf: kdf.id(),
            aead: aead.id(),
        }
    }

    /// supported resolves the pair if both algorithms are on the allow-list.
    pub fn supported(&self) -> Option<(KDF, AEAD)> {
        Some((KDF::from_id(self.kdf)?, AEAD::from_id(self.aead)?))
    }
}

/// Suite is a complete, supported HPKE cipher suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Suite {
    pub kem: KEM,
    pub kdf: KDF,
    pub aead: AEAD,
}

impl Suite {
    /// new assembles a suite from supported algorithms.
    pub fn new(kem: KEM, kdf: KDF, aead: AEAD) -> Self {
        Self { kem, kdf, aead }
    }

    /// from_ids resolves a wire triple against the allow-list.
    pub fn from_ids(kem: u16, kdf: u16, aead: u16) -> Result<Self> {
        match (KEM::from_id(kem), KDF::from_id(kdf), AEAD::from_id(aead)) {
            (Some(kem), Some(kdf), Some(aead)) => Ok(Self { kem, kdf, aead }),
            _ => Err(Error::UnsupportedSuite { kem, kdf, aead }),
        }
    }

    /// response_nonce_len is max(Nk, Nn), the size of the nonce that prefixes
    /// every encapsulated response and of the secret exported for it.
    pub fn response_nonce_len(&self) -> usize {
        self.aead.key_len().max(self.aead.nonce_len())
    }

    /// all enumerates every supported combination, in allow-list order.
    pub fn all() -> Vec<Suite> {
        let kems = [
            #[cfg(feature = "p256")]
            KEM::P256Sha256,
            KEM::X25519Sha256,
        ];
        let kdfs = [KDF::HkdfSha256, KDF::HkdfSha384, KDF::HkdfSha512];
        let aeads = [AEAD::Aes128Gcm, AEAD::Aes256Gcm, AEAD::ChaCha20Poly1305];

        let mut suites = Vec::with_capacity(kems.len() * kdfs.len() * aeads.len());
        for kem in kems {
            for kdf in kdfs {
                for aead in aeads {
                    suites.push(Suite { kem, kdf, aead });
                }
            }
        }
        suites
    }
}
