// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Key configurations published by Oblivious HTTP gateways.
//!
//! https://datatracker.ietf.org/doc/html/rfc9458#section-3
//!
//! A single configuration is encoded as:
//!
//! ```text
//! key_id (1) || kem_id (2) || public_key (Npk) ||
//!     symmetric_len (2) || (kdf_id (2) || aead_id (2))*
//! ```
//!
//! The `application/ohttp-keys` media type concatenates configurations, each
//! prefixed by its 16 bit length.

use crate::error::{Error, Result};
use crate::suite::{KEM, Suite, SymmetricSuite};
use crate::wire::{Decoder, Encoder};

/// KeyConfig is a gateway key configuration whose KEM is supported and which
/// offers at least one supported symmetric algorithm pair. The pairs that are
/// not supported locally are retained, so that re-encoding is lossless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConfig {
    key_id: u8,
    kem: KEM,
    public_key: Vec<u8>,
    symmetric: Vec<SymmetricSuite>,
    suite: Suite,
}

impl KeyConfig {
    /// new assembles a key configuration, validating the public key size and
    /// resolving the first supported symmetric pair.
    pub fn new(
        key_id: u8,
        kem: KEM,
        public_key: &[u8],
        symmetric: Vec<SymmetricSuite>,
    ) -> Result<Self> {
        if public_key.len() != kem.public_key_len() {
            return Err(Error::Malformed("public key length"));
        }
        // Encoded length is 4 bytes per pair and must fit in a u16
        if symmetric.is_empty() || symmetric.len() > u16::MAX as usize / 4 {
            return Err(Error::Malformed("symmetric algorithms length"));
        }
        let Some((kdf, aead)) = symmetric.iter().find_map(|s| s.supported()) else {
            return Err(Error::UnsupportedSuite {
                kem: kem.id(),
                kdf: symmetric[0].kdf,
                aead: symmetric[0].aead,
            });
        };
        Ok(Self {
            key_id,
            kem,
            public_key: public_key.to_vec(),
            symmetric,
            suite: Suite::new(kem, kdf, aead),
        })
    }

    /// decode parses a single encoded key configuration. Empty, truncated and
    /// oversized inputs are malformed; a well-formed configuration that can not
    /// be used locally is an unsupported suite.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::Malformed("empty key configuration"));
        }
        let mut dec = Decoder::new(data);

        let key_id = dec.read_u8("key id")?;
        let kem_id = dec.read_u16("kem id")?;

        // Without a known KEM the public key length is unknown, so the rest of
        // the configuration can not be framed.
        let Some(kem) = KEM::from_id(kem_id) else {
            return Err(Error::UnsupportedSuite {
                kem: kem_id,
                kdf: 0,
                aead: 0,
            });
        };
        let public_key = dec.read_bytes(kem.public_key_len(), "public key")?;

        let sym_len = dec.read_u16("symmetric algorithms length")? as usize;
        if sym_len == 0 || sym_len % 4 != 0 {
            return Err(Error::Malformed("symmetric algorithms length"));
        }
        let mut sym = Decoder::new(dec.read_bytes(sym_len, "symmetric algorithms")?);
        let mut symmetric = Vec::with_capacity(sym_len / 4);
        while !sym.is_empty() {
            symmetric.push(SymmetricSuite {
                kdf: sym.read_u16("kdf id")?,
                aead: sym.read_u16("aead id")?,
            });
        }
        dec.finish("trailing key configuration data")?;

        Self::new(key_id, kem, public_key, symmetric)
    }

    /// decode_list parses an `application/ohttp-keys` list. Framing errors
    /// reject the whole list, entries that are well framed but unusable are
    /// skipped and reported.
    pub fn decode_list(data: &[u8]) -> Result<KeyConfigList> {
        if data.is_empty() {
            return Err(Error::Malformed("empty key configuration list"));
        }
        let mut dec = Decoder::new(data);

        let mut list = KeyConfigList::default();
        let mut index = 0;
        while !dec.is_empty() {
            let entry = dec.read_prefixed("key configuration list entry")?;
            match Self::decode(entry) {
                Ok(config) => list.configs.push(config),
                Err(reason @ Error::UnsupportedSuite { .. }) => {
                    log::debug!("skipping key configuration {index}: {reason}");
                    list.skipped.push(SkippedConfig { index, reason });
                }
                Err(err) => return Err(err),
            }
            index += 1;
        }
        if list.configs.is_empty() {
            return Err(Error::NoUsableConfig(index));
        }
        Ok(list)
    }

    /// encode serializes the configuration into its wire format.
    pub fn encode(&self) -> Vec<u8> {
        let mut enc = Encoder::with_capacity(5 + self.public_key.len() + 4 * self.symmetric.len());
        enc.write_u8(self.key_id);
        enc.write_u16(self.kem.id());
        enc.write_bytes(&self.public_key);
        enc.write_u16((4 * self.symmetric.len()) as u16);
        for s in &self.symmetric {
            enc.write_u16(s.kdf);
            enc.write_u16(s.aead);
        }
        enc.finish()
    }

    /// encode_list serializes configurations into an `application/ohttp-keys`
    /// list, each entry prefixed by its length.
    pub fn encode_list(configs: &[KeyConfig]) -> Result<Vec<u8>> {
        let mut enc = Encoder::default();
        for config in configs {
            enc.write_prefixed(&config.encode())?;
        }
        Ok(enc.finish())
    }

    /// key_id returns the identifier the gateway uses to pick its secret key.
    pub fn key_id(&self) -> u8 {
        self.key_id
    }

    pub fn kem(&self) -> KEM {
        self.kem
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// symmetric returns every offered pair, supported or not, in wire order.
    pub fn symmetric(&self) -> &[SymmetricSuite] {
        &self.symmetric
    }

    /// suite returns the cipher suite a client uses with this configuration:
    /// the KEM together with the first supported symmetric pair.
    pub fn suite(&self) -> Suite {
        self.suite
    }

    /// offers reports whether the configuration lists a symmetric pair.
    pub fn offers(&self, kdf: u16, aead: u16) -> bool {
        self.symmetric.iter().any(|s| s.kdf == kdf && s.aead == aead)
    }
}

/// SkippedConfig records a list entry that was well framed but unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedConfig {
    pub index: usize,
    pub reason: Error,
}

/// KeyConfigList is the outcome of parsing an `application/ohttp-keys` list:
/// the usable configurations in list order and the entries skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyConfigList {
    configs: Vec<KeyConfig>,
    skipped: Vec<SkippedConfig>,
}

impl KeyConfigList {
    /// select returns the first usable configuration. Selection is by list
    /// order, the gateway's preference, not by algorithm strength.
    pub fn select(&self) -> Result<&KeyConfig> {
        self.configs
            .first()
            .ok_or(Error::NoUsableConfig(self.skipped.len()))
    }

    pub fn configs(&self) -> &[KeyConfig] {
        &self.configs
    }

    pub fn skipped(&self) -> &[SkippedConfig] {
        &self.skipped
    }
}

/// parse_configs parses an `application/ohttp-keys` list into its usable
/// configurations, in list order.
pub fn parse_configs(data: &[u8]) -> Result<Vec<KeyConfig>> {
    Ok(KeyConfig::decode_list(data)?.configs)
}
