// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Gateway side of Oblivious HTTP: request decapsulation and response
//! encapsulation.
//!
//! https://datatracker.ietf.org/doc/html/rfc9458#section-4.4

use crate::aead;
use crate::config::KeyConfig;
use crate::error::{Error, Result};
use crate::hpke;
use crate::rand;
use crate::suite::Suite;
use crate::wire::{Decoder, RequestHeader};
use ::hpke::rand_core::RngCore;
use rand_chacha::ChaCha20Rng;
use zeroize::Zeroizing;

/// Server decapsulates requests sealed to one of its key configurations.
pub struct Server {
    config: KeyConfig,
    secret_key: Zeroizing<Vec<u8>>,
}

impl Server {
    /// new creates a gateway from a key configuration and the serialized KEM
    /// secret key behind it. The secret key must match the published public
    /// key.
    pub fn new(config: KeyConfig, secret_key: &[u8]) -> Result<Self> {
        if secret_key.len() != config.kem().secret_key_len() {
            return Err(Error::KeyMismatch("secret key length"));
        }
        if hpke::public_key(config.kem(), secret_key)? != config.public_key() {
            return Err(Error::KeyMismatch("secret key does not match public key"));
        }
        Ok(Self {
            config,
            secret_key: Zeroizing::new(secret_key.to_vec()),
        })
    }

    /// config returns the key configuration the gateway publishes.
    pub fn config(&self) -> &KeyConfig {
        &self.config
    }

    /// decapsulate opens an encapsulated request, returning the request and the
    /// context for answering it.
    pub fn decapsulate(&self, request: &[u8]) -> Result<(Vec<u8>, ServerResponse)> {
        let mut dec = Decoder::new(request);
        let header = RequestHeader::decode(&mut dec)?;

        if header.key_id != self.config.key_id() {
            return Err(Error::KeyMismatch("unknown key id"));
        }
        if header.kem != self.config.kem().id() {
            return Err(Error::KeyMismatch("kem differs from key configuration"));
        }
        if !self.config.offers(header.kdf, header.aead) {
            return Err(Error::KeyMismatch("symmetric algorithms not offered"));
        }
        let suite = Suite::from_ids(header.kem, header.kdf, header.aead)?;

        let enc = dec.read_bytes(suite.kem.encapsulated_key_len(), "encapsulated key")?;
        let ct = dec.read_rest();
        if ct.len() < suite.aead.tag_len() {
            return Err(Error::Malformed("request ciphertext"));
        }

        let info = hpke::request_info(&header.encode());
        let mut receiver = hpke::setup_receiver(suite, &self.secret_key, enc, &info)?;
        let plaintext = receiver.open(ct, &[])?;
        let secret = hpke::export_secret(suite, receiver.as_ref())?;

        log::debug!(
            "decapsulated {} byte request for key {} with {:?}",
            plaintext.len(),
            header.key_id,
            suite
        );
        let response = ServerResponse {
            suite,
            enc: enc.to_vec(),
            secret,
        };
        Ok((plaintext, response))
    }
}

/// ServerResponse seals the single response to a decapsulated request.
pub struct ServerResponse {
    suite: Suite,
    enc: Vec<u8>,
    secret: Zeroizing<Vec<u8>>,
}

impl ServerResponse {
    /// encapsulate seals the response under a fresh random response nonce.
    pub fn encapsulate(self, response: &[u8]) -> Result<Vec<u8>> {
        self.encapsulate_with_rng(response, &mut rand::rng()?)
    }

    /// encapsulate_with_rng seals the response, drawing the response nonce from
    /// the provided random stream.
    pub fn encapsulate_with_rng(self, response: &[u8], rng: &mut ChaCha20Rng) -> Result<Vec<u8>> {
        let mut nonce = vec![0u8; self.suite.response_nonce_len()];
        rng.fill_bytes(&mut nonce);

        let keys = hpke::response_keys(self.suite, &self.secret, &self.enc, &nonce)?;
        let ct = aead::seal(self.suite.aead, &keys.key, &keys.nonce, &[], response)?;

        let mut out = nonce;
        out.extend_from_slice(&ct);
        Ok(out)
    }
}
