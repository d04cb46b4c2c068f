// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Client side of Oblivious HTTP: request encapsulation and response
//! decapsulation.
//!
//! https://datatracker.ietf.org/doc/html/rfc9458#section-4.3
//!
//! A [`RequestContext`] is created by sealing a request to a gateway's key
//! configuration. It holds the framed request for the relay and the secret
//! exported from the HPKE context, which opens exactly one response:
//!
//! ```text
//! request  = key_id || kem_id || kdf_id || aead_id || enc || ct
//! response = response_nonce || ct
//! ```

use crate::aead;
use crate::config::KeyConfig;
use crate::error::{Error, Result};
use crate::hpke;
use crate::rand;
use crate::suite::Suite;
use crate::wire::{HEADER_LEN, RequestHeader};
use rand_chacha::ChaCha20Rng;
use std::mem;
use subtle::{Choice, ConstantTimeLess};
use zeroize::Zeroizing;

/// encapsulate_request seals a request to a single encoded key configuration.
pub fn encapsulate_request(config: &[u8], request: &[u8]) -> Result<RequestContext> {
    RequestContext::new(&KeyConfig::decode(config)?, request)
}

/// encapsulate_request_list seals a request to the first usable configuration
/// of an `application/ohttp-keys` list.
pub fn encapsulate_request_list(list: &[u8], request: &[u8]) -> Result<RequestContext> {
    let configs = KeyConfig::decode_list(list)?;
    RequestContext::new(configs.select()?, request)
}

/// RequestContext is a sealed request together with the state needed to open
/// the response to it. The response can be decapsulated only once; after
/// that, or after any failed attempt, the context is consumed.
pub struct RequestContext {
    message: Vec<u8>,
    state: State,
}

enum State {
    Fresh(ClientResponse),
    Consumed,
}

// ClientResponse is the key material retained for opening the response.
struct ClientResponse {
    suite: Suite,
    enc: Vec<u8>,
    secret: Zeroizing<Vec<u8>>,
}

impl RequestContext {
    /// new seals the request to the key configuration, using a fresh ephemeral
    /// key from the operating system's randomness.
    pub fn new(config: &KeyConfig, request: &[u8]) -> Result<Self> {
        Self::new_with_rng(config, request, &mut rand::rng()?)
    }

    /// new_with_rng seals the request to the key configuration, drawing the
    /// ephemeral key from the provided random stream.
    pub fn new_with_rng(config: &KeyConfig, request: &[u8], rng: &mut ChaCha20Rng) -> Result<Self> {
        let suite = config.suite();
        if request.is_empty() {
            return Err(Error::Encapsulation("empty request".into()));
        }
        if request.len() as u64 > suite.aead.max_plaintext_len() {
            return Err(Error::Encapsulation(format!(
                "request too large: {} bytes",
                request.len()
            )));
        }
        let header = RequestHeader::new(config.key_id(), suite).encode();
        let info = hpke::request_info(&header);

        let (enc, mut sender) = hpke::encapsulate(suite, config.public_key(), &info, rng)?;
        let ct = sender.seal(request, &[])?;
        let secret = hpke::export_secret(suite, sender.as_ref())?;

        let mut message = Vec::with_capacity(HEADER_LEN + enc.len() + ct.len());
        message.extend_from_slice(&header);
        message.extend_from_slice(&enc);
        message.extend_from_slice(&ct);

        log::debug!(
            "encapsulated {} byte request for key {} with {:?}",
            request.len(),
            config.key_id(),
            suite
        );
        Ok(Self {
            message,
            state: State::Fresh(ClientResponse { suite, enc, secret }),
        })
    }

    /// message returns the encapsulated request to hand to the relay. It stays
    /// available for the lifetime of the context.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// is_consumed reports whether a response decapsulation was attempted.
    pub fn is_consumed(&self) -> bool {
        matches!(self.state, State::Consumed)
    }

    /// decapsulate_response opens the gateway's encapsulated response. The
    /// context is consumed whatever the outcome, so a second call fails with
    /// [`Error::ContextConsumed`].
    pub fn decapsulate_response(&mut self, response: &[u8]) -> Result<ResponseContext> {
        let State::Fresh(client) = mem::replace(&mut self.state, State::Consumed) else {
            return Err(Error::ContextConsumed);
        };
        let res = client.decapsulate(response);
        if let Err(err) = &res {
            log::debug!("response decapsulation failed: {err}");
        }
        res
    }
}

impl ClientResponse {
    // decapsulate opens a response. A response too short to hold the nonce and
    // a tag is malformed, any other failure is an authentication failure. Both
    // paths run the full key schedule and AEAD so they take the same time.
    fn decapsulate(self, response: &[u8]) -> Result<ResponseContext> {
        let nonce_len = self.suite.response_nonce_len();
        let min_len = nonce_len + self.suite.aead.tag_len();

        let short = (response.len() as u64).ct_lt(&(min_len as u64));
        let mut padded = vec![0u8; min_len];
        let copy = response.len().min(min_len);
        padded[..copy].copy_from_slice(&response[..copy]);

        let input: &[u8] = if bool::from(short) { &padded } else { response };
        let (nonce, ct) = input.split_at(nonce_len);

        let keys = hpke::response_keys(self.suite, &self.secret, &self.enc, nonce)?;
        let (authentic, plaintext) = match aead::open(self.suite.aead, &keys.key, &keys.nonce, &[], ct) {
            Ok(pt) => (Choice::from(1), pt),
            Err(Error::AuthFailure) => (Choice::from(0), Vec::new()),
            Err(err) => return Err(err),
        };
        if bool::from(!short & authentic) {
            return Ok(ResponseContext { plaintext });
        }
        if bool::from(short) {
            return Err(Error::Malformed("encapsulated response"));
        }
        Err(Error::AuthFailure)
    }
}

/// ResponseContext holds a decapsulated response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseContext {
    plaintext: Vec<u8>,
}

impl ResponseContext {
    pub fn plaintext(&self) -> &[u8] {
        &self.plaintext
    }

    pub fn into_plaintext(self) -> Vec<u8> {
        self.plaintext
    }
}
