// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! HPKE key schedule for Oblivious HTTP, dispatched over the supported suites.
//!
//! https://datatracker.ietf.org/doc/html/rfc9180
//! https://datatracker.ietf.org/doc/html/rfc9458#section-4

use crate::error::{Error, Result};
use crate::hkdf;
use crate::suite::{AEAD, KDF, KEM, Suite};
use hpke::aead::{AeadCtxR, AeadCtxS};
use hpke::{Deserializable, Kem, Serializable};
use rand_chacha::ChaCha20Rng;
use zeroize::Zeroizing;

// The labels below are part of the wire contract. Both ends of an exchange must
// use them byte for byte, any drift surfaces as an authentication failure and
// not as a format error.

/// REQUEST_LABEL prefixes the HPKE info of every encapsulated request.
pub const REQUEST_LABEL: &[u8] = b"message/bhttp request";

/// RESPONSE_LABEL is the exporter context for the response secret. It differs
/// from the request label, so the two directions never share keys.
pub const RESPONSE_LABEL: &[u8] = b"message/bhttp response";

/// KEY_LABEL and NONCE_LABEL are the HKDF-Expand infos of the response key
/// and nonce.
pub const KEY_LABEL: &[u8] = b"key";
pub const NONCE_LABEL: &[u8] = b"nonce";

/// Exporter derives secret material bound to an established HPKE context.
pub trait Exporter {
    /// export derives len bytes of secret material under the given label.
    fn export(&self, label: &[u8], len: usize) -> Result<Zeroizing<Vec<u8>>>;
}

/// SenderContext is an HPKE sender context with its suite erased.
pub trait SenderContext: Exporter + Send {
    /// seal encrypts a message using the next nonce in the sequence.
    fn seal(&mut self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>>;
}

/// ReceiverContext is an HPKE receiver context with its suite erased.
pub trait ReceiverContext: Exporter + Send {
    /// open decrypts a message using the next nonce in the sequence.
    fn open(&mut self, ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>>;
}

impl<A, F, M> SenderContext for AeadCtxS<A, F, M>
where
    A: hpke::aead::Aead,
    F: hpke::kdf::Kdf,
    M: Kem,
    AeadCtxS<A, F, M>: Send,
{
    fn seal(&mut self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        AeadCtxS::seal(self, plaintext, aad)
            .map_err(|e| Error::InternalCrypto(format!("hpke seal failed: {e}")))
    }
}

impl<A: hpke::aead::Aead, F: hpke::kdf::Kdf, M: Kem> Exporter for AeadCtxS<A, F, M> {
    fn export(&self, label: &[u8], len: usize) -> Result<Zeroizing<Vec<u8>>> {
        let mut out = Zeroizing::new(vec![0u8; len]);
        AeadCtxS::export(self, label, &mut out)
            .map_err(|e| Error::InternalCrypto(format!("hpke export failed: {e}")))?;
        Ok(out)
    }
}

impl<A, F, M> ReceiverContext for AeadCtxR<A, F, M>
where
    A: hpke::aead::Aead,
    F: hpke::kdf::Kdf,
    M: Kem,
    AeadCtxR<A, F, M>: Send,
{
    fn open(&mut self, ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        AeadCtxR::open(self, ciphertext, aad).map_err(|_| Error::AuthFailure)
    }
}

impl<A: hpke::aead::Aead, F: hpke::kdf::Kdf, M: Kem> Exporter for AeadCtxR<A, F, M> {
    fn export(&self, label: &[u8], len: usize) -> Result<Zeroizing<Vec<u8>>> {
        let mut out = Zeroizing::new(vec![0u8; len]);
        AeadCtxR::export(self, label, &mut out)
            .map_err(|e| Error::InternalCrypto(format!("hpke export failed: {e}")))?;
        Ok(out)
    }
}

// dispatch monomorphizes a generic function over the concrete HPKE types of a
// runtime suite, one algorithm family at a time.
macro_rules! dispatch {
    ($suite:expr, $func:ident($($arg:expr),*)) => {{
        let suite: Suite = $suite;
        match suite.kem {
            #[cfg(feature = "p256")]
            KEM::P256Sha256 => dispatch!(@kdf suite, hpke::kem::DhP256HkdfSha256, $func($($arg),*)),
            KEM::X25519Sha256 => dispatch!(@kdf suite, hpke::kem::X25519HkdfSha256, $func($($arg),*)),
        }
    }};
    (@kdf $suite:ident, $kem:ty, $func:ident($($arg:expr),*)) => {
        match $suite.kdf {
            KDF::HkdfSha256 => dispatch!(@aead $suite, $kem, hpke::kdf::HkdfSha256, $func($($arg),*)),
            KDF::HkdfSha384 => dispatch!(@aead $suite, $kem, hpke::kdf::HkdfSha384, $func($($arg),*)),
            KDF::HkdfSha512 => dispatch!(@aead $suite, $kem, hpke::kdf::HkdfSha512, $func($($arg),*)),
        }
    };
    (@aead $suite:ident, $kem:ty, $kdf:ty, $func:ident($($arg:expr),*)) => {
        match $suite.aead {
            AEAD::Aes128Gcm => $func::<$kem, $kdf, hpke::aead::AesGcm128>($($arg),*),
            AEAD::Aes256Gcm => $func::<$kem, $kdf, hpke::aead::AesGcm256>($($arg),*),
            AEAD::ChaCha20Poly1305 => $func::<$kem, $kdf, hpke::aead::ChaCha20Poly1305>($($arg),*),
        }
    };
}

/// request_info assembles the HPKE info for a request: the request label, a
/// zero byte, then the request header. Binding the header here authenticates
/// the key id and suite together with the ciphertext.
pub fn request_info(header: &[u8]) -> Vec<u8> {
    let mut info = Vec::with_capacity(REQUEST_LABEL.len() + 1 + header.len());
    info.extend_from_slice(REQUEST_LABEL);
    info.push(0);
    info.extend_from_slice(header);
    info
}

/// encapsulate runs the sender side of the HPKE base mode against the public
/// key, returning the serialized encapsulated key and the sender context.
pub fn encapsulate(
    suite: Suite,
    public_key: &[u8],
    info: &[u8],
    rng: &mut ChaCha20Rng,
) -> Result<(Vec<u8>, Box<dyn SenderContext>)> {
    dispatch!(suite, encapsulate_with(public_key, info, rng))
}

fn encapsulate_with<M, F, A>(
    public_key: &[u8],
    info: &[u8],
    rng: &mut ChaCha20Rng,
) -> Result<(Vec<u8>, Box<dyn SenderContext>)>
where
    M: Kem + Send + 'static,
    F: hpke::kdf::Kdf + Send + 'static,
    A: hpke::aead::Aead + Send + 'static,
    AeadCtxS<A, F, M>: Send,
{
    let pk = <M as Kem>::PublicKey::from_bytes(public_key)
        .map_err(|e| Error::Encapsulation(format!("invalid public key: {e}")))?;

    let (enc, ctx) = hpke::setup_sender::<A, F, M, _>(&hpke::OpModeS::Base, &pk, info, rng)
        .map_err(|e| Error::Encapsulation(e.to_string()))?;

    Ok((enc.to_bytes().to_vec(), Box::new(ctx)))
}

/// setup_receiver runs the recipient side of the HPKE base mode with the given
/// secret key over a received encapsulated key.
pub fn setup_receiver(
    suite: Suite,
    secret_key: &[u8],
    enc: &[u8],
    info: &[u8],
) -> Result<Box<dyn ReceiverContext>> {
    dispatch!(suite, setup_receiver_with(secret_key, enc, info))
}

fn setup_receiver_with<M, F, A>(
    secret_key: &[u8],
    enc: &[u8],
    info: &[u8],
) -> Result<Box<dyn ReceiverContext>>
where
    M: Kem + Send + 'static,
    F: hpke::kdf::Kdf + Send + 'static,
    A: hpke::aead::Aead + Send + 'static,
    AeadCtxR<A, F, M>: Send,
{
    let sk = <M as Kem>::PrivateKey::from_bytes(secret_key)
        .map_err(|_| Error::KeyMismatch("invalid secret key"))?;

    // An encapsulated key that does not even decode is detectable without any
    // secret, everything past that point is an authentication failure.
    let enc = <M as Kem>::EncappedKey::from_bytes(enc)
        .map_err(|_| Error::Malformed("encapsulated key"))?;

    let ctx = hpke::setup_receiver::<A, F, M>(&hpke::OpModeR::Base, &sk, &enc, info)
        .map_err(|_| Error::AuthFailure)?;
    Ok(Box::new(ctx))
}

/// public_key derives the serialized public counterpart of a secret key,
/// validating the secret key encoding on the way.
pub fn public_key(kem: KEM, secret_key: &[u8]) -> Result<Vec<u8>> {
    match kem {
        #[cfg(feature = "p256")]
        KEM::P256Sha256 => public_key_with::<hpke::kem::DhP256HkdfSha256>(secret_key),
        KEM::X25519Sha256 => public_key_with::<hpke::kem::X25519HkdfSha256>(secret_key),
    }
}

fn public_key_with<M: Kem>(secret_key: &[u8]) -> Result<Vec<u8>> {
    let sk = <M as Kem>::PrivateKey::from_bytes(secret_key)
        .map_err(|_| Error::KeyMismatch("invalid secret key"))?;
    Ok(M::sk_to_pk(&sk).to_bytes().to_vec())
}

/// export_secret derives the response secret from a sender or receiver
/// context: max(Nk, Nn) bytes under the response label.
pub fn export_secret<E: Exporter + ?Sized>(suite: Suite, ctx: &E) -> Result<Zeroizing<Vec<u8>>> {
    ctx.export(RESPONSE_LABEL, suite.response_nonce_len())
}

/// ResponseKeys is the AEAD key and nonce protecting a single response.
pub struct ResponseKeys {
    pub key: Zeroizing<Vec<u8>>,
    pub nonce: Zeroizing<Vec<u8>>,
}

/// response_keys derives the response AEAD key and nonce:
///
///   prk   = Extract(enc || response_nonce, secret)
///   key   = Expand(prk, "key", Nk)
///   nonce = Expand(prk, "nonce", Nn)
pub fn response_keys(
    suite: Suite,
    secret: &[u8],
    enc: &[u8],
    response_nonce: &[u8],
) -> Result<ResponseKeys> {
    let mut salt = Zeroizing::new(Vec::with_capacity(enc.len() + response_nonce.len()));
    salt.extend_from_slice(enc);
    salt.extend_from_slice(response_nonce);

    let prk = hkdf::extract(suite.kdf, &salt, secret);
    Ok(ResponseKeys {
        key: prk.expand(KEY_LABEL, suite.aead.key_len())?,
        nonce: prk.expand(NONCE_LABEL, suite.aead.nonce_len())?,
    })
}
