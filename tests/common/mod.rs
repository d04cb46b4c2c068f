// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![allow(dead_code)]

use darkbio_ohttp::{KEM, KeyConfig, Server, Suite, SymmetricSuite};
use hpke::{Kem, Serializable};

/// keypair deterministically derives a serialized KEM key pair.
pub fn keypair(kem: KEM, ikm: &[u8]) -> (Vec<u8>, Vec<u8>) {
    fn derive<M: Kem>(ikm: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let (sk, pk) = M::derive_keypair(ikm);
        (sk.to_bytes().to_vec(), pk.to_bytes().to_vec())
    }
    match kem {
        #[cfg(feature = "p256")]
        KEM::P256Sha256 => derive::<hpke::kem::DhP256HkdfSha256>(ikm),
        KEM::X25519Sha256 => derive::<hpke::kem::X25519HkdfSha256>(ikm),
    }
}

/// server creates a gateway holding a single key offering the given pairs.
pub fn server(key_id: u8, kem: KEM, symmetric: Vec<SymmetricSuite>) -> Server {
    let (sk, pk) = keypair(kem, &[key_id; 32]);
    let config = KeyConfig::new(key_id, kem, &pk, symmetric).unwrap();
    Server::new(config, &sk).unwrap()
}

/// suite_server creates a gateway offering exactly one suite.
pub fn suite_server(key_id: u8, suite: Suite) -> Server {
    server(key_id, suite.kem, vec![SymmetricSuite::new(suite.kdf, suite.aead)])
}
