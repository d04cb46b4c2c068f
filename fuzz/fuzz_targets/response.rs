// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![no_main]

use darkbio_ohttp::{AEAD, KDF, KEM, KeyConfig, RequestContext, Server, SymmetricSuite};
use hpke::{Kem, Serializable};
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

fn server() -> &'static Server {
    static SERVER: OnceLock<Server> = OnceLock::new();
    SERVER.get_or_init(|| {
        let (sk, pk) = hpke::kem::X25519HkdfSha256::derive_keypair(b"fuzzing key material");
        let config = KeyConfig::new(
            1,
            KEM::X25519Sha256,
            &pk.to_bytes(),
            vec![SymmetricSuite::new(KDF::HkdfSha256, AEAD::ChaCha20Poly1305)],
        )
        .expect("failed to create config");
        Server::new(config, &sk.to_bytes()).expect("failed to create server")
    })
}

fuzz_target!(|data: &[u8]| {
    // Arbitrary requests must be rejected by the gateway without panicking
    let _ = server().decapsulate(data);

    // Arbitrary responses must never authenticate
    let mut ctx = RequestContext::new(server().config(), b"request").expect("failed to encapsulate");
    assert!(ctx.decapsulate_response(data).is_err());
    assert!(ctx.is_consumed());
});
