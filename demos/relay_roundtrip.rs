// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Demo: a single request and response relayed through Oblivious HTTP.
//!
//! This example demonstrates:
//! 1. A gateway publishing its key configuration list
//! 2. A client encapsulating a request to the first usable configuration
//! 3. The gateway decapsulating the request and encapsulating a response
//! 4. The client decapsulating the response

use darkbio_ohttp::{AEAD, KDF, KEM, KeyConfig, Server, SymmetricSuite, encapsulate_request_list, rand};
use hpke::{Kem, Serializable};

fn main() {
    // =========================================================================
    // Step 1: The gateway creates a key and publishes its configuration
    // =========================================================================
    println!("1. Publishing gateway key configuration...");
    let (secret, public) = hpke::kem::X25519HkdfSha256::gen_keypair(&mut rand::rng().unwrap());

    let config = KeyConfig::new(
        1,
        KEM::X25519Sha256,
        &public.to_bytes(),
        vec![
            SymmetricSuite::new(KDF::HkdfSha256, AEAD::Aes128Gcm),
            SymmetricSuite::new(KDF::HkdfSha256, AEAD::ChaCha20Poly1305),
        ],
    )
    .unwrap();
    let published = KeyConfig::encode_list(&[config.clone()]).unwrap();
    let server = Server::new(config, &secret.to_bytes()).unwrap();
    println!("   application/ohttp-keys: {}", hex::encode(&published));

    // =========================================================================
    // Step 2: The client seals a request for the relay to forward
    // =========================================================================
    println!("\n2. Encapsulating request...");
    let request = b"GET /health HTTP/1.1\r\nHost: target.example\r\n\r\n";
    let mut ctx = encapsulate_request_list(&published, request).unwrap();
    println!("   message/ohttp-req: {}", hex::encode(ctx.message()));

    // =========================================================================
    // Step 3: The gateway opens the request and seals the response
    // =========================================================================
    println!("\n3. Gateway handling request...");
    let (opened, response) = server.decapsulate(ctx.message()).unwrap();
    println!("   request: {:?}", String::from_utf8_lossy(&opened));

    let sealed = response.encapsulate(b"HTTP/1.1 200 OK\r\n\r\nok").unwrap();
    println!("   message/ohttp-res: {}", hex::encode(&sealed));

    // =========================================================================
    // Step 4: The client opens the response; the context is now consumed
    // =========================================================================
    println!("\n4. Decapsulating response...");
    let plaintext = ctx.decapsulate_response(&sealed).unwrap().into_plaintext();
    println!("   response: {:?}", String::from_utf8_lossy(&plaintext));
    assert!(ctx.is_consumed());
}
