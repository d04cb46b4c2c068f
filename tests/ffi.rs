// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![cfg(feature = "ffi")]

mod common;

use darkbio_ohttp::ffi::*;
use darkbio_ohttp::{AEAD, KDF, KEM, KeyConfig, Suite};
use std::os::raw::c_char;
use std::slice;

// last_error drains the staged error of the calling thread.
fn last_error() -> Option<String> {
    let len = last_error_length();
    if len == 0 {
        return None;
    }
    let mut buf = vec![0 as c_char; len as usize + 1];
    let n = unsafe { last_error_message(buf.as_mut_ptr(), buf.len() as i32) };
    assert_eq!(n, len);

    let bytes: Vec<u8> = buf[..n as usize].iter().map(|&c| c as u8).collect();
    Some(String::from_utf8(bytes).unwrap())
}

// Tests a full exchange through the C boundary, including the lifecycle of
// the handles involved.
#[test]
fn test_ffi_roundtrip() {
    initialize_diagnostics();
    initialize_diagnostics();

    let suite = Suite::new(KEM::X25519Sha256, KDF::HkdfSha256, AEAD::Aes128Gcm);
    let server = common::suite_server(1, suite);
    let config = server.config().encode();

    let request = unsafe {
        encapsulate_request_ffi(config.as_ptr(), config.len(), b"request".as_ptr(), 7)
    };
    assert_ne!(request, 0, "encapsulation failed: {:?}", last_error());

    let msg = unsafe {
        slice::from_raw_parts(
            request_context_message_ffi(request),
            request_context_message_len_ffi(request),
        )
    }
    .to_vec();
    let (got, response) = server.decapsulate(&msg).unwrap();
    assert_eq!(got, b"request");
    let sealed = response.encapsulate(b"response").unwrap();

    let handle = unsafe { decapsulate_response_ffi(request, sealed.as_ptr(), sealed.len()) };
    assert_ne!(handle, 0, "decapsulation failed: {:?}", last_error());
    assert_eq!(last_error(), None);

    let plaintext = unsafe {
        slice::from_raw_parts(
            response_context_message_ffi(handle),
            response_context_message_len_ffi(handle),
        )
    };
    assert_eq!(plaintext, b"response");
    release_response_context_ffi(handle);
    assert_eq!(last_error(), None);

    // Both handles are dead now
    assert_eq!(response_context_message_len_ffi(handle), 0);
    assert!(last_error().unwrap().starts_with("unknown handle"));
    assert!(request_context_message_ffi(request).is_null());
    assert!(last_error().unwrap().starts_with("unknown handle"));
    release_request_context_ffi(request);
    assert!(last_error().unwrap().starts_with("unknown handle"));
}

// Tests that a failed decapsulation still consumes the request handle.
#[test]
fn test_ffi_decapsulate_consumes() {
    let suite = Suite::new(KEM::X25519Sha256, KDF::HkdfSha256, AEAD::Aes128Gcm);
    let server = common::suite_server(2, suite);
    let config = server.config().encode();

    let request = unsafe {
        encapsulate_request_ffi(config.as_ptr(), config.len(), b"request".as_ptr(), 7)
    };
    assert_ne!(request, 0);

    let bogus = [0u8; 48];
    let handle = unsafe { decapsulate_response_ffi(request, bogus.as_ptr(), bogus.len()) };
    assert_eq!(handle, 0);
    assert_eq!(
        last_error().unwrap(),
        "failed to decapsulate response: authentication failed"
    );

    let handle = unsafe { decapsulate_response_ffi(request, bogus.as_ptr(), bogus.len()) };
    assert_eq!(handle, 0);
    assert_eq!(
        last_error().unwrap(),
        format!("unknown handle {request}, released or already consumed")
    );
}

// Tests list encapsulation and the errors staged for bad configurations.
#[test]
fn test_ffi_config_errors() {
    let suite = Suite::new(KEM::X25519Sha256, KDF::HkdfSha512, AEAD::ChaCha20Poly1305);
    let server = common::suite_server(3, suite);
    let list = KeyConfig::encode_list(&[server.config().clone()]).unwrap();

    let request = unsafe {
        encapsulate_request_list_ffi(list.as_ptr(), list.len(), b"request".as_ptr(), 7)
    };
    assert_ne!(request, 0);
    assert_eq!(request_context_message_len_ffi(request), 7 + 32 + 7 + 16);
    release_request_context_ffi(request);
    assert_eq!(last_error(), None);

    // A list is not a single configuration
    let request = unsafe {
        encapsulate_request_ffi(list.as_ptr(), list.len(), b"request".as_ptr(), 7)
    };
    assert_eq!(request, 0);
    assert!(last_error().unwrap().starts_with("failed to encapsulate request: "));

    let request = unsafe {
        encapsulate_request_ffi(list.as_ptr(), list.len(), std::ptr::null(), 7)
    };
    assert_eq!(request, 0);
    assert_eq!(last_error().unwrap(), "invalid argument `msg` passed");
}

// Tests that a staged error survives later successful calls and is only
// drained by reading it.
#[test]
fn test_ffi_sticky_error() {
    let suite = Suite::new(KEM::X25519Sha256, KDF::HkdfSha256, AEAD::Aes128Gcm);
    let server = common::suite_server(4, suite);
    let config = server.config().encode();

    let request = unsafe { encapsulate_request_ffi(config.as_ptr(), config.len(), std::ptr::null(), 7) };
    assert_eq!(request, 0);

    let request = unsafe {
        encapsulate_request_ffi(config.as_ptr(), config.len(), b"request".as_ptr(), 7)
    };
    assert_ne!(request, 0);
    assert_ne!(request_context_message_len_ffi(request), 0);
    release_request_context_ffi(request);

    assert_eq!(last_error().unwrap(), "invalid argument `msg` passed");
    assert_eq!(last_error(), None);
}

// Tests that the generated C header declares every boundary function.
#[test]
fn test_ffi_header() {
    let header = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/include/darkbio_ohttp.h"));
    for func in [
        "encapsulate_request_ffi",
        "encapsulate_request_list_ffi",
        "request_context_message_ffi",
        "request_context_message_len_ffi",
        "decapsulate_response_ffi",
        "response_context_message_ffi",
        "response_context_message_len_ffi",
        "release_request_context_ffi",
        "release_response_context_ffi",
        "last_error_length",
        "last_error_message",
        "initialize_diagnostics",
    ] {
        assert!(header.contains(&format!("{func}(")), "{func} missing from header");
    }
}
