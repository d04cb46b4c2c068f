// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Oblivious HTTP (RFC 9458) request encapsulation and response
//! decapsulation for relay clients, with the matching gateway side.

pub mod aead;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod hkdf;
pub mod hpke;
pub mod rand;
pub mod suite;
pub mod wire;

#[cfg(feature = "ffi")]
pub mod ffi;

pub use client::{RequestContext, ResponseContext, encapsulate_request, encapsulate_request_list};
pub use config::{KeyConfig, KeyConfigList, parse_configs};
pub use error::{Error, Result};
pub use gateway::{Server, ServerResponse};
pub use suite::{AEAD, KDF, KEM, Suite, SymmetricSuite};
