// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// Result type used by the encapsulation APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Error is the failures that can occur while parsing key configurations or
/// encapsulating and decapsulating messages.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("malformed {0}")]
    Malformed(&'static str),
    #[error("unsupported cipher suite: kem {kem:#06x}, kdf {kdf:#06x}, aead {aead:#06x}")]
    UnsupportedSuite { kem: u16, kdf: u16, aead: u16 },
    #[error("no usable key configuration among {0} entries")]
    NoUsableConfig(usize),
    #[error("encapsulation failed: {0}")]
    Encapsulation(String),
    #[error("authentication failed")]
    AuthFailure,
    #[error("internal crypto failure: {0}")]
    InternalCrypto(String),
    #[error("request context already consumed")]
    ContextConsumed,
    #[error("key configuration mismatch: {0}")]
    KeyMismatch(&'static str),
}

impl Error {
    /// is_malformed reports whether the error is a structural violation that can
    /// be detected without any secret material.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed(_))
    }
}
