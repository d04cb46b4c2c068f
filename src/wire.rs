// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Big-endian binary framing shared by the key configuration, request and
//! response codecs.
//!
//! All length fields are exact: decoding fails on truncation and callers are
//! expected to call [`Decoder::finish`] to reject trailing bytes.

use crate::error::{Error, Result};
use crate::suite::Suite;

/// HEADER_LEN is the size of the request header: key id, KEM, KDF and AEAD.
pub const HEADER_LEN: usize = 7;

/// Decoder is a cursor over a borrowed byte blob, reading fixed-width
/// big-endian fields. Every read names the field it was decoding, so that a
/// failure can be reported as a precise `Malformed` error.
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    // new creates a decoder around a data blob.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    // remaining returns the number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    // is_empty reports whether all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    // finish terminates decoding and returns an error if trailing bytes remain.
    pub fn finish(self, what: &'static str) -> Result<()> {
        if self.pos != self.data.len() {
            return Err(Error::Malformed(what));
        }
        Ok(())
    }

    // read_u8 decodes a single byte.
    pub fn read_u8(&mut self, what: &'static str) -> Result<u8> {
        Ok(self.read_bytes(1, what)?[0])
    }

    // read_u16 decodes a big-endian 16 bit integer.
    pub fn read_u16(&mut self, what: &'static str) -> Result<u16> {
        let bytes = self.read_bytes(2, what)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    // read_bytes retrieves the next len bytes and moves the cursor forward.
    pub fn read_bytes(&mut self, len: usize, what: &'static str) -> Result<&'a [u8]> {
        let end = match self.pos.checked_add(len) {
            Some(end) if end <= self.data.len() => end,
            _ => return Err(Error::Malformed(what)),
        };
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    // read_rest retrieves everything left in the buffer.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let bytes = &self.data[self.pos..];
        self.pos = self.data.len();
        bytes
    }

    // read_prefixed retrieves a blob prefixed by its 16 bit length.
    pub fn read_prefixed(&mut self, what: &'static str) -> Result<&'a [u8]> {
        let len = self.read_u16(what)?;
        self.read_bytes(len as usize, what)
    }
}

/// Encoder accumulates big-endian fields into an owned buffer.
#[derive(Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    // with_capacity creates an encoder with a preallocated buffer.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    // write_prefixed appends a blob prefixed by its 16 bit length. Blobs longer
    // than 65535 bytes cannot be framed.
    pub fn write_prefixed(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u16::try_from(bytes.len()).map_err(|_| Error::Malformed("length prefix"))?;
        self.write_u16(len);
        self.write_bytes(bytes);
        Ok(())
    }

    // finish returns the encoded buffer.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// RequestHeader prefixes every encapsulated request and tells the gateway
/// which key and algorithms the client used. The identifiers are kept raw,
/// deciding whether they are acceptable is up to the receiving side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub key_id: u8,
    pub kem: u16,
    pub kdf: u16,
    pub aead: u16,
}

impl RequestHeader {
    /// new creates the header announcing a key id and a supported suite.
    pub fn new(key_id: u8, suite: Suite) -> Self {
        Self {
            key_id,
            kem: suite.kem.id(),
            kdf: suite.kdf.id(),
            aead: suite.aead.id(),
        }
    }

    /// encode serializes the header into its fixed size wire format.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0] = self.key_id;
        out[1..3].copy_from_slice(&self.kem.to_be_bytes());
        out[3..5].copy_from_slice(&self.kdf.to_be_bytes());
        out[5..7].copy_from_slice(&self.aead.to_be_bytes());
        out
    }

    /// decode reads a header from the front of the decoder.
    pub fn decode(dec: &mut Decoder<'_>) -> Result<Self> {
        Ok(Self {
            key_id: dec.read_u8("request header")?,
            kem: dec.read_u16("request header")?,
            kdf: dec.read_u16("request header")?,
            aead: dec.read_u16("request header")?,
        })
    }
}
