// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! C boundary for embedding the relay client in native applications.
//!
//! Contexts never cross the boundary as pointers. Each is owned by a
//! process-wide registry and referenced by a non-zero `u64` handle; zero is
//! returned on failure, with the reason staged in the calling thread's last
//! error (see [`last_error_message`]). Every entry point catches panics.
//!
//! A request handle is consumed by [`decapsulate_response_ffi`], successful or
//! not, and must not be released afterwards. Pointers returned for messages
//! stay valid until their context is consumed or released.

mod error;
mod registry;

pub use error::{ClientError, initialize_diagnostics, last_error_length, last_error_message};

use crate::client::{self, RequestContext, ResponseContext};
use error::update_last_error;
use libc::size_t;
use registry::Registry;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::{ptr, slice};

static REQUESTS: Registry<RequestContext> = Registry::new();
static RESPONSES: Registry<ResponseContext> = Registry::new();

// guard runs a boundary operation, staging its error or the panic it raised
// in the last error and returning the failure value instead.
fn guard<T>(fail: T, op: impl FnOnce() -> Result<T, ClientError>) -> T {
    match catch_unwind(AssertUnwindSafe(op)) {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            update_last_error(err);
            fail
        }
        Err(payload) => {
            update_last_error(ClientError::from_panic(payload));
            fail
        }
    }
}

// borrow_slice reinterprets a caller provided buffer, refusing null pointers.
// An empty buffer may be passed as any non-null pointer.
unsafe fn borrow_slice<'a>(
    ptr: *const u8,
    len: size_t,
    name: &'static str,
) -> Result<&'a [u8], ClientError> {
    if ptr.is_null() || len > isize::MAX as usize {
        return Err(ClientError::InvalidArgument(name));
    }
    Ok(unsafe { slice::from_raw_parts(ptr, len) })
}

/// Encapsulates a request to a single encoded key configuration, returning a
/// request handle or 0 on failure.
///
/// # Safety
///
/// `config_ptr` and `msg_ptr` must be valid for reads of `config_len` and
/// `msg_len` bytes respectively.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn encapsulate_request_ffi(
    config_ptr: *const u8,
    config_len: size_t,
    msg_ptr: *const u8,
    msg_len: size_t,
) -> u64 {
    guard(0, || {
        let config = unsafe { borrow_slice(config_ptr, config_len, "config")? };
        let msg = unsafe { borrow_slice(msg_ptr, msg_len, "msg")? };

        let ctx = client::encapsulate_request(config, msg).map_err(ClientError::EncapsulationFailed)?;
        Ok(REQUESTS.insert(ctx))
    })
}

/// Encapsulates a request to the first usable key configuration of an
/// `application/ohttp-keys` list, returning a request handle or 0 on failure.
///
/// # Safety
///
/// `list_ptr` and `msg_ptr` must be valid for reads of `list_len` and
/// `msg_len` bytes respectively.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn encapsulate_request_list_ffi(
    list_ptr: *const u8,
    list_len: size_t,
    msg_ptr: *const u8,
    msg_len: size_t,
) -> u64 {
    guard(0, || {
        let list = unsafe { borrow_slice(list_ptr, list_len, "list")? };
        let msg = unsafe { borrow_slice(msg_ptr, msg_len, "msg")? };

        let ctx = client::encapsulate_request_list(list, msg).map_err(ClientError::EncapsulationFailed)?;
        Ok(REQUESTS.insert(ctx))
    })
}

/// Returns a pointer to the encapsulated request of a request handle, or null
/// if the handle is unknown.
#[unsafe(no_mangle)]
pub extern "C" fn request_context_message_ffi(handle: u64) -> *const u8 {
    guard(ptr::null(), || {
        REQUESTS
            .with(handle, |ctx| ctx.message().as_ptr())
            .ok_or(ClientError::UnknownHandle(handle))
    })
}

/// Returns the size of the encapsulated request of a request handle, or 0 if
/// the handle is unknown.
#[unsafe(no_mangle)]
pub extern "C" fn request_context_message_len_ffi(handle: u64) -> size_t {
    guard(0, || {
        REQUESTS
            .with(handle, |ctx| ctx.message().len())
            .ok_or(ClientError::UnknownHandle(handle))
    })
}

/// Decapsulates a response with a request handle, returning a response handle
/// or 0 on failure. The request handle is consumed in either case.
///
/// # Safety
///
/// `response_ptr` must be valid for reads of `response_len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn decapsulate_response_ffi(
    handle: u64,
    response_ptr: *const u8,
    response_len: size_t,
) -> u64 {
    guard(0, || {
        let mut ctx = REQUESTS
            .remove(handle)
            .ok_or(ClientError::UnknownHandle(handle))?;
        let response = unsafe { borrow_slice(response_ptr, response_len, "response")? };

        let res = ctx
            .decapsulate_response(response)
            .map_err(ClientError::DecapsulationFailed)?;
        Ok(RESPONSES.insert(res))
    })
}

/// Returns a pointer to the decapsulated response of a response handle, or
/// null if the handle is unknown.
#[unsafe(no_mangle)]
pub extern "C" fn response_context_message_ffi(handle: u64) -> *const u8 {
    guard(ptr::null(), || {
        RESPONSES
            .with(handle, |ctx| ctx.plaintext().as_ptr())
            .ok_or(ClientError::UnknownHandle(handle))
    })
}

/// Returns the size of the decapsulated response of a response handle, or 0
/// if the handle is unknown.
#[unsafe(no_mangle)]
pub extern "C" fn response_context_message_len_ffi(handle: u64) -> size_t {
    guard(0, || {
        RESPONSES
            .with(handle, |ctx| ctx.plaintext().len())
            .ok_or(ClientError::UnknownHandle(handle))
    })
}

/// Releases a request handle that will not be used for decapsulation, such as
/// after a failed transport. Releasing a consumed handle stages an error.
#[unsafe(no_mangle)]
pub extern "C" fn release_request_context_ffi(handle: u64) {
    guard((), || {
        REQUESTS
            .remove(handle)
            .map(drop)
            .ok_or(ClientError::UnknownHandle(handle))
    })
}

/// Releases a response handle.
#[unsafe(no_mangle)]
pub extern "C" fn release_response_context_ffi(handle: u64) {
    guard((), || {
        RESPONSES
            .remove(handle)
            .map(drop)
            .ok_or(ClientError::UnknownHandle(handle))
    })
}
