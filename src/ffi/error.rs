// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Diagnostics channel of the C boundary: a per-thread last error, staged by
//! failing calls and drained by the caller.

use std::any::Any;
use std::cell::RefCell;
use std::error::Error as StdError;
use std::os::raw::{c_char, c_int};
use std::slice;
use std::sync::Once;

/// ClientError is a failure of a boundary call, wrapping the library error
/// with the operation that produced it.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to encapsulate request")]
    EncapsulationFailed(#[source] crate::Error),
    #[error("failed to decapsulate response")]
    DecapsulationFailed(#[source] crate::Error),
    #[error("invalid argument `{0}` passed")]
    InvalidArgument(&'static str),
    #[error("unknown handle {0}, released or already consumed")]
    UnknownHandle(u64),
    #[error("panic unwound at the boundary: {0}")]
    Panic(String),
}

impl ClientError {
    /// from_panic converts a caught panic payload into an error.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        ClientError::Panic(msg)
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

// render flattens an error and its causes into a single line.
fn render(err: &dyn StdError) -> String {
    let mut msg = err.to_string();
    let mut cause = err.source();
    while let Some(parent) = cause {
        msg.push_str(": ");
        msg.push_str(&parent.to_string());
        cause = parent.source();
    }
    msg
}

/// update_last_error stages an error for the calling thread, replacing any
/// previous one, and logs it with its cause chain.
pub(crate) fn update_last_error(err: ClientError) {
    let msg = render(&err);
    log::warn!("{msg}");

    LAST_ERROR.with(|prev| *prev.borrow_mut() = Some(msg));
}

/// Returns the number of bytes in the last error message of the calling
/// thread, without the trailing NUL terminator, or 0 if none is staged.
///
/// Errors are sticky: a later successful call does not clear a staged error,
/// and a later failing call replaces it. Only a successful
/// [`last_error_message`] drains it, so a non-zero length does not mean the
/// most recent call failed. Check the call's own return value first.
#[unsafe(no_mangle)]
pub extern "C" fn last_error_length() -> c_int {
    LAST_ERROR.with(|prev| match prev.borrow().as_ref() {
        Some(msg) => c_int::try_from(msg.len()).unwrap_or(c_int::MAX),
        None => 0,
    })
}

/// Writes the last error message of the calling thread into the buffer as a
/// NUL terminated UTF-8 string, and clears it.
///
/// Returns the number of bytes written without the terminator, 0 if no error
/// is staged, or -1 if the buffer is null or too small. A buffer too small
/// leaves the error staged, so the call can be retried with a larger one.
///
/// # Safety
///
/// `buffer` must be null or valid for writes of `length` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn last_error_message(buffer: *mut c_char, length: c_int) -> c_int {
    if buffer.is_null() {
        log::warn!("null buffer passed to last_error_message");
        return -1;
    }
    let Ok(length) = usize::try_from(length) else {
        log::warn!("negative length passed to last_error_message");
        return -1;
    };
    LAST_ERROR.with(|prev| {
        let mut prev = prev.borrow_mut();
        let Some(msg) = prev.as_ref() else {
            return 0;
        };
        if msg.len() >= length {
            log::warn!(
                "last error buffer too small: have {} bytes, want {}",
                length,
                msg.len() + 1
            );
            return -1;
        }
        let buffer = unsafe { slice::from_raw_parts_mut(buffer as *mut u8, length) };
        buffer[..msg.len()].copy_from_slice(msg.as_bytes());
        buffer[msg.len()] = 0;

        let written = msg.len() as c_int;
        *prev = None;
        written
    })
}

/// Installs a logger writing boundary diagnostics to stderr, filtered by the
/// `RUST_LOG` environment variable and defaulting to warnings. Calling it more
/// than once, or after the host installed its own logger, has no effect.
#[unsafe(no_mangle)]
pub extern "C" fn initialize_diagnostics() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let env = env_logger::Env::default().default_filter_or("warn");
        let _ = env_logger::Builder::from_env(env).try_init();
    });
}
