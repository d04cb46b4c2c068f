// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Process-wide registries mapping opaque integer handles to contexts owned
//! on the Rust side of the C boundary.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

// Handles are drawn from a single counter shared by all registries, so a
// handle is never reused and never valid in two registries at once. Zero is
// reserved for failure.
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Registry owns boundary contexts of one kind, keyed by handle.
pub struct Registry<T> {
    entries: Mutex<BTreeMap<u64, T>>,
}

impl<T> Registry<T> {
    pub const fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    // lock acquires the entries. A panic while the lock was held can only have
    // come from a finished map operation, so a poisoned map is still usable.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<u64, T>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// insert takes ownership of a context and returns its new handle.
    pub fn insert(&self, value: T) -> u64 {
        let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(handle, value);
        handle
    }

    /// remove releases ownership of a context back to the caller.
    pub fn remove(&self, handle: u64) -> Option<T> {
        self.lock().remove(&handle)
    }

    /// with runs a closure over a registered context.
    pub fn with<R>(&self, handle: u64, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.lock().get(&handle).map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests that handles are non-zero, distinct across registries, and dead
    // once removed.
    #[test]
    fn test_registry_handles() {
        let a: Registry<&str> = Registry::new();
        let b: Registry<&str> = Registry::new();

        let ha = a.insert("a");
        let hb = b.insert("b");
        assert_ne!(ha, 0);
        assert_ne!(ha, hb);

        assert_eq!(a.with(ha, |v| *v), Some("a"));
        assert_eq!(a.with(hb, |v| *v), None);

        assert_eq!(a.remove(ha), Some("a"));
        assert_eq!(a.remove(ha), None);
        assert_eq!(a.with(ha, |v| *v), None);

        let hc = a.insert("c");
        assert!(hc > hb, "handles must not be reused");
    }
}
