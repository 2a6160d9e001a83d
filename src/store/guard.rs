//-
// Copyright (c) 2023, Jason Lingle
//
// This file is part of Localstatus.
//
// Localstatus is free software: you can  redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Localstatus is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along with
// Localstatus. If not, see <http://www.gnu.org/licenses/>.

//! Single-flight locking of per-store maintenance.
//!
//! Checking and (re)creating a store's schema must never run twice at once
//! for the same file, since two racing creators could each decide the file is
//! missing and rebuild it. Every such sequence runs inside
//! `with_store_lock`, which serialises callers that name the same store and
//! lets callers on different stores proceed independently.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use lazy_static::lazy_static;

lazy_static! {
    /// The lock of every store which currently has a holder or waiter.
    static ref STORE_LOCKS: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>> =
        Mutex::new(HashMap::new());
}

/// Runs `f` while holding the lock for the store at `path`.
pub fn with_store_lock<R>(path: &Path, f: impl FnOnce() -> R) -> R {
    let key = normalise(path);
    let lock = STORE_LOCKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(key.clone())
        .or_default()
        .clone();

    let result = {
        // A panic in some earlier holder leaves nothing to clean up; the
        // schema check is idempotent.
        let _held = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    };

    let mut locks = STORE_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    drop(lock);
    // Only the registry's own reference remains once nobody else is waiting.
    if locks.get(&key).map_or(false, |l| 1 == Arc::strong_count(l)) {
        locks.remove(&key);
    }

    result
}

/// Maps `path` to a key that is the same for every spelling of the same file
/// (as far as can be told without the file necessarily existing).
fn normalise(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_owned()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_owned())
    };

    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or(absolute),
        _ => absolute,
    }
}
