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

//! Capability probe for the SQLite backend.
//!
//! The probe runs once per process. Its result is cached, so a broken backend
//! is reported with the same reason to every store that tries to open.

use lazy_static::lazy_static;
use log::{debug, error};

use crate::support::error::Error;

/// 3.6.8 introduced `SAVEPOINT`, which deferred-commit stores depend on.
const MIN_SQLITE_VERSION: i32 = 3_006_008;

lazy_static! {
    static ref PROBE_RESULT: Result<(), String> = run_probe();
}

/// Verifies that a usable SQLite backend is linked in.
///
/// Fails with `Error::BackendUnavailable` otherwise.
pub fn probe() -> Result<(), Error> {
    PROBE_RESULT
        .clone()
        .map_err(Error::BackendUnavailable)
}

fn run_probe() -> Result<(), String> {
    let version = rusqlite::version_number();
    if version < MIN_SQLITE_VERSION {
        let message = format!(
            "SQLite {} is linked, but at least 3.6.8 is required",
            rusqlite::version(),
        );
        error!("{}", message);
        return Err(message);
    }

    rusqlite::Connection::open_in_memory()
        .and_then(|cxn| {
            cxn.query_row("SELECT 1", (), |row| row.get::<_, i64>(0))
        })
        .map_err(|e| {
            let message = format!("SQLite cannot open a connection: {e}");
            error!("{}", message);
            message
        })?;

    debug!("Using SQLite {}", rusqlite::version());
    Ok(())
}
