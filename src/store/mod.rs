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

//! The durable side of the status cache.
//!
//! Each mailbox has one SQLite file holding a `metadata` table (for the schema
//! version) and a `status` table mapping UIDs to encoded flag strings. The
//! general guidelines for this layer are:
//!
//! 1. Every operation is atomic.
//! 2. The concept of a database transaction does not escape this layer,
//!    except through the explicit `save()` of a deferred-commit store.
//! 3. Transient locking conflicts are retried here and never reach callers
//!    unless the configured retry budget runs out.

pub mod backend;
pub mod durable;
pub mod flags;
pub mod guard;
mod retry;
pub mod schema;
pub mod types;

use std::path::Path;

use crate::support::system_config::PersistenceConfig;

/// Opens a fresh connection to the store at `path`, creating the file if
/// needed.
fn connect(
    path: &Path,
    config: &PersistenceConfig,
) -> rusqlite::Result<rusqlite::Connection> {
    let cxn = rusqlite::Connection::open_with_flags(
        path,
        rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
            | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
            | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    cxn.busy_timeout(config.busy_timeout())?;
    Ok(cxn)
}
