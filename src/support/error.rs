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

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("SQLite backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("Status store still busy after {attempts} attempts")]
    Busy { attempts: u32 },
    #[error("UID {0} has not been assigned by the server")]
    UnassignedUid(i64),
    #[error("No such message in the status cache")]
    NxMessage,
    #[error("Status store already closed")]
    StoreClosed,
    /// SQLite abandoned the open deferred transaction on its own, discarding
    /// every change since the last save.
    #[error("Uncommitted status changes were rolled back")]
    TransactionLost,
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// Whether this is a transient locking conflict which is worth retrying.
    pub fn is_busy(&self) -> bool {
        match *self {
            Error::Sqlite(ref e) => is_busy(e),
            _ => false,
        }
    }
}

/// Whether `e` reports `SQLITE_BUSY` or `SQLITE_LOCKED`.
pub fn is_busy(e: &rusqlite::Error) -> bool {
    matches!(
        e.sqlite_error_code(),
        Some(rusqlite::ErrorCode::DatabaseBusy)
            | Some(rusqlite::ErrorCode::DatabaseLocked)
    )
}

/// Whether `e` indicates that the file is not a usable SQLite database.
pub fn is_corrupt(e: &rusqlite::Error) -> bool {
    matches!(
        e.sqlite_error_code(),
        Some(rusqlite::ErrorCode::NotADatabase)
            | Some(rusqlite::ErrorCode::DatabaseCorrupt)
    )
}
