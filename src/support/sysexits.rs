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

//! Exit codes from `sysexits.h`, used by the maintenance binary.

use super::error::Error;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Sysexit(pub i32);

pub const EX_USAGE: Sysexit = Sysexit(64);
pub const EX_DATAERR: Sysexit = Sysexit(65);
pub const EX_UNAVAILABLE: Sysexit = Sysexit(69);
pub const EX_SOFTWARE: Sysexit = Sysexit(70);
pub const EX_CANTCREAT: Sysexit = Sysexit(73);
pub const EX_IOERR: Sysexit = Sysexit(74);
pub const EX_TEMPFAIL: Sysexit = Sysexit(75);
pub const EX_CONFIG: Sysexit = Sysexit(78);

impl Sysexit {
    pub fn exit(self) -> ! {
        std::process::exit(self.0)
    }

    /// The exit code that best describes `e`.
    pub fn for_error(e: &Error) -> Self {
        match *e {
            Error::BackendUnavailable(_) => EX_UNAVAILABLE,
            Error::Busy { .. } => EX_TEMPFAIL,
            Error::UnassignedUid(_) | Error::NxMessage => EX_DATAERR,
            Error::StoreClosed => EX_SOFTWARE,
            Error::Sqlite(rusqlite::Error::SqliteFailure(ref f, _))
                if rusqlite::ErrorCode::CannotOpen == f.code =>
            {
                EX_CANTCREAT
            },
            Error::Sqlite(_) | Error::Io(_) | Error::TransactionLost => {
                EX_IOERR
            },
            Error::Config(_) => EX_CONFIG,
        }
    }
}
