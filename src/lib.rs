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

//! The local status cache of a mail synchronisation tool.
//!
//! For each mailbox, the status cache records which messages (by UID) exist
//! locally and which single-character flags each one carries. It is the
//! record of "what we last knew about this mailbox" against which remote
//! changes are computed.
//!
//! The status lives in a small SQLite database per mailbox and is mirrored in
//! memory by `StatusCache`, which serves all reads and keeps the database
//! identical to memory on every write. Writes either commit immediately or
//! accumulate until `save()`, depending on the configured
//! `PersistenceStrategy`.

#[cfg(test)]
macro_rules! assert_matches {
    ($expected:pat, $actual:expr) => {
        match $actual {
            $expected => (),
            unexpected => panic!(
                "Expected {} matches {}, got {:?}",
                stringify!($expected),
                stringify!($actual),
                unexpected
            ),
        }
    };
}

pub mod status;
pub mod store;
pub mod support;

pub use crate::status::StatusCache;
pub use crate::store::{
    flags::FlagSet,
    schema::{SchemaHandle, SchemaOutcome, DB_VERSION},
    types::{MessageRecord, Uid, UnixTimestamp},
};
pub use crate::support::{
    error::Error,
    log_prefix::LogPrefix,
    system_config::{PersistenceStrategy, StatusConfig},
    ui::{LogUi, Ui},
};
