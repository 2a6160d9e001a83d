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

//! Validation, creation, and migration of the on-disk schema.

use std::fs;
use std::io;
use std::path::Path;

use log::info;
use rusqlite::OptionalExtension as _;

use super::{backend, connect, guard, retry::retry_busy, types::*};
use crate::support::{
    error::{self, Error},
    log_prefix::LogPrefix,
    system_config::StatusConfig,
    ui::Ui,
};

static SCHEMA_V1: &str = include_str!("status.v1.sql");

/// Transforms applied to move an existing store forward. Entry `n - 1` takes
/// a version `n` store to version `n + 1`.
const MIGRATIONS: &[&str] = &[];

/// The schema version written by this build.
pub const DB_VERSION: u32 = 1 + MIGRATIONS.len() as u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// The store already had the current schema.
    Current,
    /// The store was missing, unreadable, or of an unrecognised version, and
    /// has been created from scratch. Any prior content is gone.
    Created,
    /// The store had an older schema and was brought up to date.
    Migrated { from: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchemaHandle {
    /// The schema version the store now has.
    pub version: u32,
    pub outcome: SchemaOutcome,
}

/// Ensures the store at `path` exists and has the current schema.
///
/// If the store has to be (re)created, `ui` receives exactly one warning.
/// Concurrent calls for the same path are serialised, so only one of them
/// can ever do the creation.
pub fn validate_or_create(
    path: &Path,
    log_prefix: &LogPrefix,
    ui: &dyn Ui,
    config: &StatusConfig,
) -> Result<SchemaHandle, Error> {
    backend::probe()?;
    guard::with_store_lock(path, || {
        SchemaCheck {
            path,
            log_prefix,
            config,
            migrations: MIGRATIONS,
        }
        .run(ui)
    })
}

struct SchemaCheck<'a> {
    path: &'a Path,
    log_prefix: &'a LogPrefix,
    config: &'a StatusConfig,
    migrations: &'a [&'a str],
}

impl SchemaCheck<'_> {
    fn latest(&self) -> u32 {
        1 + self.migrations.len() as u32
    }

    fn run(&self, ui: &dyn Ui) -> Result<SchemaHandle, Error> {
        let latest = self.latest();
        let found = match self.retry("schema check", || self.read_version()) {
            Ok(found) => found,
            Err(Error::Sqlite(e)) => {
                info!("{} Status db unreadable: {}", self.log_prefix, e);
                None
            },
            Err(e) => return Err(e),
        };

        match found.as_deref().map(str::parse::<u32>) {
            Some(Ok(version)) if version == latest => Ok(SchemaHandle {
                version,
                outcome: SchemaOutcome::Current,
            }),

            Some(Ok(version)) if version >= 1 && version < latest => {
                self.migrate(version)?;
                Ok(SchemaHandle {
                    version: latest,
                    outcome: SchemaOutcome::Migrated { from: version },
                })
            },

            Some(_) => {
                info!(
                    "{} Status db has unrecognised version {:?}",
                    self.log_prefix, found,
                );
                self.recreate(ui)
            },

            None => self.recreate(ui),
        }
    }

    fn retry<T>(
        &self,
        what: &str,
        f: impl FnMut() -> Result<T, Error>,
    ) -> Result<T, Error> {
        retry_busy(self.log_prefix, &self.config.retry.policy(), what, f)
    }

    fn read_version(&self) -> Result<Option<String>, Error> {
        let cxn = connect(self.path, &self.config.persistence)?;
        cxn.query_row(
            "SELECT value FROM metadata WHERE key = 'db_version'",
            (),
            from_single::<Option<String>>,
        )
        .optional()
        .map(Option::flatten)
        .map_err(Into::into)
    }

    fn recreate(&self, ui: &dyn Ui) -> Result<SchemaHandle, Error> {
        ui.warn(&format!(
            "Creating new local status db for {}",
            self.log_prefix,
        ));

        match self.retry("schema creation", || self.create()) {
            Err(Error::Sqlite(ref e)) if error::is_corrupt(e) => {
                info!(
                    "{} Discarding corrupt status db {}",
                    self.log_prefix,
                    self.path.display(),
                );
                remove_store_files(self.path)?;
                self.retry("schema creation", || self.create())?;
            },
            result => result?,
        }

        Ok(SchemaHandle {
            version: self.latest(),
            outcome: SchemaOutcome::Created,
        })
    }

    fn create(&self) -> Result<(), Error> {
        let mut cxn = connect(self.path, &self.config.persistence)?;
        let txn = cxn.transaction_with_behavior(
            rusqlite::TransactionBehavior::Exclusive,
        )?;
        txn.execute_batch(
            "DROP TABLE IF EXISTS metadata; DROP TABLE IF EXISTS status;",
        )?;
        txn.execute_batch(SCHEMA_V1)?;
        for migration in self.migrations {
            txn.execute_batch(migration)?;
        }
        set_version(&txn, self.latest())?;
        txn.commit()?;
        Ok(())
    }

    fn migrate(&self, from: u32) -> Result<(), Error> {
        self.retry("migration", || {
            let mut cxn = connect(self.path, &self.config.persistence)?;
            let txn = cxn.transaction_with_behavior(
                rusqlite::TransactionBehavior::Exclusive,
            )?;

            for (version, migration) in self
                .migrations
                .iter()
                .copied()
                .enumerate()
                .map(|(ix, migration)| (ix as u32 + 2, migration))
                .skip(from as usize - 1)
            {
                info!(
                    "{} Applying #{} migration to status db",
                    self.log_prefix, version,
                );
                txn.execute_batch(migration)?;
            }

            set_version(&txn, self.latest())?;
            txn.commit()?;
            Ok(())
        })
    }
}

fn set_version(
    cxn: &rusqlite::Connection,
    version: u32,
) -> rusqlite::Result<()> {
    cxn.execute(
        "UPDATE metadata SET value = ? WHERE key = 'db_version'",
        (version.to_string(),),
    )?;
    Ok(())
}

/// Removes the store at `path` along with any journal SQLite left next to it.
fn remove_store_files(path: &Path) -> io::Result<()> {
    for suffix in &["", "-journal", "-wal", "-shm"] {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        match fs::remove_file(&name) {
            Err(e) if io::ErrorKind::NotFound == e.kind() => (),
            result => result?,
        }
    }

    Ok(())
}
