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

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, error, info};

use super::{connect, flags::FlagSet, retry::retry_busy, types::*};
use crate::support::{
    error::Error,
    log_prefix::LogPrefix,
    system_config::{
        PersistenceConfig, PersistenceStrategy, RetryPolicy, StatusConfig,
    },
};

/// The persistence boundary of one mailbox's status.
///
/// The store assumes the schema has already been validated (see
/// `schema::validate_or_create`).
///
/// Under `WriteThrough`, every operation runs on a fresh connection and
/// commits before returning. Under `Deferred`, one connection is held for the
/// lifetime of the store; writes accumulate in a single transaction until
/// `save()`, and each individual operation is wrapped in a savepoint so that
/// it is still all-or-nothing. The connection sits behind a mutex since a
/// SQLite connection must not be used from two threads at once.
pub struct DurableStore {
    path: PathBuf,
    log_prefix: LogPrefix,
    persistence: PersistenceConfig,
    retry: RetryPolicy,
    state: Mutex<State>,
}

enum State {
    WriteThrough,
    Deferred {
        cxn: rusqlite::Connection,
        /// Whether a transaction was opened after the last commit. If this is
        /// set but SQLite reports autocommit mode, SQLite rolled the
        /// transaction back by itself.
        pending: bool,
    },
    Closed,
}

impl DurableStore {
    pub fn open(
        path: PathBuf,
        log_prefix: LogPrefix,
        config: &StatusConfig,
    ) -> Result<Self, Error> {
        let state = match config.persistence.strategy {
            PersistenceStrategy::WriteThrough => State::WriteThrough,
            PersistenceStrategy::Deferred => State::Deferred {
                cxn: connect(&path, &config.persistence)?,
                pending: false,
            },
        };

        info!(
            "{log_prefix} Opened status db {} with {:?} persistence",
            path.display(),
            config.persistence.strategy,
        );

        Ok(Self {
            path,
            log_prefix,
            persistence: config.persistence.clone(),
            retry: config.retry.policy(),
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn strategy(&self) -> PersistenceStrategy {
        self.persistence.strategy
    }

    /// Adds a row for `uid`.
    ///
    /// Fails if `uid` has not been assigned by the server, or if a row for
    /// `uid` already exists.
    pub fn insert(&self, uid: Uid, flags: &FlagSet) -> Result<(), Error> {
        if !uid.is_assigned() {
            return Err(Error::UnassignedUid(uid.0));
        }

        debug!("{} Insert {} flags={}", self.log_prefix, uid, flags);
        self.write("insert", |cxn| {
            cxn.prepare_cached("INSERT INTO status (id, flags) VALUES (?, ?)")?
                .execute((uid, flags))?;
            Ok(())
        })
    }

    /// Replaces the flags of `uid`. Does nothing if there is no such row.
    pub fn update_flags(&self, uid: Uid, flags: &FlagSet) -> Result<(), Error> {
        debug!("{} Update {} flags={}", self.log_prefix, uid, flags);
        self.write("flag update", |cxn| {
            cxn.prepare_cached("UPDATE status SET flags = ? WHERE id = ?")?
                .execute((flags, uid))?;
            Ok(())
        })
    }

    pub fn delete_one(&self, uid: Uid) -> Result<(), Error> {
        self.delete_many(&[uid])
    }

    /// Deletes every row in `uids` as one unit of work.
    pub fn delete_many(&self, uids: &[Uid]) -> Result<(), Error> {
        debug!("{} Delete {} message(s)", self.log_prefix, uids.len());
        self.write("delete", |cxn| {
            let mut stmt =
                cxn.prepare_cached("DELETE FROM status WHERE id = ?")?;
            for &uid in uids {
                stmt.execute((uid,))?;
            }
            Ok(())
        })
    }

    /// Deletes every row.
    pub fn delete_all(&self) -> Result<(), Error> {
        info!("{} Clearing status db", self.log_prefix);
        self.write("purge", |cxn| {
            cxn.execute("DELETE FROM status", ())?;
            Ok(())
        })
    }

    /// Reads every row, in no particular order.
    pub fn load_all(&self) -> Result<Vec<(Uid, FlagSet)>, Error> {
        self.read("load", |cxn| {
            cxn.prepare_cached("SELECT id, flags FROM status")?
                .query_map((), from_row::<(Uid, FlagSet)>)?
                .collect::<Result<Vec<_>, _>>()
        })
    }

    pub fn count(&self) -> Result<usize, Error> {
        self.read("count", |cxn| {
            cxn.query_row("SELECT COUNT(*) FROM status", (), from_single::<i64>)
        })
        .map(|count| count as usize)
    }

    pub fn exists(&self, uid: Uid) -> Result<bool, Error> {
        self.read("lookup", |cxn| {
            cxn.prepare_cached("SELECT 1 FROM status WHERE id = ?")?
                .exists((uid,))
        })
    }

    /// Makes every write so far durable.
    ///
    /// This is a no-op for write-through stores and for closed stores.
    ///
    /// Fails with `Error::TransactionLost` if SQLite already discarded the
    /// writes this would have committed.
    pub fn save(&self) -> Result<(), Error> {
        retry_busy(&self.log_prefix, &self.retry, "commit", || {
            let mut state = self.lock_state();
            if let State::Deferred {
                ref cxn,
                ref mut pending,
            } = *state
            {
                self.check_pending(cxn, pending)?;
                if !cxn.is_autocommit() {
                    debug!("{} Committing deferred writes", self.log_prefix);
                    if let Err(e) = cxn.execute_batch("COMMIT") {
                        self.check_pending(cxn, pending)?;
                        return Err(e.into());
                    }
                }
                *pending = false;
            }
            Ok(())
        })
    }

    /// Saves and releases the underlying connection.
    ///
    /// Calling this more than once is harmless. If the save fails, the store
    /// stays open so the caller can try again.
    pub fn close(&self) -> Result<(), Error> {
        self.save()?;
        let mut state = self.lock_state();
        if !matches!(*state, State::Closed) {
            debug!("{} Closing status db", self.log_prefix);
            *state = State::Closed;
        }
        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fails with `Error::TransactionLost` if the deferred transaction that
    /// `pending` records is gone, clearing `pending` so that later writes
    /// can start over.
    fn check_pending(
        &self,
        cxn: &rusqlite::Connection,
        pending: &mut bool,
    ) -> Result<(), Error> {
        if *pending && cxn.is_autocommit() {
            *pending = false;
            error!(
                "{} SQLite rolled back uncommitted status changes",
                self.log_prefix
            );
            return Err(Error::TransactionLost);
        }

        Ok(())
    }

    /// Rolls back the deferred transaction behind the store's back, the way
    /// SQLite does after some I/O errors.
    #[cfg(test)]
    pub(crate) fn abort_transaction(&self) {
        if let State::Deferred { ref cxn, .. } = *self.lock_state() {
            cxn.execute_batch("ROLLBACK").unwrap();
        }
    }

    fn write<T>(
        &self,
        what: &str,
        mut op: impl FnMut(&rusqlite::Connection) -> rusqlite::Result<T>,
    ) -> Result<T, Error> {
        retry_busy(&self.log_prefix, &self.retry, what, || {
            let mut state = self.lock_state();
            match *state {
                State::Closed => return Err(Error::StoreClosed),
                State::Deferred {
                    ref mut cxn,
                    ref mut pending,
                } => {
                    self.check_pending(cxn, pending)?;
                    if cxn.is_autocommit() {
                        // Take the write lock now rather than on the first
                        // write, so a busy store is reported here where it can
                        // be retried cleanly.
                        cxn.execute_batch("BEGIN IMMEDIATE")?;
                        *pending = true;
                    }

                    let sp = cxn.savepoint()?;
                    let result = match op(&*sp) {
                        Ok(result) => sp.commit().map(|()| result),
                        Err(e) => {
                            drop(sp);
                            Err(e)
                        },
                    };
                    if result.is_err() {
                        // Some failures make SQLite abandon the whole
                        // transaction, not just this savepoint.
                        self.check_pending(cxn, pending)?;
                    }
                    return result.map_err(Into::into);
                },
                State::WriteThrough => (),
            }
            drop(state);

            let mut cxn = connect(&self.path, &self.persistence)?;
            let txn = cxn.transaction_with_behavior(
                rusqlite::TransactionBehavior::Immediate,
            )?;
            let result = op(&*txn)?;
            txn.commit()?;
            Ok(result)
        })
    }

    fn read<T>(
        &self,
        what: &str,
        mut op: impl FnMut(&rusqlite::Connection) -> rusqlite::Result<T>,
    ) -> Result<T, Error> {
        retry_busy(&self.log_prefix, &self.retry, what, || {
            let state = self.lock_state();
            match *state {
                State::Closed => return Err(Error::StoreClosed),
                // Reads must go through the shared connection to see
                // uncommitted writes.
                State::Deferred { ref cxn, .. } => {
                    return op(cxn).map_err(Into::into)
                },
                State::WriteThrough => (),
            }
            drop(state);

            let cxn = connect(&self.path, &self.persistence)?;
            op(&cxn).map_err(Into::into)
        })
    }
}

impl Drop for DurableStore {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("{} Failed to save status db: {}", self.log_prefix, e);
        }
    }
}
