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

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, error, info};

use crate::store::{
    durable::DurableStore,
    flags::FlagSet,
    schema::{self, SchemaHandle},
    types::*,
};
use crate::support::{
    error::Error,
    log_prefix::LogPrefix,
    system_config::{PersistenceStrategy, StatusConfig},
    ui::{LogUi, Ui},
};

/// The in-memory status of one mailbox, kept identical to its durable store.
///
/// All reads are served from memory. Every mutation holds the write lock on
/// the in-memory map across the corresponding store operation, and only
/// touches the map once the store has accepted the change, so no reader can
/// observe a state the store does not also hold.
///
/// A `StatusCache` is `Send + Sync` and can be shared between threads.
pub struct StatusCache {
    log_prefix: LogPrefix,
    schema: SchemaHandle,
    store: DurableStore,
    messages: RwLock<HashMap<Uid, MessageRecord>>,
    loaded_empty: AtomicBool,
}

impl StatusCache {
    /// Opens the status store at `path`, creating or rebuilding it if needed,
    /// and loads its content.
    ///
    /// If the store had to be created, `ui` is warned exactly once.
    pub fn open(
        path: &Path,
        log_prefix: LogPrefix,
        config: &StatusConfig,
        ui: &dyn Ui,
    ) -> Result<Self, Error> {
        let schema = schema::validate_or_create(path, &log_prefix, ui, config)?;
        let store =
            DurableStore::open(path.to_owned(), log_prefix.clone(), config)?;

        let this = Self {
            log_prefix,
            schema,
            store,
            messages: RwLock::new(HashMap::new()),
            loaded_empty: AtomicBool::new(true),
        };
        this.load()?;
        Ok(this)
    }

    /// Opens the store with the default configuration, sending warnings to
    /// the log.
    pub fn open_default(
        path: impl Into<PathBuf>,
        repository: &str,
        mailbox: &str,
    ) -> Result<Self, Error> {
        Self::open(
            &path.into(),
            LogPrefix::new(repository.to_owned(), mailbox.to_owned()),
            &StatusConfig::default(),
            &LogUi,
        )
    }

    /// Replaces the in-memory status with the full content of the store.
    pub fn load(&self) -> Result<(), Error> {
        let mut messages = self.write_messages();
        self.reload_locked(&mut messages)?;
        self.loaded_empty
            .store(messages.is_empty(), Ordering::Release);
        Ok(())
    }

    /// Replaces `messages`, which must be the map behind the held write lock,
    /// with the content of the store.
    fn reload_locked(
        &self,
        messages: &mut HashMap<Uid, MessageRecord>,
    ) -> Result<(), Error> {
        let rows = self.store.load_all()?;
        *messages = rows
            .into_iter()
            .map(|(uid, flags)| {
                (
                    uid,
                    MessageRecord {
                        uid,
                        flags,
                        rtime: None,
                    },
                )
            })
            .collect();

        info!("{} Loaded {} message(s)", self.log_prefix, messages.len());
        Ok(())
    }

    /// Passes `result` of a store call through, first resynchronising
    /// `messages` with the store if the call revealed that uncommitted writes
    /// were lost.
    fn resync<T>(
        &self,
        messages: &mut HashMap<Uid, MessageRecord>,
        result: Result<T, Error>,
    ) -> Result<T, Error> {
        if let Err(Error::TransactionLost) = result {
            if let Err(e) = self.reload_locked(messages) {
                error!(
                    "{} Failed to reload status after lost changes: {}",
                    self.log_prefix, e
                );
            }
        }

        result
    }

    /// The live view of every known message.
    ///
    /// Mutations, `save()`, and `close()` block while the returned guard is
    /// held.
    pub fn messages(
        &self,
    ) -> RwLockReadGuard<'_, HashMap<Uid, MessageRecord>> {
        self.messages.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_messages(
        &self,
    ) -> RwLockWriteGuard<'_, HashMap<Uid, MessageRecord>> {
        self.messages.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a message with the given flags.
    ///
    /// If `uid` has not been assigned by the server, nothing is recorded and
    /// `uid` is returned as-is. If the message is already known, this just
    /// replaces its flags (and leaves its receipt time alone).
    pub fn save_message(
        &self,
        uid: Uid,
        flags: FlagSet,
        rtime: Option<UnixTimestamp>,
    ) -> Result<Uid, Error> {
        if !uid.is_assigned() {
            debug!("{} Not saving unassigned UID {}", self.log_prefix, uid);
            return Ok(uid);
        }

        let mut messages = self.write_messages();
        if messages.contains_key(&uid) {
            self.save_flags_locked(&mut messages, uid, flags)?;
            return Ok(uid);
        }

        let result = self.store.insert(uid, &flags);
        self.resync(&mut messages, result)?;
        messages.insert(uid, MessageRecord { uid, flags, rtime });
        Ok(uid)
    }

    /// Replaces the flags of a known message.
    ///
    /// Fails with `Error::NxMessage` if `uid` is not in the cache.
    pub fn save_flags(&self, uid: Uid, flags: FlagSet) -> Result<(), Error> {
        let mut messages = self.write_messages();
        self.save_flags_locked(&mut messages, uid, flags)
    }

    fn save_flags_locked(
        &self,
        messages: &mut HashMap<Uid, MessageRecord>,
        uid: Uid,
        flags: FlagSet,
    ) -> Result<(), Error> {
        match messages.get(&uid) {
            None => return Err(Error::NxMessage),
            Some(record) if record.flags == flags => return Ok(()),
            Some(_) => (),
        }

        let result = self.store.update_flags(uid, &flags);
        self.resync(messages, result)?;
        if let Some(record) = messages.get_mut(&uid) {
            record.flags = flags;
        }
        Ok(())
    }

    /// Forgets every message in `uids`.
    ///
    /// UIDs that aren't in the cache are ignored. If none of them are, the
    /// store is not touched at all.
    pub fn delete_messages(&self, uids: &[Uid]) -> Result<(), Error> {
        let mut messages = self.write_messages();
        let mut present = uids
            .iter()
            .copied()
            .filter(|uid| messages.contains_key(uid))
            .collect::<Vec<_>>();
        present.sort_unstable();
        present.dedup();

        if present.is_empty() {
            return Ok(());
        }

        let result = self.store.delete_many(&present);
        self.resync(&mut messages, result)?;
        for uid in present {
            messages.remove(&uid);
        }
        Ok(())
    }

    /// Forgets every message, in memory and in the store.
    pub fn purge(&self) -> Result<(), Error> {
        let mut messages = self.write_messages();
        let result = self.store.delete_all();
        self.resync(&mut messages, result)?;
        messages.clear();
        Ok(())
    }

    pub fn message_count(&self) -> usize {
        self.messages().len()
    }

    /// Every known UID, in no particular order.
    pub fn uid_list(&self) -> Vec<Uid> {
        self.messages().keys().copied().collect()
    }

    pub fn uid_exists(&self, uid: Uid) -> bool {
        self.messages().contains_key(&uid)
    }

    /// The flags of `uid`, which must be in the cache.
    pub fn message_flags(&self, uid: Uid) -> Result<FlagSet, Error> {
        self.messages()
            .get(&uid)
            .map(|record| record.flags.clone())
            .ok_or(Error::NxMessage)
    }

    /// The receipt time of `uid`, which must be in the cache.
    ///
    /// This is `None` for messages that were loaded from the store rather
    /// than saved during this session.
    pub fn message_time(
        &self,
        uid: Uid,
    ) -> Result<Option<UnixTimestamp>, Error> {
        self.messages()
            .get(&uid)
            .map(|record| record.rtime)
            .ok_or(Error::NxMessage)
    }

    /// Whether the store held no messages at all when it was last loaded.
    ///
    /// This distinguishes a freshly created local status from one that merely
    /// became empty during this session.
    pub fn is_new_mailbox(&self) -> bool {
        self.loaded_empty.load(Ordering::Acquire)
    }

    /// The schema state found when the store was opened.
    pub fn schema(&self) -> SchemaHandle {
        self.schema
    }

    pub fn strategy(&self) -> PersistenceStrategy {
        self.store.strategy()
    }

    /// Makes every change so far durable. A no-op for write-through stores.
    ///
    /// If this fails with `Error::TransactionLost`, the cache has already
    /// been reset to what the store actually holds.
    pub fn save(&self) -> Result<(), Error> {
        let mut messages = self.write_messages();
        let result = self.store.save();
        self.resync(&mut messages, result)
    }

    /// Saves and releases the store. Calling this more than once is harmless.
    pub fn close(&self) -> Result<(), Error> {
        let mut messages = self.write_messages();
        let result = self.store.close();
        self.resync(&mut messages, result)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::thread;

    use proptest::prelude::*;
    use tempfile::TempDir;

    use super::*;
    use crate::store::schema::SchemaOutcome;
    use crate::support::ui::RecordingUi;

    struct Fixture {
        cache: StatusCache,
        ui: RecordingUi,
        config: StatusConfig,
        tmpdir: TempDir,
    }

    impl Fixture {
        fn new(strategy: PersistenceStrategy) -> Self {
            let tmpdir = TempDir::new().unwrap();
            let mut config = StatusConfig::default();
            config.persistence.strategy = strategy;
            let ui = RecordingUi::default();
            let cache = open(&tmpdir, &config, &ui);
            Self {
                cache,
                ui,
                config,
                tmpdir,
            }
        }

        fn reopen(&mut self) {
            self.cache.close().unwrap();
            self.cache = open(&self.tmpdir, &self.config, &self.ui);
        }

        fn assert_consistent(&self) {
            assert_consistent(&self.cache);
        }
    }

    /// Asserts that `cache` matches a full reload from its store.
    fn assert_consistent(cache: &StatusCache) {
        let mut from_store = cache.store.load_all().unwrap();
        from_store.sort_by_key(|&(uid, _)| uid);

        let mut from_cache = cache
            .messages()
            .values()
            .map(|r| (r.uid, r.flags.clone()))
            .collect::<Vec<_>>();
        from_cache.sort_by_key(|&(uid, _)| uid);

        assert_eq!(from_store, from_cache);
    }

    fn open(
        tmpdir: &TempDir,
        config: &StatusConfig,
        ui: &RecordingUi,
    ) -> StatusCache {
        StatusCache::open(
            &tmpdir.path().join("INBOX"),
            LogPrefix::new("remote".to_owned(), "INBOX".to_owned()),
            config,
            ui,
        )
        .unwrap()
    }

    fn flags(s: &str) -> FlagSet {
        s.chars().collect()
    }

    fn sorted_uids(cache: &StatusCache) -> Vec<Uid> {
        let mut uids = cache.uid_list();
        uids.sort();
        uids
    }

    const STRATEGIES: &[PersistenceStrategy] = &[
        PersistenceStrategy::WriteThrough,
        PersistenceStrategy::Deferred,
    ];

    #[test]
    fn test_example_scenario() {
        for &strategy in STRATEGIES {
            let fixture = Fixture::new(strategy);
            let cache = &fixture.cache;

            assert_eq!(
                Uid(5),
                cache.save_message(Uid(5), flags("F"), None).unwrap()
            );
            assert_eq!(
                Uid(3),
                cache.save_message(Uid(3), flags("SF"), None).unwrap()
            );

            assert_eq!(
                vec![(Uid(3), flags("FS")), (Uid(5), flags("F"))],
                {
                    let mut rows = cache.store.load_all().unwrap();
                    rows.sort_by_key(|&(uid, _)| uid);
                    rows
                }
            );
            assert_eq!("FS", cache.message_flags(Uid(3)).unwrap().to_string());
            assert_eq!(vec![Uid(3), Uid(5)], sorted_uids(cache));
            assert_eq!(flags("SF"), cache.message_flags(Uid(3)).unwrap());

            cache.delete_messages(&[Uid(5), Uid(99)]).unwrap();
            assert_eq!(1, cache.message_count());
            assert_eq!(vec![Uid(3)], sorted_uids(cache));
            fixture.assert_consistent();
        }
    }

    #[test]
    fn test_new_store_warns_once() {
        let mut fixture = Fixture::new(PersistenceStrategy::WriteThrough);
        assert_eq!(1, fixture.ui.warnings().len());
        assert_eq!(SchemaOutcome::Created, fixture.cache.schema().outcome);
        assert!(fixture.cache.is_new_mailbox());
        assert_eq!(0, fixture.cache.message_count());

        fixture.cache.save_message(Uid(1), flags("S"), None).unwrap();
        // Still the state as of the last load
        assert!(fixture.cache.is_new_mailbox());

        fixture.reopen();
        assert_eq!(1, fixture.ui.warnings().len());
        assert_eq!(SchemaOutcome::Current, fixture.cache.schema().outcome);
        assert!(!fixture.cache.is_new_mailbox());
        assert_eq!(flags("S"), fixture.cache.message_flags(Uid(1)).unwrap());
    }

    #[test]
    fn test_corrupt_store_rebuilt() {
        let tmpdir = TempDir::new().unwrap();
        std::fs::write(tmpdir.path().join("INBOX"), vec![0xAAu8; 2048])
            .unwrap();
        let ui = RecordingUi::default();
        let cache = open(&tmpdir, &StatusConfig::default(), &ui);

        assert_eq!(1, ui.warnings().len());
        assert!(cache.is_new_mailbox());
        assert_eq!(0, cache.message_count());
        cache.save_message(Uid(1), flags("S"), None).unwrap();
    }

    #[test]
    fn test_unassigned_uid_not_saved() {
        for &strategy in STRATEGIES {
            let fixture = Fixture::new(strategy);
            let cache = &fixture.cache;
            assert_eq!(
                Uid(-1),
                cache.save_message(Uid(-1), flags("S"), None).unwrap()
            );
            assert_eq!(0, cache.message_count());
            assert!(!cache.uid_exists(Uid(-1)));
            assert_eq!(0, cache.store.count().unwrap());
        }
    }

    #[test]
    fn test_save_existing_overwrites() {
        for &strategy in STRATEGIES {
            let fixture = Fixture::new(strategy);
            let cache = &fixture.cache;
            let rtime = UnixTimestamp::from_secs(1_600_000_000);

            cache.save_message(Uid(7), flags("S"), rtime).unwrap();
            cache.save_message(Uid(7), flags("FR"), None).unwrap();

            assert_eq!(1, cache.store.count().unwrap());
            assert_eq!(
                vec![(Uid(7), flags("FR"))],
                cache.store.load_all().unwrap()
            );
            assert_eq!(flags("RF"), cache.message_flags(Uid(7)).unwrap());
            assert_eq!(rtime, cache.message_time(Uid(7)).unwrap());
        }
    }

    #[test]
    fn test_message_time() {
        let mut fixture = Fixture::new(PersistenceStrategy::WriteThrough);
        let rtime = UnixTimestamp::from_secs(42);
        fixture.cache.save_message(Uid(1), flags(""), rtime).unwrap();
        fixture.cache.save_message(Uid(2), flags(""), None).unwrap();

        assert_eq!(rtime, fixture.cache.message_time(Uid(1)).unwrap());
        assert_eq!(None, fixture.cache.message_time(Uid(2)).unwrap());
        assert_matches!(
            Err(Error::NxMessage),
            fixture.cache.message_time(Uid(3))
        );

        // Receipt times don't survive a reload
        fixture.reopen();
        assert_eq!(None, fixture.cache.message_time(Uid(1)).unwrap());
    }

    #[test]
    fn test_unknown_message_lookups() {
        let fixture = Fixture::new(PersistenceStrategy::WriteThrough);
        assert_matches!(
            Err(Error::NxMessage),
            fixture.cache.message_flags(Uid(1))
        );
        assert_matches!(
            Err(Error::NxMessage),
            fixture.cache.save_flags(Uid(1), flags("S"))
        );
        assert_eq!(0, fixture.cache.store.count().unwrap());
    }

    #[test]
    fn test_delete_nothing_present_skips_store() {
        let fixture = Fixture::new(PersistenceStrategy::WriteThrough);
        fixture.cache.save_message(Uid(1), flags("S"), None).unwrap();
        // With the store closed, any store access would fail
        fixture.cache.close().unwrap();

        fixture.cache.delete_messages(&[]).unwrap();
        fixture.cache.delete_messages(&[Uid(2), Uid(3)]).unwrap();
        assert_matches!(
            Err(Error::StoreClosed),
            fixture.cache.delete_messages(&[Uid(1), Uid(2)])
        );
        // The failed delete left the cache as it was
        assert!(fixture.cache.uid_exists(Uid(1)));
    }

    #[test]
    fn test_failed_write_leaves_cache_unchanged() {
        let fixture = Fixture::new(PersistenceStrategy::Deferred);
        let cache = &fixture.cache;
        cache.save_message(Uid(1), flags("S"), None).unwrap();
        cache.close().unwrap();

        assert_matches!(
            Err(Error::StoreClosed),
            cache.save_message(Uid(2), flags("S"), None)
        );
        assert_matches!(
            Err(Error::StoreClosed),
            cache.save_flags(Uid(1), flags("F"))
        );
        assert_matches!(Err(Error::StoreClosed), cache.purge());

        assert_eq!(vec![Uid(1)], cache.uid_list());
        assert_eq!(flags("S"), cache.message_flags(Uid(1)).unwrap());
    }

    #[test]
    fn test_purge() {
        for &strategy in STRATEGIES {
            let mut fixture = Fixture::new(strategy);
            for uid in 1..=10 {
                fixture
                    .cache
                    .save_message(Uid(uid), flags("S"), None)
                    .unwrap();
            }
            fixture.cache.purge().unwrap();
            assert_eq!(0, fixture.cache.message_count());
            fixture.assert_consistent();

            fixture.reopen();
            assert!(fixture.cache.is_new_mailbox());
        }
    }

    #[test]
    fn test_deferred_survives_reopen_after_close() {
        let mut fixture = Fixture::new(PersistenceStrategy::Deferred);
        fixture.cache.save_message(Uid(1), flags("S"), None).unwrap();
        fixture.cache.save_message(Uid(2), flags("F"), None).unwrap();
        fixture.cache.delete_messages(&[Uid(1)]).unwrap();
        fixture.reopen();

        assert_eq!(vec![Uid(2)], fixture.cache.uid_list());
        assert_eq!(flags("F"), fixture.cache.message_flags(Uid(2)).unwrap());
    }

    #[test]
    fn test_shared_between_threads() {
        let tmpdir = TempDir::new().unwrap();
        let ui = RecordingUi::default();
        let cache = Arc::new(open(&tmpdir, &StatusConfig::default(), &ui));

        let writers = (0..4i64)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..25 {
                        cache
                            .save_message(Uid(t * 100 + i), flags("S"), None)
                            .unwrap();
                    }
                })
            })
            .collect::<Vec<_>>();

        let reader = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..100 {
                    let count = cache.message_count();
                    assert!(count <= 100);
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();

        assert_eq!(100, cache.message_count());
        assert_eq!(100, cache.store.count().unwrap());
    }

    #[test]
    fn test_load_concurrent_with_writes() {
        for &strategy in STRATEGIES {
            let tmpdir = TempDir::new().unwrap();
            let ui = RecordingUi::default();
            let mut config = StatusConfig::default();
            config.persistence.strategy = strategy;
            let cache = Arc::new(open(&tmpdir, &config, &ui));
            for uid in 0..200 {
                cache.save_message(Uid(uid), flags("S"), None).unwrap();
            }

            let loader = {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..50 {
                        cache.load().unwrap();
                    }
                })
            };

            for uid in 1000..1300 {
                cache.save_message(Uid(uid), flags("F"), None).unwrap();
                if uid < 1200 && 0 == uid % 2 {
                    cache.delete_messages(&[Uid(uid - 1000)]).unwrap();
                }
            }
            loader.join().unwrap();

            assert_consistent(&cache);
            assert_eq!(400, cache.message_count());
            assert_eq!(400, cache.store.count().unwrap());
        }
    }

    #[test]
    fn test_lost_transaction_resyncs_cache() {
        let mut fixture = Fixture::new(PersistenceStrategy::Deferred);
        fixture.cache.save_message(Uid(1), flags("S"), None).unwrap();
        fixture.cache.save_message(Uid(2), flags("F"), None).unwrap();
        fixture.cache.store.abort_transaction();

        assert_matches!(
            Err(Error::TransactionLost),
            fixture.cache.save_message(Uid(3), flags("R"), None)
        );
        // Memory was reset to what the store really holds
        assert_eq!(0, fixture.cache.message_count());
        fixture.assert_consistent();

        fixture.cache.save_message(Uid(3), flags("R"), None).unwrap();
        fixture.reopen();
        assert_eq!(vec![Uid(3)], fixture.cache.uid_list());
    }

    #[test]
    fn test_lost_transaction_on_save_resyncs_cache() {
        let fixture = Fixture::new(PersistenceStrategy::Deferred);
        fixture.cache.save_message(Uid(1), flags("S"), None).unwrap();
        fixture.cache.save().unwrap();
        fixture.cache.save_message(Uid(2), flags("F"), None).unwrap();
        fixture.cache.store.abort_transaction();

        assert_matches!(Err(Error::TransactionLost), fixture.cache.save());
        assert_eq!(vec![Uid(1)], fixture.cache.uid_list());
        fixture.assert_consistent();
    }

    #[derive(Clone, Debug)]
    enum Op {
        Save(i64, String),
        Delete(Vec<i64>),
        Purge,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => (-2i64..16, "[A-Z]{0,4}")
                .prop_map(|(uid, f)| Op::Save(uid, f)),
            3 => prop::collection::vec(-2i64..16, 0..4).prop_map(Op::Delete),
            1 => Just(Op::Purge),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn cache_matches_store(
            deferred in any::<bool>(),
            ops in prop::collection::vec(op_strategy(), 1..24),
        ) {
            let strategy = if deferred {
                PersistenceStrategy::Deferred
            } else {
                PersistenceStrategy::WriteThrough
            };
            let mut fixture = Fixture::new(strategy);

            for op in ops {
                match op {
                    Op::Save(uid, f) => {
                        prop_assert_eq!(
                            Uid(uid),
                            fixture
                                .cache
                                .save_message(Uid(uid), flags(&f), None)
                                .unwrap()
                        );
                    },
                    Op::Delete(uids) => {
                        let before = fixture.cache.message_count();
                        let uids =
                            uids.into_iter().map(Uid).collect::<Vec<_>>();
                        let mut present = uids
                            .iter()
                            .filter(|&&u| fixture.cache.uid_exists(u))
                            .collect::<Vec<_>>();
                        present.sort();
                        present.dedup();
                        fixture.cache.delete_messages(&uids).unwrap();
                        prop_assert_eq!(
                            before - present.len(),
                            fixture.cache.message_count()
                        );
                    },
                    Op::Purge => fixture.cache.purge().unwrap(),
                }

                fixture.assert_consistent();
                prop_assert!(fixture
                    .cache
                    .uid_list()
                    .iter()
                    .all(|u| u.is_assigned()));
            }

            let before = fixture
                .cache
                .messages()
                .values()
                .map(|r| (r.uid, r.flags.clone()))
                .collect::<HashMap<_, _>>();
            fixture.reopen();
            let after = fixture
                .cache
                .messages()
                .values()
                .map(|r| (r.uid, r.flags.clone()))
                .collect::<HashMap<_, _>>();
            prop_assert_eq!(before, after);
        }
    }
}
