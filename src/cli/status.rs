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

use localstatus::{
    store::flags, support::sysexits::*, LogPrefix, LogUi, StatusCache,
    StatusConfig, Uid,
};

use super::main::*;

pub(super) fn run(cmd: Command, config: StatusConfig) {
    match cmd {
        Command::Dump(common) => {
            let cache = open(&common, &config);
            let messages = cache.messages();
            let mut records = messages.values().collect::<Vec<_>>();
            records.sort_by_key(|r| r.uid);
            for record in records {
                println!("{}\t{}", record.uid, record.flags);
            }
        },

        Command::Count(common) => {
            println!("{}", open(&common, &config).message_count());
        },

        Command::Flags(cmd) => {
            let cache = open(&cmd.common, &config);
            match cache.message_flags(Uid(cmd.uid)) {
                Ok(flags) => println!("{}", flags),
                Err(_) => die!(EX_DATAERR, "No message with UID {}", cmd.uid),
            }
        },

        Command::Check(common) => {
            let cache = open(&common, &config);
            let schema = cache.schema();
            println!(
                "version {} ({:?}), {} message(s), {:?} persistence",
                schema.version,
                schema.outcome,
                cache.message_count(),
                cache.strategy(),
            );
        },

        Command::Purge(common) => {
            let cache = open(&common, &config);
            finish(&cache, cache.purge());
        },

        Command::SetFlags(cmd) => {
            let cache = open(&cmd.common, &config);
            let flags = flags::decode(&cmd.flags);
            let uid = Uid(cmd.uid);
            if !uid.is_assigned() {
                die!(EX_USAGE, "UID {} has not been assigned", uid);
            }
            finish(&cache, cache.save_message(uid, flags, None).map(|_| ()));
        },

        Command::Delete(cmd) => {
            let cache = open(&cmd.common, &config);
            let uids = cmd.uids.iter().copied().map(Uid).collect::<Vec<_>>();
            finish(&cache, cache.delete_messages(&uids));
        },
    }
}

fn open(common: &CommonOptions, config: &StatusConfig) -> StatusCache {
    let mailbox = common.mailbox.clone().unwrap_or_else(|| {
        common
            .db
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| common.db.display().to_string())
    });

    match StatusCache::open(
        &common.db,
        LogPrefix::new(common.repository.clone(), mailbox),
        config,
        &LogUi,
    ) {
        Ok(cache) => cache,
        Err(e) => die!(
            Sysexit::for_error(&e),
            "Failed to open '{}': {}",
            common.db.display(),
            e
        ),
    }
}

fn finish(cache: &StatusCache, result: Result<(), localstatus::Error>) {
    if let Err(e) = result.and_then(|()| cache.close()) {
        die!(Sysexit::for_error(&e), "{}", e);
    }
}
