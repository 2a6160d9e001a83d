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

use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use structopt::StructOpt;

use localstatus::support::{sysexits::*, system_config::StatusConfig};

#[derive(StructOpt)]
#[structopt(max_term_width = 80)]
/// Inspect and maintain local status databases.
///
/// Each database holds the last known UIDs and flags of one mailbox. Opening a
/// database that is missing or unreadable creates a fresh, empty one.
pub(super) enum Command {
    /// Print every UID and its flags, sorted by UID.
    Dump(CommonOptions),
    /// Print the number of messages.
    Count(CommonOptions),
    /// Print the flags of one message.
    Flags(FlagsSubcommand),
    /// Validate the database schema, rebuilding it if necessary, and report
    /// the result.
    Check(CommonOptions),
    /// Delete every message from the database.
    Purge(CommonOptions),
    /// Record a message with the given flags, replacing any existing flags.
    SetFlags(SetFlagsSubcommand),
    /// Delete messages from the database. Unknown UIDs are ignored.
    Delete(DeleteSubcommand),
}

#[derive(StructOpt)]
pub(super) struct CommonOptions {
    /// The TOML configuration file to use.
    #[structopt(long, parse(from_os_str))]
    pub(super) config: Option<PathBuf>,

    /// The repository name to use in diagnostics.
    #[structopt(long, default_value = "local")]
    pub(super) repository: String,

    /// The mailbox name to use in diagnostics [default: the database file
    /// name]
    #[structopt(long)]
    pub(super) mailbox: Option<String>,

    /// Log more detail to standard error. Can be given twice.
    #[structopt(short, long, parse(from_occurrences))]
    pub(super) verbose: u32,

    /// The status database.
    #[structopt(parse(from_os_str))]
    pub(super) db: PathBuf,
}

#[derive(StructOpt)]
pub(super) struct FlagsSubcommand {
    #[structopt(flatten)]
    pub(super) common: CommonOptions,

    /// The UID of the message.
    pub(super) uid: i64,
}

#[derive(StructOpt)]
pub(super) struct SetFlagsSubcommand {
    #[structopt(flatten)]
    pub(super) common: CommonOptions,

    /// The UID of the message.
    pub(super) uid: i64,

    /// The flags, one character each (e.g. "FS"). May be empty.
    #[structopt(default_value = "")]
    pub(super) flags: String,
}

#[derive(StructOpt)]
pub(super) struct DeleteSubcommand {
    #[structopt(flatten)]
    pub(super) common: CommonOptions,

    /// The UIDs to delete.
    #[structopt(required = true)]
    pub(super) uids: Vec<i64>,
}

impl Command {
    fn common_options(&self) -> &CommonOptions {
        match *self {
            Command::Dump(ref c)
            | Command::Count(ref c)
            | Command::Check(ref c)
            | Command::Purge(ref c) => c,
            Command::Flags(ref c) => &c.common,
            Command::SetFlags(ref c) => &c.common,
            Command::Delete(ref c) => &c.common,
        }
    }
}

pub fn main() {
    // Clap exits with status 1 instead of EX_USAGE if we use the more concise
    // API
    let cmd = Command::from_clap(&match Command::clap().get_matches_safe() {
        Ok(matches) => matches,
        Err(
            e @ clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            },
        )
        | Err(
            e @ clap::Error {
                kind: clap::ErrorKind::VersionDisplayed,
                ..
            },
        ) => {
            println!("{}", e.message);
            return;
        },
        Err(e) => {
            eprintln!("{}", e.message);
            EX_USAGE.exit()
        },
    });

    let common = cmd.common_options();
    init_logging(common.config.as_deref(), common.verbose);

    let config = match common.config {
        None => StatusConfig::default(),
        Some(ref path) => match StatusConfig::load(path) {
            Ok(config) => config,
            Err(e) => die!(
                EX_CONFIG,
                "Error reading '{}': {}",
                path.display(),
                e
            ),
        },
    };

    super::status::run(cmd, config);
}

/// Sets up `log4rs`.
///
/// A `logging.toml` next to the configuration file takes precedence;
/// otherwise, everything at or above the level selected by `verbose` goes to
/// standard error.
fn init_logging(config_path: Option<&Path>, verbose: u32) {
    let log_config_file = config_path
        .and_then(Path::parent)
        .map(|dir| dir.join("logging.toml"));
    if let Some(log_config_file) = log_config_file.filter(|f| f.is_file()) {
        if let Err(e) = log4rs::init_file(
            &log_config_file,
            log4rs::file::Deserializers::new(),
        ) {
            die!(
                EX_CONFIG,
                "Error reading '{}': {}",
                log_config_file.display(),
                e
            );
        }
        return;
    }

    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S%.3f)} [{l}] {m}{n}",
        )))
        .build();
    let result = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| e.to_string())
        .and_then(|config| {
            log4rs::init_config(config)
                .map(|_| ())
                .map_err(|e| e.to_string())
        });
    if let Err(e) = result {
        die!(EX_SOFTWARE, "Failed to initialise logging: {}", e);
    }
}
