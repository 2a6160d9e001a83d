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

use std::thread;

use log::{debug, warn};

use crate::support::{
    error::Error, log_prefix::LogPrefix, system_config::RetryPolicy,
};

/// Runs `f` until it either succeeds or fails with something other than a
/// busy/locked condition.
///
/// Busy failures are retried with the backoff described by `policy`. When the
/// policy's attempt budget runs out, the last busy failure is escalated to
/// `Error::Busy`.
pub(super) fn retry_busy<T>(
    log_prefix: &LogPrefix,
    policy: &RetryPolicy,
    what: &str,
    mut f: impl FnMut() -> Result<T, Error>,
) -> Result<T, Error> {
    let mut attempt = 0u32;
    loop {
        attempt = attempt.saturating_add(1);
        match f() {
            Err(e) if e.is_busy() => match policy.backoff(attempt) {
                Some(delay) => {
                    if attempt >= 8 && attempt.is_power_of_two() {
                        warn!(
                            "{log_prefix} Status db still busy during {what} \
                             after {attempt} attempts"
                        );
                    } else {
                        debug!(
                            "{log_prefix} Status db busy during {what}: {e}"
                        );
                    }
                    thread::sleep(delay);
                },
                None => {
                    warn!(
                        "{log_prefix} Giving up on {what} after {attempt} \
                         busy attempts"
                    );
                    return Err(Error::Busy { attempts: attempt });
                },
            },
            result => return result,
        }
    }
}
