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

use std::fmt;
use std::sync::Arc;

/// Identifies a status store in log statements and operator warnings.
///
/// The prefix renders as `repository:mailbox`. Clones share the same
/// underlying strings.
#[derive(Clone, Debug)]
pub struct LogPrefix {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    repository: String,
    mailbox: String,
}

impl LogPrefix {
    pub fn new(repository: String, mailbox: String) -> Self {
        Self {
            inner: Arc::new(Inner {
                repository: sanitise(repository),
                mailbox: sanitise(mailbox),
            }),
        }
    }

    pub fn repository(&self) -> &str {
        &self.inner.repository
    }

    pub fn mailbox(&self) -> &str {
        &self.inner.mailbox
    }
}

impl fmt::Display for LogPrefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.inner.repository, self.inner.mailbox)
    }
}

fn sanitise(mut s: String) -> String {
    s.retain(|c| !c.is_control());
    if let Some((truncate_len, _)) = s.char_indices().nth(64) {
        s.truncate(truncate_len);
    }

    s
}
