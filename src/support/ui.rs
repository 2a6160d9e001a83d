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

//! The operator-facing warning sink.

use log::warn;

/// Receives warnings that the operator should see.
///
/// The status store only calls this when a store had to be created or
/// rebuilt, since any prior content of that mailbox's status is gone.
pub trait Ui: Send + Sync {
    fn warn(&self, message: &str);
}

/// A `Ui` which forwards everything to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogUi;

impl Ui for LogUi {
    fn warn(&self, message: &str) {
        warn!("{}", message);
    }
}

/// A `Ui` that remembers every warning, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingUi {
    warnings: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingUi {
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Ui for RecordingUi {
    fn warn(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_owned());
    }
}
