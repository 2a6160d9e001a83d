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

//! The flag codec.
//!
//! Flags are single characters (maildir style, e.g. `S` for seen and `F` for
//! flagged). A set of them is stored as the concatenation of its members in
//! codepoint order, with no separators. The order carries no meaning; it only
//! makes the stored form canonical.

use std::collections::btree_set::{self, BTreeSet};
use std::convert::Infallible;
use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;

use rusqlite::types::{
    FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef,
};

/// A set of single-character flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FlagSet(BTreeSet<char>);

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, flag: char) -> bool {
        self.0.insert(flag)
    }

    pub fn remove(&mut self, flag: char) -> bool {
        self.0.remove(&flag)
    }

    pub fn contains(&self, flag: char) -> bool {
        self.0.contains(&flag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the flags in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }
}

/// Produces the canonical stored form of `flags`.
pub fn encode(flags: &FlagSet) -> String {
    flags.0.iter().collect()
}

/// Parses a stored flag string. Every character is one flag.
pub fn decode(stored: &str) -> FlagSet {
    stored.chars().collect()
}

impl FromIterator<char> for FlagSet {
    fn from_iter<I: IntoIterator<Item = char>>(it: I) -> Self {
        Self(it.into_iter().collect())
    }
}

impl Extend<char> for FlagSet {
    fn extend<I: IntoIterator<Item = char>>(&mut self, it: I) {
        self.0.extend(it)
    }
}

impl IntoIterator for FlagSet {
    type Item = char;
    type IntoIter = btree_set::IntoIter<char>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &flag in &self.0 {
            write!(f, "{}", flag)?;
        }
        Ok(())
    }
}

impl FromStr for FlagSet {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Infallible> {
        Ok(decode(s))
    }
}

impl ToSql for FlagSet {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Owned(Value::Text(encode(self))))
    }
}

impl FromSql for FlagSet {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(Self::new()),
            ValueRef::Text(text) => std::str::from_utf8(text)
                .map(decode)
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}
