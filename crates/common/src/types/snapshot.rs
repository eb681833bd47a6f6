// tracetool - Execution Trace Tables
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use rpds::RedBlackTreeMapSync;
use serde::{Deserialize, Serialize};

use super::LineNumber;

/// Rendered variable bindings captured at a single line event.
///
/// Bindings live in a persistent map, so a snapshot is an immutable value:
/// cloning shares structure, and nothing the traced program does afterwards
/// can reach back into a snapshot that has already been recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSnapshot {
    /// Line that was about to execute when the snapshot was taken
    line: LineNumber,
    /// Name of the scope the bindings belong to
    scope: String,
    /// Scoped variable name -> rendered value
    bindings: RedBlackTreeMapSync<String, String>,
}

impl Default for VariableSnapshot {
    fn default() -> Self {
        Self::new(0, "")
    }
}

impl VariableSnapshot {
    /// Create an empty snapshot for `scope` at `line`
    pub fn new(line: LineNumber, scope: impl Into<String>) -> Self {
        Self { line, scope: scope.into(), bindings: RedBlackTreeMapSync::new_sync() }
    }

    /// Build a snapshot directly from `(name, rendered)` pairs.
    pub fn from_bindings<I, K, V>(line: LineNumber, scope: impl Into<String>, bindings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut snapshot = Self::new(line, scope);
        for (name, value) in bindings {
            snapshot.insert(name, value);
        }
        snapshot
    }

    /// Record one rendered binding
    pub fn insert(&mut self, name: impl Into<String>, rendered: impl Into<String>) {
        self.bindings.insert_mut(name.into(), rendered.into());
    }

    /// Rendered value of `name`, if captured
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }

    /// Line that was about to execute
    pub fn line(&self) -> LineNumber {
        self.line
    }

    /// Scope the bindings were taken from
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Captured names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// `(name, rendered)` pairs in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of captured bindings
    pub fn len(&self) -> usize {
        self.bindings.size()
    }

    /// Whether no binding was captured
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Snapshots of one run, one per line event, in execution order.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Deref,
    derive_more::DerefMut,
    derive_more::From,
)]
pub struct SnapshotLog(Vec<VariableSnapshot>);

impl SnapshotLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }
}

impl FromIterator<VariableSnapshot> for SnapshotLog {
    fn from_iter<I: IntoIterator<Item = VariableSnapshot>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SnapshotLog {
    type Item = &'a VariableSnapshot;
    type IntoIter = std::slice::Iter<'a, VariableSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
