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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::LineNumber;

/// Standard output text keyed by the line that produced it.
///
/// Several writes from the same line (a loop body, or `print` with
/// `end=""`) are concatenated in the order they happened.
///
/// Lines are numeric keys. Consumers holding the textual form of a line
/// number, such as a JSON object key, can use [`Self::get_by_key`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineOutputMap {
    inner: BTreeMap<LineNumber, String>,
}

impl LineOutputMap {
    /// Create an empty output map
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` to whatever `line` has produced so far
    pub fn append(&mut self, line: LineNumber, text: &str) {
        self.inner.entry(line).or_default().push_str(text);
    }

    /// Output attributed to `line`, if any
    pub fn get(&self, line: LineNumber) -> Option<&str> {
        self.inner.get(&line).map(String::as_str)
    }

    /// Output attributed to the line spelled by `key`, e.g. `"3"`.
    ///
    /// Keys that are not a line number have no output.
    pub fn get_by_key(&self, key: &str) -> Option<&str> {
        self.get(key.trim().parse().ok()?)
    }

    /// Output attributed to `line`, or the empty string
    pub fn output_for(&self, line: LineNumber) -> &str {
        self.get(line).unwrap_or_default()
    }

    /// Lines that produced output, ascending
    pub fn lines(&self) -> impl Iterator<Item = LineNumber> + '_ {
        self.inner.keys().copied()
    }

    /// Number of lines that produced output
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether nothing was written at all
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over `(line, text)` pairs in line order
    pub fn iter(&self) -> impl Iterator<Item = (LineNumber, &str)> {
        self.inner.iter().map(|(line, text)| (*line, text.as_str()))
    }
}
