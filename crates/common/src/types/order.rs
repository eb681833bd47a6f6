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

use serde::{Deserialize, Serialize};

use super::LineNumber;

/// The sequence of line numbers visited during one run, repeats included.
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
pub struct ExecutionOrder(Vec<LineNumber>);

impl ExecutionOrder {
    /// Create an empty execution order
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the order and return the raw line numbers
    pub fn into_inner(self) -> Vec<LineNumber> {
        self.0
    }
}

impl FromIterator<LineNumber> for ExecutionOrder {
    fn from_iter<I: IntoIterator<Item = LineNumber>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ExecutionOrder {
    type Item = &'a LineNumber;
    type IntoIter = std::slice::Iter<'a, LineNumber>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
