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

//! Trace artifacts collected while running a snippet and the table they merge into.
//!
//! - [`ExecutionOrder`] - line numbers in the order they were executed
//! - [`VariableSnapshot`] / [`SnapshotLog`] - rendered variable bindings, one per line event
//! - [`LineOutputMap`] - standard output text attributed to the line that wrote it
//! - [`VariableUniverse`] / [`TraceTable`] - the merged, column-stable table

mod order;
mod output;
mod snapshot;
mod table;

pub use order::*;
pub use output::*;
pub use snapshot::*;
pub use table::*;

/// A 1-based source line number.
pub type LineNumber = usize;
