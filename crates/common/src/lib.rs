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

//! tracetool Common - Shared functionality for tracetool components
//!
//! This crate provides the data model shared by the runtime and the engine
//! crates (execution order, variable snapshots, per-line output and the merged
//! trace table), the grid formatter used to display tables, and the logging
//! setup used by every component and test.

/// Trace artifacts: execution order, snapshots, line output and the merged table
pub mod types;

/// Plain-text grid formatting for trace tables and object cells
pub mod grid;
/// Logging setup and utilities for consistent logging across tracetool components
pub mod logging;

pub use grid::*;
pub use logging::*;
