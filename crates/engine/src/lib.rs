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

//! tracetool Engine - trace collection and reconciliation
//!
//! Runs a snippet under line-level instrumentation and merges what it
//! observed (execution order, variable snapshots and per-line output) into a
//! single [`tracetool_common::types::TraceTable`].
//!
//! Snippets are executed by an embedded CPython interpreter.
//!
//! ```ignore
//! tracetool_common::logging::init_simple_logging(tracing::Level::INFO)?;
//!
//! let mut tracer = CodeTracer::new("x = int(input())\nprint(x * 2)", "21\n");
//! let table = tracer.generate_trace()?;
//! println!("{table}");
//! ```

pub mod backend;
pub use backend::*;

pub mod config;
pub use config::*;

pub mod core;
pub use self::core::*;

pub mod error;
pub use error::*;

pub mod instrumentation;
pub use instrumentation::*;

pub mod recorder;
pub use recorder::*;

pub mod table;
pub use table::*;
