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

//! tracetool Runtime - snippets on embedded CPython
//!
//! Snippets run on an embedded CPython interpreter. This crate exposes two
//! instrumentation seams for a run:
//!
//! - [`Tracer`] receives call, line and return events together with a
//!   read-only [`FrameView`] of the executing frame
//! - [`OutputSink`] receives everything the snippet prints, attributed to the
//!   frame (and therefore the line) that printed it
//!
//! Hooks are borrowed by the [`Interpreter`] for its lifetime, so they are
//! released as soon as a run ends, whether it succeeded or raised.

/// Script errors
pub mod error;
/// Tracing and output hooks
pub mod hook;
/// Running snippets
pub mod interpreter;
/// Events recorded during a run
pub mod journal;
mod session;

pub use error::*;
pub use hook::*;
pub use interpreter::{Interpreter, DEFAULT_MAX_DEPTH, MODULE_SCOPE};
pub use journal::*;
pub use session::SNIPPET_FILENAME;
