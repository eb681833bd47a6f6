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

//! Snippet wrapping.
//!
//! Line hooks fire before a line runs, so the effect of a snippet's last
//! statement is only visible at a later event. Wrapping the snippet in a
//! procedure with a trailing sentinel statement provides that event:
//!
//! ```text
//! def main():          <- line 1
//!     <snippet line 1> <- line 2
//!     ...
//!     <snippet line n> <- line n + 1
//!     _finished = True <- line n + 2
//! main()               <- line n + 3
//! ```

use itertools::Itertools;
use tracetool_common::types::LineNumber;
use tracetool_runtime::ScriptError;

use crate::config::TraceConfig;

/// Indentation placed in front of every snippet line
pub const BODY_INDENT: &str = "\t";

/// The snippet placed inside the wrapping procedure, without the call.
pub fn format_code_for_tracing(source: &str, config: &TraceConfig) -> String {
    let body = source.split('\n').map(|line| format!("{BODY_INDENT}{line}")).join("\n");
    format!("def {}():\n{body}\n{BODY_INDENT}{}", config.wrapper_name, config.sentinel)
}

/// The fully wrapped snippet: procedure definition followed by its call.
pub fn wrap_source(source: &str, config: &TraceConfig) -> String {
    format!("{}\n{}()", format_code_for_tracing(source, config), config.wrapper_name)
}

/// A wrapped snippet together with its line layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedSource {
    code: String,
    snippet_lines: usize,
}

impl WrappedSource {
    /// Wrap `source` as configured
    pub fn new(source: &str, config: &TraceConfig) -> Self {
        Self { code: wrap_source(source, config), snippet_lines: source.split('\n').count() }
    }

    /// Wrapped code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Lines of the original snippet
    pub fn snippet_lines(&self) -> usize {
        self.snippet_lines
    }

    /// Line of the sentinel statement
    pub fn sentinel_line(&self) -> LineNumber {
        self.snippet_lines + 2
    }

    /// Line of the wrapper call
    pub fn call_line(&self) -> LineNumber {
        self.snippet_lines + 3
    }

    /// Snippet line that `line` of the wrapped code came from
    pub fn to_snippet_line(&self, line: LineNumber) -> Option<LineNumber> {
        (2..=self.snippet_lines + 1).contains(&line).then(|| line - 1)
    }

    /// Report `err` against the snippet's own line numbers where possible
    pub fn to_snippet_error(&self, err: ScriptError) -> ScriptError {
        err.map_line(|line| self.to_snippet_line(line).unwrap_or(line))
    }
}
