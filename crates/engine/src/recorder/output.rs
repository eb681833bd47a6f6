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

use tracetool_common::types::{LineNumber, LineOutputMap};
use tracetool_runtime::{FrameView, OutputSink, ScriptResult};
use tracing::debug;

use super::run_snippet;
use crate::config::TraceConfig;

/// Standard output replacement that files every write under the line that
/// was executing when it happened.
#[derive(Debug, Default)]
pub struct OutputInterceptor {
    lines: LineOutputMap,
    /// Subtracted from the executing line, for code that was shifted by wrapping
    line_shift: usize,
}

impl OutputInterceptor {
    /// Create an interceptor for unshifted code
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an interceptor for code whose lines are `shift` below the snippet's
    pub fn with_line_shift(shift: usize) -> Self {
        Self { lines: LineOutputMap::new(), line_shift: shift }
    }

    /// Append `text` to the output of `line`
    pub fn record(&mut self, line: LineNumber, text: &str) {
        self.lines.append(line.saturating_sub(self.line_shift), text);
    }

    /// Run the raw snippet with its output intercepted.
    ///
    /// Output written before a failure is kept.
    pub fn capture(&mut self, source: &str, input: &str, config: &TraceConfig) -> ScriptResult<()> {
        let result = run_snippet(source, input, config, None, Some(self));
        debug!(lines = self.lines.len(), ok = result.is_ok(), "Captured output");
        result
    }

    /// Output collected so far
    pub fn lines(&self) -> &LineOutputMap {
        &self.lines
    }

    /// Take the collected output
    pub fn into_lines(self) -> LineOutputMap {
        self.lines
    }
}

impl OutputSink for OutputInterceptor {
    fn write(&mut self, frame: &FrameView<'_>, text: &str) {
        self.record(frame.line(), text);
    }
}
