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

use tracetool_common::{
    render_grid,
    types::{SnapshotLog, VariableSnapshot},
};
use tracetool_runtime::{CapturedValue, FrameView, ScopeKind, ScriptResult, Tracer};
use tracing::{debug, warn};

use super::run_snippet;
use crate::{config::TraceConfig, instrumentation::WrappedSource};

/// Line break marker that keeps a multi-line cell in one table cell
pub const CELL_LINE_BREAK: &str = "<br>";

/// Captures a rendered copy of the executing frame's locals at every line event.
#[derive(Debug, Default)]
pub struct VariableSnapshotRecorder {
    snapshots: SnapshotLog,
    calls_log: Vec<String>,
}

impl VariableSnapshotRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the wrapped snippet and snapshot every line event.
    ///
    /// Snapshots taken before a failure are kept.
    pub fn record(&mut self, wrapped: &WrappedSource, input: &str, config: &TraceConfig) -> ScriptResult<()> {
        let result = run_snippet(wrapped.code(), input, config, Some(self), None);
        debug!(
            snapshots = self.snapshots.len(),
            calls = self.calls_log.len(),
            ok = result.is_ok(),
            "Recorded variable snapshots"
        );
        result
    }

    /// Snapshots taken so far
    pub fn snapshots(&self) -> &SnapshotLog {
        &self.snapshots
    }

    /// One `Calling function: <scope>` entry per entered scope
    pub fn calls_log(&self) -> &[String] {
        &self.calls_log
    }

    /// Take the snapshots and the calls log
    pub fn into_parts(self) -> (SnapshotLog, Vec<String>) {
        (self.snapshots, self.calls_log)
    }

    /// Snapshot of the locals visible in `frame`
    pub fn capture(frame: &FrameView<'_>) -> VariableSnapshot {
        let mut snapshot = VariableSnapshot::new(frame.line(), frame.name());
        if frame.kind() == ScopeKind::Module {
            return snapshot;
        }
        for (name, value) in frame.locals() {
            if is_dunder(name) || value.is_callable() {
                continue;
            }
            snapshot.insert(scoped_name(frame.name(), name), render_value(name, value));
        }
        snapshot
    }
}

impl Tracer for VariableSnapshotRecorder {
    fn call(&mut self, frame: &FrameView<'_>) {
        self.calls_log.push(format!("Calling function: {}", frame.name()));
    }

    fn line(&mut self, frame: &FrameView<'_>) {
        self.snapshots.push(Self::capture(frame));
    }
}

fn is_dunder(name: &str) -> bool {
    name.starts_with("__") && name.ends_with("__")
}

/// Replace `<` and `>` with their HTML entities
pub fn escape_angle_brackets(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

/// Column name of `name` bound in `scope`, e.g. `(main)total`
pub fn scoped_name(scope: &str, name: &str) -> String {
    escape_angle_brackets(&format!("({scope}){name}"))
}

/// Text recorded for the binding `name = value`.
///
/// Objects become a headerless two-row grid of attribute names and values;
/// everything else uses its plain text with angle brackets escaped.
pub fn render_value(name: &str, value: &CapturedValue) -> String {
    let text = value.text();
    if name == "self" || value.is_iterator() || !text.contains("object") {
        return escape_angle_brackets(text);
    }
    match render_attributes(value) {
        Some(cell) => cell,
        None => {
            warn!(name, value = %text, "Value has no attributes to tabulate, using its text");
            escape_angle_brackets(text)
        }
    }
}

/// Attribute grid of an instance, `None` for values without attributes
pub fn render_attributes(value: &CapturedValue) -> Option<String> {
    let (names, values): (Vec<String>, Vec<String>) = value.attributes()?.iter().cloned().unzip();
    Some(render_grid(&[names, values], false).replace('\n', CELL_LINE_BREAK))
}
