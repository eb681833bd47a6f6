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

use tracetool_common::types::ExecutionOrder;
use tracetool_runtime::{FrameView, ScriptResult, Tracer};
use tracing::debug;

use super::run_snippet;
use crate::config::TraceConfig;

/// Records the line number of every line event, nested calls included.
#[derive(Debug, Default)]
pub struct ExecutionOrderRecorder {
    order: ExecutionOrder,
}

impl ExecutionOrderRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the raw snippet and record its line events.
    ///
    /// Lines recorded before a failure are kept.
    pub fn record(&mut self, source: &str, input: &str, config: &TraceConfig) -> ScriptResult<()> {
        let result = run_snippet(source, input, config, Some(self), None);
        debug!(events = self.order.len(), ok = result.is_ok(), "Recorded execution order");
        result
    }

    /// Lines recorded so far
    pub fn order(&self) -> &ExecutionOrder {
        &self.order
    }

    /// Take the recorded order
    pub fn into_order(self) -> ExecutionOrder {
        self.order
    }
}

impl Tracer for ExecutionOrderRecorder {
    fn line(&mut self, frame: &FrameView<'_>) {
        self.order.push(frame.line());
    }

    fn wants_locals(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_loop_repeats() {
        let mut recorder = ExecutionOrderRecorder::new();
        recorder.record("total = 0\nfor i in range(2):\n    total += i\n", "", &TraceConfig::default()).unwrap();
        assert_eq!(recorder.order().as_slice(), &[1, 2, 3, 2, 3, 2]);
    }

    #[test]
    fn test_keeps_partial_order_on_error() {
        let mut recorder = ExecutionOrderRecorder::new();
        let err = recorder.record("a = 1\nb = a / 0\nc = 2\n", "", &TraceConfig::default()).unwrap_err();
        assert!(err.is("ZeroDivisionError"));
        assert_eq!(err.line(), Some(2));
        assert_eq!(recorder.into_order().into_inner(), vec![1, 2]);
    }
}
