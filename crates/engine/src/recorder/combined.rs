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

use tracetool_common::types::{ExecutionOrder, LineNumber, SnapshotLog};
use tracetool_runtime::{FrameView, ScopeKind, Tracer};

use super::VariableSnapshotRecorder;
use crate::instrumentation::WrappedSource;

/// A line event seen by [`CombinedTracer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEvent {
    /// Position among all events of the run
    pub sequence: u64,
    /// Line in the wrapped code
    pub line: LineNumber,
    /// Kind of the executing scope
    pub kind: ScopeKind,
}

/// Records order and snapshots from a single run of the wrapped snippet.
///
/// Every event gets a sequence number. The wrapper's entry event marks where
/// the snippet's own events start, which fixes the alignment offset between
/// the snapshot log and the execution order.
#[derive(Debug)]
pub struct CombinedTracer {
    wrapper_name: String,
    snapshots: VariableSnapshotRecorder,
    events: Vec<LineEvent>,
    wrapper_entry: Option<u64>,
    sequence: u64,
}

impl CombinedTracer {
    /// Create a tracer for a snippet wrapped in a procedure named `wrapper_name`
    pub fn new(wrapper_name: impl Into<String>) -> Self {
        Self {
            wrapper_name: wrapper_name.into(),
            snapshots: VariableSnapshotRecorder::new(),
            events: Vec::new(),
            wrapper_entry: None,
            sequence: 0,
        }
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Line events in the order they happened
    pub fn events(&self) -> &[LineEvent] {
        &self.events
    }

    /// Sequence number of the wrapper's entry event, once it happened
    pub fn wrapper_entry(&self) -> Option<u64> {
        self.wrapper_entry
    }

    /// Snapshots taken so far
    pub fn snapshots(&self) -> &SnapshotLog {
        self.snapshots.snapshots()
    }

    /// Snapshots to skip before the first row.
    ///
    /// Snapshots describe the state before their line runs, so a row is paired
    /// with the snapshot of the event that follows it: one past the number of
    /// events that happened before the wrapper was entered.
    pub fn offset(&self) -> Option<usize> {
        let entry = self.wrapper_entry?;
        Some(self.events.iter().take_while(|event| event.sequence < entry).count() + 1)
    }

    /// The snippet's line events in snippet numbering, sentinel excluded
    pub fn execution_order(&self, wrapped: &WrappedSource) -> ExecutionOrder {
        let Some(entry) = self.wrapper_entry else { return ExecutionOrder::new() };
        self.events
            .iter()
            .filter(|event| event.sequence > entry && event.kind != ScopeKind::Module)
            .filter_map(|event| wrapped.to_snippet_line(event.line))
            .collect()
    }

    /// Take the snapshots and the calls log
    pub fn into_parts(self) -> (SnapshotLog, Vec<String>) {
        self.snapshots.into_parts()
    }
}

impl Tracer for CombinedTracer {
    fn call(&mut self, frame: &FrameView<'_>) {
        let sequence = self.next_sequence();
        let is_wrapper =
            frame.kind() == ScopeKind::Function && frame.depth() == 2 && frame.name() == self.wrapper_name;
        if is_wrapper && self.wrapper_entry.is_none() {
            self.wrapper_entry = Some(sequence);
        }
        self.snapshots.call(frame);
    }

    fn line(&mut self, frame: &FrameView<'_>) {
        let sequence = self.next_sequence();
        self.events.push(LineEvent { sequence, line: frame.line(), kind: frame.kind() });
        self.snapshots.line(frame);
    }

    fn ret(&mut self, _frame: &FrameView<'_>) {
        self.next_sequence();
    }
}
