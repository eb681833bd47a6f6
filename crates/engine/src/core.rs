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

//! The trace engine entry point.
//!
//! [`CodeTracer`] owns a snippet, its scripted input and every artifact a
//! trace produces. Each call to [`CodeTracer::generate_trace`] rebuilds all of
//! them from scratch.
//!
//! # Workflow
//!
//! With [`TraceStrategy::MultiPass`]:
//!
//! 1. **Wrap**: place the snippet in a procedure with a trailing sentinel
//! 2. **Snapshot pass**: run the wrapped snippet, capturing locals at every line
//! 3. **Order pass**: run the raw snippet, recording the lines it visits
//! 4. **Output pass**: run the raw snippet again, attributing output to lines
//! 5. **Merge**: pair row `i` with snapshot `i + bootstrap_offset`
//!
//! With [`TraceStrategy::SinglePass`] the wrapped snippet runs once and all
//! three artifacts come from that run. The merge offset is derived from the
//! position of the wrapper's entry event rather than configured.
//!
//! Every run replays the same scripted input, so the multi-pass strategy
//! relies on the snippet behaving identically across runs.

use std::fmt;

use tracetool_common::types::{ExecutionOrder, LineOutputMap, SnapshotLog, TraceTable};
use tracing::{debug, info, warn};

use crate::{
    backend::{ExecutionBackend, InterpreterBackend},
    config::{TraceConfig, TraceStrategy},
    error::{Pass, TraceError, TraceResult},
    instrumentation::WrappedSource,
    recorder::{CombinedTracer, ExecutionOrderRecorder, OutputInterceptor, VariableSnapshotRecorder},
    table::TraceTableBuilder,
};

/// Traces a snippet into a [`TraceTable`].
#[derive(Debug)]
pub struct CodeTracer<B = InterpreterBackend> {
    source: String,
    input: String,
    config: TraceConfig,
    backend: B,

    execution_order: ExecutionOrder,
    snapshots: SnapshotLog,
    calls_log: Vec<String>,
    output_lines: LineOutputMap,
    trace_table: Option<TraceTable>,
}

impl CodeTracer {
    /// Create a tracer for `source`, answering `input()` calls from `input`
    pub fn new(source: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            input: input.into(),
            config: TraceConfig::default(),
            backend: InterpreterBackend,
            execution_order: ExecutionOrder::new(),
            snapshots: SnapshotLog::new(),
            calls_log: Vec::new(),
            output_lines: LineOutputMap::new(),
            trace_table: None,
        }
    }
}

impl<B> CodeTracer<B> {
    /// Replace the configuration
    pub fn with_config(mut self, config: TraceConfig) -> Self {
        self.config = config;
        self
    }

    /// Run snippets on `backend` instead
    pub fn with_backend<C: ExecutionBackend>(self, backend: C) -> CodeTracer<C> {
        CodeTracer {
            source: self.source,
            input: self.input,
            config: self.config,
            backend,
            execution_order: self.execution_order,
            snapshots: self.snapshots,
            calls_log: self.calls_log,
            output_lines: self.output_lines,
            trace_table: self.trace_table,
        }
    }

    /// The traced snippet
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The scripted input
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Active configuration
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Lines visited by the last trace, in order
    pub fn execution_order(&self) -> &ExecutionOrder {
        &self.execution_order
    }

    /// Snapshots taken by the last trace
    pub fn snapshots(&self) -> &SnapshotLog {
        &self.snapshots
    }

    /// Scopes entered during the last trace
    pub fn calls_log(&self) -> &[String] {
        &self.calls_log
    }

    /// Output of the last trace, per line
    pub fn output_lines(&self) -> &LineOutputMap {
        &self.output_lines
    }

    /// Table of the last successful trace
    pub fn trace_table(&self) -> Option<&TraceTable> {
        self.trace_table.as_ref()
    }

    /// Grid rendition of the last table, empty before a successful trace
    pub fn render(&self) -> String {
        self.trace_table.as_ref().map(TraceTable::render).unwrap_or_default()
    }

    fn reset(&mut self) {
        self.execution_order = ExecutionOrder::new();
        self.snapshots = SnapshotLog::new();
        self.calls_log.clear();
        self.output_lines = LineOutputMap::new();
        self.trace_table = None;
    }
}

impl<B: ExecutionBackend> CodeTracer<B> {
    /// Run the snippet and build its trace table.
    ///
    /// Artifacts of earlier calls are discarded first. When a run fails, the
    /// artifacts recorded up to the failure stay readable through the
    /// accessors but no table is produced.
    pub fn generate_trace(&mut self) -> TraceResult<&TraceTable> {
        self.reset();
        debug!(strategy = ?self.config.strategy, lines = self.source.split('\n').count(), "Generating trace");

        let table = match self.config.strategy {
            TraceStrategy::MultiPass => self.trace_multi_pass()?,
            TraceStrategy::SinglePass => self.trace_single_pass()?,
        };
        info!(rows = table.len(), variables = table.variables().len(), "Trace table complete");
        Ok(self.trace_table.insert(table))
    }

    fn trace_multi_pass(&mut self) -> TraceResult<TraceTable> {
        let wrapped = WrappedSource::new(&self.source, &self.config);
        debug!(code = wrapped.code(), "Wrapped snippet");

        let mut snapshots = VariableSnapshotRecorder::new();
        let result = self.backend.record_snapshots(&wrapped, &self.input, &self.config, &mut snapshots);
        (self.snapshots, self.calls_log) = snapshots.into_parts();
        check(Pass::Snapshot, result.map_err(|err| wrapped.to_snippet_error(err)))?;

        let mut order = ExecutionOrderRecorder::new();
        let result = self.backend.record_order(&self.source, &self.input, &self.config, &mut order);
        self.execution_order = order.into_order();
        check(Pass::Order, result)?;

        let mut output = OutputInterceptor::new();
        let result = self.backend.capture_output(&self.source, &self.input, &self.config, &mut output);
        self.output_lines = output.into_lines();
        check(Pass::Output, result)?;
        debug!(output = ?self.output_lines, "Captured output");

        TraceTableBuilder::new(self.config.bootstrap_offset).build(
            &self.execution_order,
            &self.snapshots,
            &self.output_lines,
        )
    }

    fn trace_single_pass(&mut self) -> TraceResult<TraceTable> {
        let wrapped = WrappedSource::new(&self.source, &self.config);
        debug!(code = wrapped.code(), "Wrapped snippet");

        let mut tracer = CombinedTracer::new(self.config.wrapper_name.as_str());
        let mut output = OutputInterceptor::with_line_shift(1);
        let result =
            self.backend.record_combined(&wrapped, &self.input, &self.config, &mut tracer, &mut output);

        let offset = tracer.offset();
        self.execution_order = tracer.execution_order(&wrapped);
        self.output_lines = output.into_lines();
        (self.snapshots, self.calls_log) = tracer.into_parts();
        check(Pass::Combined, result.map_err(|err| wrapped.to_snippet_error(err)))?;

        let offset = offset.unwrap_or_else(|| {
            warn!(
                wrapper = %self.config.wrapper_name,
                fallback = self.config.bootstrap_offset,
                "Wrapper entry was not observed, using the bootstrap offset"
            );
            self.config.bootstrap_offset
        });
        TraceTableBuilder::new(offset).build(&self.execution_order, &self.snapshots, &self.output_lines)
    }
}

fn check(pass: Pass, result: tracetool_runtime::ScriptResult<()>) -> TraceResult<()> {
    result.map_err(|err| {
        warn!(%pass, %err, "Snippet raised");
        TraceError::execution(pass, err)
    })
}

impl<B> fmt::Display for CodeTracer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
