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

//! Execution backends.
//!
//! An [`ExecutionBackend`] runs the snippet with a recorder attached. The
//! engine only talks to this trait, so tests can substitute a backend that
//! misbehaves in controlled ways.

use auto_impl::auto_impl;
use tracetool_runtime::ScriptResult;

use crate::{
    config::TraceConfig,
    instrumentation::WrappedSource,
    recorder::{run_snippet, CombinedTracer, ExecutionOrderRecorder, OutputInterceptor, VariableSnapshotRecorder},
};

/// Runs a snippet on behalf of the engine, one recorder per call.
///
/// Recorders are filled in place, so whatever was recorded before a failure
/// stays available to the caller.
#[auto_impl(&mut, Box)]
pub trait ExecutionBackend {
    /// Run the wrapped snippet under `recorder`
    fn record_snapshots(
        &mut self,
        wrapped: &WrappedSource,
        input: &str,
        config: &TraceConfig,
        recorder: &mut VariableSnapshotRecorder,
    ) -> ScriptResult<()>;

    /// Run the raw snippet under `recorder`
    fn record_order(
        &mut self,
        source: &str,
        input: &str,
        config: &TraceConfig,
        recorder: &mut ExecutionOrderRecorder,
    ) -> ScriptResult<()>;

    /// Run the raw snippet with its output sent to `interceptor`
    fn capture_output(
        &mut self,
        source: &str,
        input: &str,
        config: &TraceConfig,
        interceptor: &mut OutputInterceptor,
    ) -> ScriptResult<()>;

    /// Run the wrapped snippet once under `tracer`, output sent to `interceptor`
    fn record_combined(
        &mut self,
        wrapped: &WrappedSource,
        input: &str,
        config: &TraceConfig,
        tracer: &mut CombinedTracer,
        interceptor: &mut OutputInterceptor,
    ) -> ScriptResult<()>;
}

/// Backend running snippets on the embedded interpreter.
#[derive(Debug, Default, Clone, Copy)]
pub struct InterpreterBackend;

impl ExecutionBackend for InterpreterBackend {
    fn record_snapshots(
        &mut self,
        wrapped: &WrappedSource,
        input: &str,
        config: &TraceConfig,
        recorder: &mut VariableSnapshotRecorder,
    ) -> ScriptResult<()> {
        recorder.record(wrapped, input, config)
    }

    fn record_order(
        &mut self,
        source: &str,
        input: &str,
        config: &TraceConfig,
        recorder: &mut ExecutionOrderRecorder,
    ) -> ScriptResult<()> {
        recorder.record(source, input, config)
    }

    fn capture_output(
        &mut self,
        source: &str,
        input: &str,
        config: &TraceConfig,
        interceptor: &mut OutputInterceptor,
    ) -> ScriptResult<()> {
        interceptor.capture(source, input, config)
    }

    fn record_combined(
        &mut self,
        wrapped: &WrappedSource,
        input: &str,
        config: &TraceConfig,
        tracer: &mut CombinedTracer,
        interceptor: &mut OutputInterceptor,
    ) -> ScriptResult<()> {
        run_snippet(wrapped.code(), input, config, Some(tracer), Some(interceptor))
    }
}
