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

//! Recorders attached to the interpreter while the snippet runs.
//!
//! - [`ExecutionOrderRecorder`] - line numbers in execution order
//! - [`VariableSnapshotRecorder`] - rendered, filtered locals at every line event
//! - [`OutputInterceptor`] - standard output attributed to the writing line
//! - [`CombinedTracer`] - order and snapshots from one wrapped run

mod combined;
mod order;
mod output;
mod snapshot;

pub use combined::*;
pub use order::*;
pub use output::*;
pub use snapshot::*;

use tracetool_runtime::{Interpreter, OutputSink, ScriptResult, StdoutSink, Tracer};

use crate::config::TraceConfig;

/// Run `code` once with `tracer` installed and output sent to `sink`.
///
/// Without a sink, output is forwarded to stdout when the configuration asks
/// for it and discarded otherwise.
pub(crate) fn run_snippet<'h>(
    code: &str,
    input: &str,
    config: &TraceConfig,
    tracer: Option<&'h mut dyn Tracer>,
    sink: Option<&'h mut dyn OutputSink>,
) -> ScriptResult<()> {
    let mut echo = StdoutSink;
    let mut interpreter = Interpreter::new(input).with_max_depth(config.max_call_depth);
    if let Some(tracer) = tracer {
        interpreter = interpreter.with_tracer(tracer);
    }
    match sink {
        Some(sink) => interpreter = interpreter.with_stdout(sink),
        None if config.echo_untraced_output => interpreter = interpreter.with_stdout(&mut echo),
        None => {}
    }
    interpreter.run_source(code)
}
