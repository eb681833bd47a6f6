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

//! The public entry point for running a snippet.
//!
//! # Hooks
//!
//! The tracer and output sink are borrowed for the interpreter's lifetime.
//! Events are journaled while CPython runs the snippet and replayed into
//! them once it stops, so both see everything recorded up to a failure.

use tracing::debug;

use crate::{
    error::ScriptResult,
    hook::{OutputSink, Tracer},
    session::{self, RunOptions},
};

/// Default recursion limit for a run
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Name reported for the top-level scope
pub const MODULE_SCOPE: &str = "<module>";

/// Runs snippets on the embedded interpreter.
///
/// ```ignore
/// let mut order = LineLog::default();
/// Interpreter::new("3\n").with_tracer(&mut order).run_source("x = int(input())")?;
/// ```
pub struct Interpreter<'h> {
    tracer: Option<&'h mut dyn Tracer>,
    stdout: Option<&'h mut dyn OutputSink>,
    input: String,
    max_depth: usize,
}

impl<'h> Interpreter<'h> {
    /// Create an interpreter reading `input` for `input()` calls.
    ///
    /// Output is discarded until a sink is installed with [`Self::with_stdout`].
    pub fn new(input: &str) -> Self {
        Self { tracer: None, stdout: None, input: input.to_owned(), max_depth: DEFAULT_MAX_DEPTH }
    }

    /// Install the line tracer
    pub fn with_tracer(mut self, tracer: &'h mut dyn Tracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Install the standard output sink
    pub fn with_stdout(mut self, sink: &'h mut dyn OutputSink) -> Self {
        self.stdout = Some(sink);
        self
    }

    /// Set the recursion limit
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Compile and run `source` in a fresh `__main__` namespace.
    pub fn run_source(&mut self, source: &str) -> ScriptResult<()> {
        let options = RunOptions {
            trace: self.tracer.is_some(),
            capture_locals: self.tracer.as_deref().is_some_and(|tracer| tracer.wants_locals()),
            recursion_limit: self.max_depth,
        };
        debug!(lines = source.lines().count(), ?options, "Running snippet");

        let (journal, result) = session::execute(source, &self.input, options);
        journal.replay(self.tracer.as_deref_mut(), self.stdout.as_deref_mut());
        if let Err(err) = &result {
            debug!(%err, "Snippet raised");
        }
        result
    }
}
