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

//! Trace generation settings.

use serde::{Deserialize, Serialize};
use tracetool_runtime::DEFAULT_MAX_DEPTH;

/// Leading snapshots produced by the wrapper's own bootstrap
pub const DEFAULT_BOOTSTRAP_OFFSET: usize = 3;
/// Name of the procedure the snippet is wrapped in
pub const DEFAULT_WRAPPER_NAME: &str = "main";
/// Statement appended after the snippet so its last line is observed
pub const DEFAULT_SENTINEL: &str = "_finished = True";

/// How the artifacts of a trace are collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceStrategy {
    /// Three runs: snapshots from the wrapped snippet, then order and output
    /// from the raw snippet, aligned by [`TraceConfig::bootstrap_offset`]
    #[default]
    MultiPass,
    /// One run of the wrapped snippet recording everything; the alignment
    /// offset is taken from the position of the wrapper's entry event
    SinglePass,
}

/// Configuration of a [`crate::CodeTracer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Collection strategy
    pub strategy: TraceStrategy,
    /// Snapshots to skip before the first row in [`TraceStrategy::MultiPass`]
    pub bootstrap_offset: usize,
    /// Name of the wrapping procedure
    pub wrapper_name: String,
    /// Trailing statement of the wrapped snippet
    pub sentinel: String,
    /// Forward output of the snapshot and order runs to the process stdout
    pub echo_untraced_output: bool,
    /// Recursion limit while the snippet runs
    pub max_call_depth: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            strategy: TraceStrategy::default(),
            bootstrap_offset: DEFAULT_BOOTSTRAP_OFFSET,
            wrapper_name: DEFAULT_WRAPPER_NAME.into(),
            sentinel: DEFAULT_SENTINEL.into(),
            echo_untraced_output: false,
            max_call_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl TraceConfig {
    /// Set the collection strategy
    pub fn with_strategy(mut self, strategy: TraceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the number of leading snapshots skipped in multi-pass mode
    pub fn with_bootstrap_offset(mut self, offset: usize) -> Self {
        self.bootstrap_offset = offset;
        self
    }

    /// Set the name of the wrapping procedure
    pub fn with_wrapper_name(mut self, name: impl Into<String>) -> Self {
        self.wrapper_name = name.into();
        self
    }

    /// Set the trailing statement of the wrapped snippet
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Forward output of the untraced runs to stdout
    pub fn with_echo_untraced_output(mut self, echo: bool) -> Self {
        self.echo_untraced_output = echo;
        self
    }

    /// Set the recursion limit of the snippet
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}
