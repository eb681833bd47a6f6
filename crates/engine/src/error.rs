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

//! Errors surfaced by trace generation.

use derive_more::Display;
use thiserror::Error;
use tracetool_runtime::ScriptError;

/// A run of the snippet made while generating a trace.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Wrapped run recording variable snapshots
    #[display("snapshot")]
    Snapshot,
    /// Raw run recording the execution order
    #[display("order")]
    Order,
    /// Raw run capturing standard output
    #[display("output")]
    Output,
    /// Single wrapped run recording everything at once
    #[display("combined")]
    Combined,
}

/// Why `generate_trace` failed.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The snippet raised during one of the runs
    #[error("the {pass} pass failed: {source}")]
    Execution {
        /// Run that failed
        pass: Pass,
        /// What the snippet raised
        #[source]
        source: ScriptError,
    },

    /// The runs disagree on the number of line events
    #[error(
        "snapshot log diverged from execution order: {needed} rows need snapshots but only \
         {available} remain after skipping {offset}"
    )]
    Divergence {
        /// Rows in the execution order
        needed: usize,
        /// Snapshots left after the offset
        available: usize,
        /// Leading snapshots skipped
        offset: usize,
    },
}

impl TraceError {
    /// Wrap a script error raised during `pass`
    pub fn execution(pass: Pass, source: ScriptError) -> Self {
        Self::Execution { pass, source }
    }

    /// Run that failed, if the snippet raised
    pub fn pass(&self) -> Option<Pass> {
        match self {
            Self::Execution { pass, .. } => Some(*pass),
            Self::Divergence { .. } => None,
        }
    }
}

/// Result alias for trace generation
pub type TraceResult<T> = Result<T, TraceError>;
