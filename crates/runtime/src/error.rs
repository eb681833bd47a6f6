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

//! Errors raised while running a snippet.

use thiserror::Error;

/// A snippet run that did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// The snippet raised an exception, or failed to compile
    #[error("{exception} on line {line}: {message}")]
    Raised {
        /// Exception class name, e.g. `ZeroDivisionError`
        exception: String,
        /// `str()` of the exception
        message: String,
        /// Snippet line the exception escaped from (0 when unknown)
        line: usize,
    },

    /// The embedded interpreter could not be prepared or restored
    #[error("embedded interpreter failure: {0}")]
    Interpreter(String),
}

impl ScriptError {
    /// An exception raised by the snippet
    pub fn raised(exception: impl Into<String>, message: impl Into<String>, line: usize) -> Self {
        Self::Raised { exception: exception.into(), message: message.into(), line }
    }

    /// A failure of the host side of a run
    pub fn interpreter(message: impl Into<String>) -> Self {
        Self::Interpreter(message.into())
    }

    /// Exception class name, for errors the snippet raised
    pub fn exception(&self) -> Option<&str> {
        match self {
            Self::Raised { exception, .. } => Some(exception),
            Self::Interpreter(_) => None,
        }
    }

    /// Whether the snippet raised `exception`
    pub fn is(&self, exception: &str) -> bool {
        self.exception() == Some(exception)
    }

    /// Line the exception escaped from
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Raised { line, .. } => Some(*line),
            Self::Interpreter(_) => None,
        }
    }

    /// Renumber the reported line
    pub fn map_line(self, f: impl FnOnce(usize) -> usize) -> Self {
        match self {
            Self::Raised { exception, message, line } => Self::Raised { exception, message, line: f(line) },
            other => other,
        }
    }
}

/// Result alias used throughout the runtime
pub type ScriptResult<T> = Result<T, ScriptError>;
