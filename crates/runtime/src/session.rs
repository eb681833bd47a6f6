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

//! One snippet run on the embedded CPython interpreter.
//!
//! A run compiles the snippet under [`SNIPPET_FILENAME`] and executes it in a
//! fresh `__main__` namespace with three pieces of interpreter state swapped:
//!
//! - `sys.stdin` reads the scripted input from an `io.StringIO`
//! - `sys.stdout` is an [`OutputCapture`] journaling every write
//! - `sys.settrace` installs a [`TraceHook`] journaling call, line and return
//!   events of snippet frames
//!
//! The swap is held by a [`Redirection`] guard that restores the previous
//! state when dropped, on every exit path. Only frames compiled from the
//! snippet are journaled; library code the snippet calls into is invisible.

use std::sync::Arc;

use parking_lot::Mutex;
use pyo3::{
    exceptions::PySyntaxError,
    intern,
    prelude::*,
    types::{PyDict, PyModule},
};
use tracing::{debug, warn};

use crate::{
    error::{ScriptError, ScriptResult},
    hook::{Binding, CapturedValue, FrameRecord, ScopeKind},
    journal::{Event, Journal},
};

/// File name snippet code objects are compiled under
pub const SNIPPET_FILENAME: &str = "<snippet>";

/// Stack reserved for the thread a snippet runs on
pub const RUN_STACK_SIZE: usize = 64 * 1024 * 1024;

/// `co_flags` bit set on function scopes
const CO_OPTIMIZED: u32 = 0x1;

/// Runs swap process-wide interpreter state, so they never overlap.
static RUN_LOCK: Mutex<()> = parking_lot::const_mutex(());

type SharedJournal = Arc<Mutex<Journal>>;

/// What a run should record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunOptions {
    /// Install the trace hook
    pub trace: bool,
    /// Capture locals at line events
    pub capture_locals: bool,
    /// `sys.setrecursionlimit` for the duration of the run
    pub recursion_limit: usize,
}

/// Run `code` with `input` as its standard input.
///
/// The journal holds every event recorded before the run stopped, whether or
/// not it succeeded.
pub(crate) fn execute(code: &str, input: &str, options: RunOptions) -> (Journal, ScriptResult<()>) {
    let _serial = RUN_LOCK.lock();
    let journal = SharedJournal::default();

    let result = std::thread::scope(|scope| {
        let worker = std::thread::Builder::new()
            .name("tracetool-snippet".into())
            .stack_size(RUN_STACK_SIZE)
            .spawn_scoped(scope, || Python::attach(|py| run_in(py, code, input, options, &journal)))
            .map_err(|err| ScriptError::interpreter(format!("failed to start the snippet thread: {err}")))?;
        worker.join().map_err(|_| ScriptError::interpreter("the snippet thread panicked"))?
    });

    let journal = std::mem::take(&mut *journal.lock());
    debug!(events = journal.len(), ok = result.is_ok(), "Snippet run finished");
    (journal, result)
}

fn run_in(py: Python<'_>, code: &str, input: &str, options: RunOptions, journal: &SharedJournal) -> ScriptResult<()> {
    let host = |err: PyErr| ScriptError::interpreter(err.to_string());

    let builtins = py.import(intern!(py, "builtins")).map_err(host)?;
    let compiled = builtins
        .call_method1(intern!(py, "compile"), (code, SNIPPET_FILENAME, "exec"))
        .map_err(|err| script_error(py, &err))?;

    let globals = PyDict::new(py);
    globals.set_item(intern!(py, "__name__"), "__main__").map_err(host)?;

    let stdin = py
        .import(intern!(py, "io"))
        .and_then(|io| io.call_method1(intern!(py, "StringIO"), (input,)))
        .map_err(host)?;
    let stdout = Bound::new(py, OutputCapture { journal: journal.clone() }).map_err(host)?;
    let hook = if options.trace {
        let hook = TraceHook { journal: journal.clone(), capture_locals: options.capture_locals };
        Some(Bound::new(py, hook).map_err(host)?.into_any())
    } else {
        None
    };

    let redirection =
        Redirection::install(py, stdin, stdout.into_any(), hook, options.recursion_limit).map_err(host)?;
    let outcome = builtins.call_method1(intern!(py, "exec"), (compiled, &globals));
    drop(redirection);

    outcome.map(drop).map_err(|err| script_error(py, &err))
}

/// Interpreter state swapped in for a run, restored on drop.
struct Redirection<'py> {
    sys: Bound<'py, PyModule>,
    stdin: Bound<'py, PyAny>,
    stdout: Bound<'py, PyAny>,
    recursion_limit: Bound<'py, PyAny>,
    traced: bool,
}

impl<'py> Redirection<'py> {
    fn install(
        py: Python<'py>,
        stdin: Bound<'py, PyAny>,
        stdout: Bound<'py, PyAny>,
        hook: Option<Bound<'py, PyAny>>,
        recursion_limit: usize,
    ) -> PyResult<Self> {
        let sys = py.import(intern!(py, "sys"))?;
        let guard = Self {
            stdin: sys.getattr(intern!(py, "stdin"))?,
            stdout: sys.getattr(intern!(py, "stdout"))?,
            recursion_limit: sys.call_method0(intern!(py, "getrecursionlimit"))?,
            traced: hook.is_some(),
            sys,
        };

        guard.sys.setattr(intern!(py, "stdin"), stdin)?;
        guard.sys.setattr(intern!(py, "stdout"), stdout)?;
        guard.sys.call_method1(intern!(py, "setrecursionlimit"), (recursion_limit,))?;
        if let Some(hook) = hook {
            guard.sys.call_method1(intern!(py, "settrace"), (hook,))?;
        }
        Ok(guard)
    }

    fn restore(&self) -> PyResult<()> {
        let py = self.sys.py();
        if self.traced {
            self.sys.call_method1(intern!(py, "settrace"), (py.None(),))?;
        }
        self.sys.setattr(intern!(py, "stdin"), &self.stdin)?;
        self.sys.setattr(intern!(py, "stdout"), &self.stdout)?;
        self.sys.call_method1(intern!(py, "setrecursionlimit"), (&self.recursion_limit,))?;
        Ok(())
    }
}

impl Drop for Redirection<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            warn!(%err, "Failed to restore interpreter state after a snippet run");
        }
    }
}

/// The `sys.settrace` callback.
#[pyclass(module = "tracetool", frozen)]
struct TraceHook {
    journal: SharedJournal,
    capture_locals: bool,
}

#[pymethods]
impl TraceHook {
    fn __call__<'py>(
        slf: &Bound<'py, Self>,
        frame: &Bound<'py, PyAny>,
        event: &str,
        _arg: &Bound<'py, PyAny>,
    ) -> Option<Bound<'py, PyAny>> {
        match slf.get().observe(frame, event) {
            Ok(true) => Some(slf.clone().into_any()),
            Ok(false) => None,
            Err(err) => {
                // An exception escaping a trace function would uninstall it.
                warn!(%err, event, "Failed to read a snippet frame");
                Some(slf.clone().into_any())
            }
        }
    }
}

impl TraceHook {
    /// Journal `event`. Returns whether `frame` belongs to the snippet.
    fn observe(&self, frame: &Bound<'_, PyAny>, event: &str) -> PyResult<bool> {
        let py = frame.py();
        let code = frame.getattr(intern!(py, "f_code"))?;
        if !is_snippet_code(&code)? {
            return Ok(false);
        }

        // Locals are rendered before locking: `str()` may run snippet code that prints.
        let depth = self.journal.lock().depth();
        match event {
            "call" => {
                let record = frame_record(frame, &code, depth + 1, false)?;
                let mut journal = self.journal.lock();
                journal.enter();
                journal.push(Event::Call(record));
            }
            "line" => {
                let record = frame_record(frame, &code, depth, self.capture_locals)?;
                self.journal.lock().push(Event::Line(record));
            }
            "return" => {
                let record = frame_record(frame, &code, depth, false)?;
                let mut journal = self.journal.lock();
                journal.push(Event::Return(record));
                journal.leave();
            }
            _ => {}
        }
        Ok(true)
    }
}

/// Replacement for `sys.stdout`.
#[pyclass(module = "tracetool", frozen)]
struct OutputCapture {
    journal: SharedJournal,
}

#[pymethods]
impl OutputCapture {
    fn write(&self, py: Python<'_>, text: &str) -> usize {
        let frame = writing_frame(py).unwrap_or_else(|err| {
            warn!(%err, "Could not locate the frame that wrote output");
            FrameRecord::detached()
        });
        self.journal.lock().push(Event::Write(frame, text.to_owned()));
        text.chars().count()
    }

    fn flush(&self) {}

    #[getter]
    fn encoding(&self) -> &'static str {
        "utf-8"
    }
}

/// The innermost snippet frame on the current stack.
fn writing_frame(py: Python<'_>) -> PyResult<FrameRecord> {
    let sys = py.import(intern!(py, "sys"))?;
    let mut cursor = sys.call_method0(intern!(py, "_getframe"))?;
    let mut innermost = None;
    let mut depth = 0;
    while !cursor.is_none() {
        let code = cursor.getattr(intern!(py, "f_code"))?;
        if is_snippet_code(&code)? {
            depth += 1;
            if innermost.is_none() {
                innermost = Some((cursor.clone(), code));
            }
        }
        cursor = cursor.getattr(intern!(py, "f_back"))?;
    }
    match innermost {
        Some((frame, code)) => frame_record(&frame, &code, depth, false),
        None => Ok(FrameRecord::detached()),
    }
}

fn is_snippet_code(code: &Bound<'_, PyAny>) -> PyResult<bool> {
    code.getattr(intern!(code.py(), "co_filename"))?.eq(SNIPPET_FILENAME)
}

fn frame_record(
    frame: &Bound<'_, PyAny>,
    code: &Bound<'_, PyAny>,
    depth: usize,
    with_locals: bool,
) -> PyResult<FrameRecord> {
    let py = frame.py();
    let name: String = code.getattr(intern!(py, "co_name"))?.extract()?;
    let flags: u32 = code.getattr(intern!(py, "co_flags"))?.extract()?;
    let line = frame.getattr(intern!(py, "f_lineno"))?.extract::<Option<usize>>()?.unwrap_or(0);
    let kind = scope_kind(&name, flags);
    let locals = if with_locals && kind != ScopeKind::Module {
        capture_locals(&frame.getattr(intern!(py, "f_locals"))?)?
    } else {
        Vec::new()
    };
    Ok(FrameRecord { name, kind, line, depth, locals })
}

fn scope_kind(name: &str, flags: u32) -> ScopeKind {
    if flags & CO_OPTIMIZED != 0 {
        ScopeKind::Function
    } else if name == "<module>" {
        ScopeKind::Module
    } else {
        ScopeKind::Class
    }
}

fn capture_locals(locals: &Bound<'_, PyAny>) -> PyResult<Vec<Binding>> {
    let items = locals.call_method0(intern!(locals.py(), "items"))?;
    items
        .try_iter()?
        .map(|item| {
            let (name, value): (String, Bound<'_, PyAny>) = item?.extract()?;
            Ok(Binding::new(name, capture_value(&value)))
        })
        .collect()
}

/// Render `value` into its owned form.
fn capture_value(value: &Bound<'_, PyAny>) -> CapturedValue {
    let py = value.py();
    let callable = value.is_callable();
    let iterator = value.hasattr(intern!(py, "__next__")).unwrap_or(false);
    let attributes = if callable || value.is_instance_of::<PyModule>() { None } else { instance_attributes(value) };
    CapturedValue::new(text_of(value))
        .with_callable(callable)
        .with_iterator(iterator)
        .with_attributes(attributes)
}

fn instance_attributes(value: &Bound<'_, PyAny>) -> Option<Vec<(String, String)>> {
    let py = value.py();
    let dict = value.getattr(intern!(py, "__dict__")).ok()?;
    let items = dict.call_method0(intern!(py, "items")).ok()?;
    items
        .try_iter()
        .ok()?
        .map(|item| {
            let (name, attribute): (Bound<'_, PyAny>, Bound<'_, PyAny>) = item.ok()?.extract().ok()?;
            Some((text_of(&name), text_of(&attribute)))
        })
        .collect()
}

/// `str()` of `value`, falling back to `repr()` and then to its type.
fn text_of(value: &Bound<'_, PyAny>) -> String {
    match value.str().or_else(|_| value.repr()) {
        Ok(text) => text.to_string(),
        Err(err) => {
            let type_name = value.get_type().name().map(|name| name.to_string()).unwrap_or_default();
            warn!(%err, %type_name, "Value cannot be rendered");
            format!("<unprintable {type_name}>")
        }
    }
}

/// Describe an exception that escaped the snippet.
fn script_error(py: Python<'_>, err: &PyErr) -> ScriptError {
    let value = err.value(py);
    let exception =
        value.get_type().name().map(|name| name.to_string()).unwrap_or_else(|_| "Exception".to_owned());

    if err.is_instance_of::<PySyntaxError>(py) {
        let message = value
            .getattr(intern!(py, "msg"))
            .and_then(|msg| msg.extract::<String>())
            .unwrap_or_else(|_| text_of(value.as_any()));
        let line = value
            .getattr(intern!(py, "lineno"))
            .and_then(|line| line.extract::<Option<usize>>())
            .ok()
            .flatten()
            .unwrap_or(0);
        return ScriptError::raised(exception, message, line);
    }

    let line = err.traceback(py).map(|tb| raising_line(tb.as_any())).unwrap_or(0);
    ScriptError::raised(exception, text_of(value.as_any()), line)
}

/// Line of the innermost snippet frame in a traceback.
fn raising_line(traceback: &Bound<'_, PyAny>) -> usize {
    let py = traceback.py();
    let mut line = 0;
    let mut cursor = traceback.clone();
    loop {
        let in_snippet = cursor
            .getattr(intern!(py, "tb_frame"))
            .and_then(|frame| frame.getattr(intern!(py, "f_code")))
            .and_then(|code| is_snippet_code(&code))
            .unwrap_or(false);
        if in_snippet {
            line = cursor.getattr(intern!(py, "tb_lineno")).and_then(|l| l.extract()).unwrap_or(line);
        }
        match cursor.getattr(intern!(py, "tb_next")) {
            Ok(next) if !next.is_none() => cursor = next,
            _ => break,
        }
    }
    line
}
