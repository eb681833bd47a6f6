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

//! Instrumentation seams of the runtime
//!
//! A [`Tracer`] observes scope entry, every line event and scope exit. An
//! [`OutputSink`] receives everything the snippet writes to standard output,
//! together with the frame that wrote it. Both see frames through a read-only
//! [`FrameView`] over values that were already turned into text, so an
//! observer can never change the program it watches.

use std::{fmt, io::Write};

/// Kind of scope a frame executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Top level of the snippet
    Module,
    /// Function, lambda or comprehension body
    Function,
    /// Class body
    Class,
}

/// A local value as it looked when it was captured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedValue {
    text: String,
    callable: bool,
    iterator: bool,
    attributes: Option<Vec<(String, String)>>,
}

impl CapturedValue {
    /// Value whose `str()` is `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Default::default() }
    }

    /// Mark the value as callable
    pub fn with_callable(mut self, callable: bool) -> Self {
        self.callable = callable;
        self
    }

    /// Mark the value as an iterator
    pub fn with_iterator(mut self, iterator: bool) -> Self {
        self.iterator = iterator;
        self
    }

    /// Instance attributes as `(name, str(value))` pairs
    pub fn with_attributes(mut self, attributes: Option<Vec<(String, String)>>) -> Self {
        self.attributes = attributes;
        self
    }

    /// `str()` of the value
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Functions, methods, builtins and classes
    pub fn is_callable(&self) -> bool {
        self.callable
    }

    /// Iterators and generators
    pub fn is_iterator(&self) -> bool {
        self.iterator
    }

    /// Attributes of an instance, `None` for values without an attribute dict
    pub fn attributes(&self) -> Option<&[(String, String)]> {
        self.attributes.as_deref()
    }
}

impl fmt::Display for CapturedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A named local binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Variable name
    pub name: String,
    /// Captured value
    pub value: CapturedValue,
}

impl Binding {
    /// Bind `name` to `value`
    pub fn new(name: impl Into<String>, value: CapturedValue) -> Self {
        Self { name: name.into(), value }
    }
}

/// Owned description of a frame at one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRecord {
    /// Code object name: function or class name, `<module>` at top level
    pub name: String,
    /// Kind of scope
    pub kind: ScopeKind,
    /// Line executing in this frame
    pub line: usize,
    /// Snippet frames on the stack, 1 for the module frame
    pub depth: usize,
    /// Locals, empty unless they were requested
    pub locals: Vec<Binding>,
}

impl FrameRecord {
    /// Frame for output written while no snippet frame was running
    pub fn detached() -> Self {
        Self { name: String::new(), kind: ScopeKind::Module, line: 0, depth: 0, locals: Vec::new() }
    }

    /// Borrowed view handed to hooks
    pub fn view(&self) -> FrameView<'_> {
        FrameView::new(&self.name, self.kind, self.line, self.depth, &self.locals)
    }
}

/// Read-only view of a frame handed to hooks.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    name: &'a str,
    kind: ScopeKind,
    line: usize,
    depth: usize,
    locals: &'a [Binding],
}

impl<'a> FrameView<'a> {
    /// Build a view of a frame
    pub fn new(name: &'a str, kind: ScopeKind, line: usize, depth: usize, locals: &'a [Binding]) -> Self {
        Self { name, kind, line, depth, locals }
    }

    /// Scope name: the function or class name, or `<module>` at top level
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Kind of scope
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Line currently executing in this frame
    pub fn line(&self) -> usize {
        self.line
    }

    /// Frame depth, 1 for the module frame
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Local bindings. Module frames expose none.
    pub fn locals(&self) -> impl Iterator<Item = (&'a str, &'a CapturedValue)> {
        self.locals.iter().map(|binding| (binding.name.as_str(), &binding.value))
    }

    /// Look up a single local
    pub fn local(&self, name: &str) -> Option<&'a CapturedValue> {
        self.locals.iter().find(|binding| binding.name == name).map(|binding| &binding.value)
    }
}

/// Observer of execution events.
///
/// All methods default to no-ops so implementors only override what they need.
pub trait Tracer {
    /// A module, function or class body was entered
    fn call(&mut self, _frame: &FrameView<'_>) {}

    /// A new line is about to execute in `frame`
    fn line(&mut self, _frame: &FrameView<'_>) {}

    /// A body is about to be left, normally or by an exception
    fn ret(&mut self, _frame: &FrameView<'_>) {}

    /// Whether line events should carry the frame's locals
    fn wants_locals(&self) -> bool {
        true
    }
}

/// Destination of the snippet's standard output.
pub trait OutputSink {
    /// Receive `text` written while `frame` was executing
    fn write(&mut self, frame: &FrameView<'_>, text: &str);

    /// Flush buffered text. Nothing is buffered by default.
    fn flush(&mut self) {}
}

/// Passes snippet output through to the process stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write(&mut self, _frame: &FrameView<'_>, text: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = stdout.write_all(text.as_bytes()) {
            tracing::warn!("Failed to forward snippet output: {err}");
        }
    }

    fn flush(&mut self) {
        let _ = std::io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_view_exposes_locals() {
        let record = FrameRecord {
            name: "main".into(),
            kind: ScopeKind::Function,
            line: 3,
            depth: 2,
            locals: vec![Binding::new("x", CapturedValue::new("1"))],
        };
        let view = record.view();
        assert_eq!(view.name(), "main");
        assert_eq!(view.line(), 3);
        assert_eq!(view.local("x").map(CapturedValue::text), Some("1"));
        assert!(view.local("y").is_none());
        assert_eq!(view.locals().count(), 1);
    }

    #[test]
    fn test_captured_value_flags() {
        let value = CapturedValue::new("<function f at 0x1>").with_callable(true);
        assert!(value.is_callable() && !value.is_iterator());
        assert_eq!(value.attributes(), None);
        assert_eq!(value.to_string(), "<function f at 0x1>");
    }
}
