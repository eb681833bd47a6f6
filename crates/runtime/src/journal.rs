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

//! Event journal of a single snippet run.

use crate::hook::{FrameRecord, OutputSink, Tracer};

/// Something the snippet did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A snippet frame started or resumed
    Call(FrameRecord),
    /// A line is about to run
    Line(FrameRecord),
    /// A snippet frame returned, yielded or unwound
    Return(FrameRecord),
    /// Text written to standard output
    Write(FrameRecord, String),
}

/// Events of one run in the order they happened.
///
/// Hooks are fed by [`Journal::replay`] once the run has stopped, so they
/// never execute while the interpreter is inside the snippet.
#[derive(Debug, Default)]
pub struct Journal {
    events: Vec<Event>,
    depth: usize,
}

impl Journal {
    /// Append an event
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Snippet frames currently on the stack
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn enter(&mut self) -> usize {
        self.depth += 1;
        self.depth
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Recorded events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Deliver every event, in order, to `tracer` and `sink`
    pub fn replay(&self, mut tracer: Option<&mut (dyn Tracer + '_)>, mut sink: Option<&mut (dyn OutputSink + '_)>) {
        for event in &self.events {
            match event {
                Event::Call(frame) => {
                    if let Some(tracer) = tracer.as_deref_mut() {
                        tracer.call(&frame.view());
                    }
                }
                Event::Line(frame) => {
                    if let Some(tracer) = tracer.as_deref_mut() {
                        tracer.line(&frame.view());
                    }
                }
                Event::Return(frame) => {
                    if let Some(tracer) = tracer.as_deref_mut() {
                        tracer.ret(&frame.view());
                    }
                }
                Event::Write(frame, text) => {
                    if let Some(sink) = sink.as_deref_mut() {
                        sink.write(&frame.view(), text);
                    }
                }
            }
        }
        if let Some(sink) = sink {
            sink.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::{FrameView, ScopeKind};

    fn frame(name: &str, line: usize) -> FrameRecord {
        FrameRecord { name: name.into(), kind: ScopeKind::Function, line, depth: 1, locals: Vec::new() }
    }

    #[derive(Default)]
    struct Seen(Vec<String>);

    impl Tracer for Seen {
        fn call(&mut self, frame: &FrameView<'_>) {
            self.0.push(format!("call {}", frame.name()));
        }

        fn line(&mut self, frame: &FrameView<'_>) {
            self.0.push(format!("line {}", frame.line()));
        }
    }

    impl OutputSink for Seen {
        fn write(&mut self, frame: &FrameView<'_>, text: &str) {
            self.0.push(format!("write {} {text:?}", frame.line()));
        }
    }

    #[test]
    fn test_replay_keeps_order() {
        let mut journal = Journal::default();
        journal.push(Event::Call(frame("f", 1)));
        journal.push(Event::Line(frame("f", 2)));
        journal.push(Event::Write(frame("f", 2), "hi".into()));
        journal.push(Event::Return(frame("f", 2)));

        let mut tracer = Seen::default();
        let mut sink = Seen::default();
        journal.replay(Some(&mut tracer), Some(&mut sink));
        assert_eq!(tracer.0, vec!["call f", "line 2"]);
        assert_eq!(sink.0, vec!["write 2 \"hi\""]);
    }

    #[test]
    fn test_depth_never_underflows() {
        let mut journal = Journal::default();
        assert_eq!(journal.enter(), 1);
        journal.leave();
        journal.leave();
        assert_eq!(journal.depth(), 0);
    }
}
