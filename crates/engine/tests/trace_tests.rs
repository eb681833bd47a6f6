use tracetool_engine::{
    CodeTracer, CombinedTracer, ExecutionBackend, ExecutionOrderRecorder, InterpreterBackend, OutputInterceptor,
    Pass, TraceConfig, TraceError, TraceStrategy, VariableSnapshotRecorder, WrappedSource,
};
use tracetool_runtime::{FrameView, ScopeKind, ScriptResult, Tracer};
use tracing::info;

fn column(tracer: &CodeTracer, variable: &str) -> Vec<String> {
    let table = tracer.trace_table().unwrap();
    (0..table.len()).map(|row| table.value(row, variable).unwrap().to_string()).collect()
}

fn lines(tracer: &CodeTracer) -> Vec<usize> {
    tracer.trace_table().unwrap().rows().iter().map(|row| row.line).collect()
}

#[test]
fn test_straight_line_snippet_has_one_row_per_statement() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut tracer = CodeTracer::new("a = 1\nb = a + 1\nprint(b)", "");
    let table = tracer.generate_trace()?;

    assert_eq!(table.len(), 3);
    assert_eq!(table.header(), vec!["Line", "(main)a", "(main)b", "OUTPUT"]);
    assert_eq!(table.rows()[0].cells(), vec!["1", "1", "", ""]);
    assert_eq!(table.rows()[1].cells(), vec!["2", "1", "2", ""]);
    assert_eq!(table.rows()[2].cells(), vec!["3", "1", "2", "2\n"]);
    assert_eq!(tracer.execution_order().as_slice(), &[1, 2, 3]);
    Ok(())
}

#[test]
fn test_every_row_has_every_cell() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let source = "\
def area(w, h):
    result = w * h
    return result
total = 0
for side in range(1, 4):
    total += area(side, side)
print('total', total)";
    let mut tracer = CodeTracer::new(source, "");
    let table = tracer.generate_trace()?;

    assert!(!table.is_empty());
    for row in table.to_rows() {
        assert_eq!(row.len(), table.width());
    }
    assert!(table.variables().contains(&"(area)result".to_string()));
    assert!(table.variables().contains(&"(main)total".to_string()));
    assert!(!table.variables().iter().any(|name| name.ends_with(")area")));
    Ok(())
}

#[test]
fn test_tracing_twice_gives_the_same_table() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut tracer = CodeTracer::new("n = int(input())\nwhile n > 0:\n    print(n)\n    n -= 1", "3\n");
    let first = tracer.generate_trace()?.clone();
    let second = tracer.generate_trace()?.clone();
    assert_eq!(first, second);
    assert_eq!(tracer.output_lines().output_for(3), "3\n2\n1\n");
    Ok(())
}

#[test]
fn test_snapshots_are_not_changed_by_later_assignments() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut tracer = CodeTracer::new("x = 1\nx = 2", "");
    tracer.generate_trace()?;
    assert_eq!(column(&tracer, "(main)x"), vec!["1", "2"]);

    let mut tracer = CodeTracer::new("xs = [1]\nxs.append(2)", "");
    tracer.generate_trace()?;
    assert_eq!(column(&tracer, "(main)xs"), vec!["[1]", "[1, 2]"]);
    Ok(())
}

#[test]
fn test_output_is_attributed_to_its_line() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut tracer = CodeTracer::new("x = 1\nprint(\"A\")\ny = 2", "");
    tracer.generate_trace()?;

    assert_eq!(tracer.output_lines().get(2), Some("A\n"));
    assert_eq!(tracer.output_lines().len(), 1);
    let outputs: Vec<_> = tracer.trace_table().unwrap().rows().iter().map(|row| row.output.as_str()).collect();
    assert_eq!(outputs, vec!["", "A\n", ""]);
    Ok(())
}

#[test]
fn test_last_statement_effect_is_captured() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut tracer = CodeTracer::new("x = 1", "");
    let table = tracer.generate_trace()?;
    assert_eq!(table.len(), 1);
    assert_eq!(table.value(0, "(main)x"), Some("1"));
    Ok(())
}

#[test]
fn test_loop_iterations_get_their_own_rows() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut tracer = CodeTracer::new("for i in [1, 2]:\n    y = i", "");
    tracer.generate_trace()?;
    assert_eq!(lines(&tracer), vec![1, 2, 1, 2, 1]);
    assert_eq!(column(&tracer, "(main)y"), vec!["", "1", "1", "2", "2"]);
    assert_eq!(column(&tracer, "(main)i"), vec!["1", "1", "2", "2", "2"]);
    Ok(())
}

#[test]
fn test_scripted_input_is_replayed_in_every_pass() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut tracer = CodeTracer::new("name = input('Name: ')\nprint('Hi ' + name)", "Bob\n");
    let table = tracer.generate_trace()?;
    assert_eq!(table.rows()[0].cells(), vec!["1", "Bob", "Name: "]);
    assert_eq!(table.rows()[1].cells(), vec!["2", "Bob", "Hi Bob\n"]);
    Ok(())
}

#[test]
fn test_objects_render_as_attribute_tables() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let source = "\
class Point:
    def __init__(self, x, y):
        self.x = x
        self.y = y
p = Point(1, 2)";
    let mut tracer = CodeTracer::new(source, "");
    let table = tracer.generate_trace()?;
    let last = table.len() - 1;
    assert_eq!(table.value(last, "(main)p"), Some("+---+---+<br>| x | y |<br>+---+---+<br>| 1 | 2 |<br>+---+---+"));
    assert!(table.variables().contains(&"(__init__)self".to_string()));
    assert!(!table.variables().iter().any(|name| name.contains("__init__)__")));
    Ok(())
}

#[test]
fn test_render_is_a_grid() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut tracer = CodeTracer::new("x = 1\nprint(x)", "");
    assert_eq!(tracer.render(), "");
    tracer.generate_trace()?;

    let expected = "\
+------+---------+--------+
| Line | (main)x | OUTPUT |
+======+=========+========+
| 1    | 1       |        |
+------+---------+--------+
| 2    | 1       | 1      |
|      |         |        |
+------+---------+--------+";
    assert_eq!(tracer.render(), expected);
    assert_eq!(tracer.to_string(), expected);
    Ok(())
}

#[test]
fn test_calls_log_is_kept() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut tracer = CodeTracer::new("def f():\n    return 1\nf()\nf()", "");
    tracer.generate_trace()?;
    assert_eq!(
        tracer.calls_log(),
        &["Calling function: <module>", "Calling function: main", "Calling function: f", "Calling function: f"]
    );
    Ok(())
}

#[test]
fn test_snippet_error_names_the_pass() {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut tracer = CodeTracer::new("x = 1\ny = x / 0", "");
    let err = tracer.generate_trace().unwrap_err();
    match err {
        TraceError::Execution { pass, source } => {
            assert_eq!(pass, Pass::Snapshot);
            assert!(source.is("ZeroDivisionError"));
            assert_eq!(source.line(), Some(2));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(tracer.trace_table().is_none());
    assert_eq!(tracer.render(), "");
    assert!(!tracer.snapshots().is_empty());
}

#[test]
fn test_missing_input_is_an_error() {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let err = CodeTracer::new("x = input()", "").generate_trace().unwrap_err();
    assert!(matches!(err, TraceError::Execution { pass: Pass::Snapshot, ref source } if source.is("EOFError")));
}

#[test]
fn test_order_pass_failure_keeps_partial_order() {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    // Only valid inside the wrapper, so the raw run is the first to fail.
    let mut tracer = CodeTracer::new("x = 1\nreturn", "");
    let err = tracer.generate_trace().unwrap_err();
    assert_eq!(err.pass(), Some(Pass::Order));
    match &err {
        TraceError::Execution { source, .. } => {
            assert!(source.is("SyntaxError"));
            assert_eq!(source.line(), Some(2));
        }
        other => panic!("unexpected error: {other}"),
    }
    // Compilation fails before any line runs.
    assert!(tracer.execution_order().as_slice().is_empty());
    assert!(!tracer.snapshots().is_empty());
    assert!(tracer.trace_table().is_none());
}

#[test]
fn test_failed_trace_clears_previous_table() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut tracer = CodeTracer::new("x = int(input())", "1\n");
    tracer.generate_trace()?;
    assert!(tracer.trace_table().is_some());

    let mut tracer = tracer.with_config(TraceConfig::default().with_max_call_depth(1));
    assert!(tracer.generate_trace().is_err());
    assert!(tracer.trace_table().is_none());
    Ok(())
}

#[test]
fn test_recursion_at_the_default_call_depth() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let source = "def depth(n):\n    if n == 0:\n        return 0\n    return depth(n - 1) + 1\nx = depth(500)";
    for strategy in [TraceStrategy::MultiPass, TraceStrategy::SinglePass] {
        let tracer = trace_with(strategy, source, "")?;
        let table = tracer.trace_table().unwrap();
        assert_eq!(table.value(table.len() - 1, "(main)x"), Some("500"));
        assert_eq!(tracer.calls_log().len(), 503);
    }
    Ok(())
}

#[test]
fn test_unbounded_recursion_is_a_script_error() {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut tracer = CodeTracer::new("def f(n):\n    return f(n + 1)\nf(0)", "");
    let err = tracer.generate_trace().unwrap_err();
    assert!(matches!(
        err,
        TraceError::Execution { pass: Pass::Snapshot, ref source } if source.is("RecursionError")
    ));

    let config = TraceConfig::default().with_max_call_depth(16);
    let mut tracer = CodeTracer::new("def f(n):\n    return f(n + 1)\nf(0)", "").with_config(config);
    let err = tracer.generate_trace().unwrap_err();
    assert!(matches!(err, TraceError::Execution { ref source, .. } if source.is("RecursionError")));
}

#[test]
fn test_huge_sequence_repeat_is_a_script_error() {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    for source in ["s = 'ab' * 4611686018427387904", "x = 1\nxs = [0] * 4611686018427387904"] {
        let mut tracer = CodeTracer::new(source, "");
        let err = tracer.generate_trace().unwrap_err();
        match err {
            TraceError::Execution { pass, source: script } => {
                assert_eq!(pass, Pass::Snapshot);
                assert!(script.is("OverflowError") || script.is("MemoryError"), "{script}");
                assert_eq!(script.line(), Some(source.split('\n').count()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn test_python_constructs_are_traced() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let source = "\
import math
squares = [n * n for n in range(4)]
seen = {1, 2, 2}
half = lambda v: v / 2
try:
    bad = 1 / 0
except ZeroDivisionError:
    bad = None
def evens(limit):
    n = 0
    while n < limit:
        yield n
        n += 2
label = '%s=%d' % ('root', math.isqrt(49))
print(squares, len(seen), half(5), list(evens(5)), bad, label)";
    let mut tracer = CodeTracer::new(source, "");
    let table = tracer.generate_trace()?;
    let last = table.len() - 1;
    assert_eq!(table.value(last, "(main)squares"), Some("[0, 1, 4, 9]"));
    assert_eq!(table.value(last, "(main)seen"), Some("{1, 2}"));
    assert_eq!(table.value(last, "(main)bad"), Some("None"));
    assert_eq!(table.value(last, "(main)label"), Some("root=7"));
    assert!(table.variables().contains(&"(evens)n".to_string()));
    assert_eq!(tracer.output_lines().get(15), Some("[0, 1, 4, 9] 2 2.5 [0, 2, 4] None root=7\n"));
    Ok(())
}

#[test]
fn test_while_else_runs_its_else_branch() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let source = "n = 2\nwhile n > 0:\n    n -= 1\nelse:\n    done = True\nprint(n, done)";
    let mut tracer = CodeTracer::new(source, "");
    tracer.generate_trace()?;
    assert_eq!(tracer.output_lines().get(6), Some("0 True\n"));
    assert_eq!(tracer.execution_order().as_slice().last(), Some(&6));
    Ok(())
}

/// Delegates to the interpreter but records only `keep` empty snapshots.
struct ShortSnapshots {
    keep: usize,
}

impl ExecutionBackend for ShortSnapshots {
    fn record_snapshots(
        &mut self,
        _wrapped: &WrappedSource,
        _input: &str,
        _config: &TraceConfig,
        recorder: &mut VariableSnapshotRecorder,
    ) -> ScriptResult<()> {
        for line in 0..self.keep {
            recorder.line(&FrameView::new("main", ScopeKind::Function, line + 1, 2, &[]));
        }
        Ok(())
    }

    fn record_order(
        &mut self,
        source: &str,
        input: &str,
        config: &TraceConfig,
        recorder: &mut ExecutionOrderRecorder,
    ) -> ScriptResult<()> {
        InterpreterBackend.record_order(source, input, config, recorder)
    }

    fn capture_output(
        &mut self,
        source: &str,
        input: &str,
        config: &TraceConfig,
        interceptor: &mut OutputInterceptor,
    ) -> ScriptResult<()> {
        InterpreterBackend.capture_output(source, input, config, interceptor)
    }

    fn record_combined(
        &mut self,
        wrapped: &WrappedSource,
        input: &str,
        config: &TraceConfig,
        tracer: &mut CombinedTracer,
        interceptor: &mut OutputInterceptor,
    ) -> ScriptResult<()> {
        InterpreterBackend.record_combined(wrapped, input, config, tracer, interceptor)
    }
}

#[test]
fn test_short_snapshot_log_is_divergence() {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut tracer = CodeTracer::new("a = 1\nb = 2\nc = 3", "").with_backend(ShortSnapshots { keep: 4 });
    let err = tracer.generate_trace().unwrap_err();
    assert!(matches!(err, TraceError::Divergence { needed: 3, available: 1, offset: 3 }));
    assert_eq!(err.pass(), None);
    assert!(tracer.trace_table().is_none());
    assert_eq!(tracer.snapshots().len(), 4);
}

#[test]
fn test_backend_can_be_borrowed() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut backend = ShortSnapshots { keep: 6 };
    let mut tracer = CodeTracer::new("a = 1\nb = 2", "").with_backend(&mut backend);
    let table = tracer.generate_trace()?;
    assert_eq!(table.len(), 2);
    assert!(table.variables().is_empty());
    Ok(())
}

fn trace_with(strategy: TraceStrategy, source: &str, input: &str) -> eyre::Result<CodeTracer> {
    let mut tracer =
        CodeTracer::new(source, input).with_config(TraceConfig::default().with_strategy(strategy));
    tracer.generate_trace()?;
    Ok(tracer)
}

#[test]
fn test_single_pass_matches_multi_pass() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let snippets = [
        ("x = 1", ""),
        ("for i in [1, 2]:\n    y = i\nprint(y)", ""),
        ("def sq(n):\n    return n * n\nr = sq(int(input()))\nprint('r =', r)", "7\n"),
        ("class C:\n    def __init__(self):\n        self.v = [1]\nc = C()\nc.v.append(2)\nprint(c.v)", ""),
        ("n = 3\nwhile n:\n    if n % 2:\n        print(n, 'odd')\n    else:\n        print(n, 'even')\n    n -= 1", ""),
    ];
    for (source, input) in snippets {
        let multi = trace_with(TraceStrategy::MultiPass, source, input)?;
        let single = trace_with(TraceStrategy::SinglePass, source, input)?;
        assert_eq!(multi.trace_table(), single.trace_table(), "tables differ for {source:?}");
        assert_eq!(multi.execution_order(), single.execution_order());
        assert_eq!(multi.output_lines(), single.output_lines());
        assert_eq!(multi.calls_log(), single.calls_log());
    }
    Ok(())
}

#[test]
fn test_single_pass_error_is_reported_as_combined() {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut tracer = CodeTracer::new("a = 1\nb = a + 'x'", "")
        .with_config(TraceConfig::default().with_strategy(TraceStrategy::SinglePass));
    let err = tracer.generate_trace().unwrap_err();
    match err {
        TraceError::Execution { pass, source } => {
            assert_eq!(pass, Pass::Combined);
            assert!(source.is("TypeError"));
            assert_eq!(source.line(), Some(2));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(tracer.execution_order().as_slice(), &[1, 2]);
}

#[test]
fn test_single_pass_needs_no_configured_offset() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let config = TraceConfig::default().with_strategy(TraceStrategy::SinglePass).with_bootstrap_offset(0);
    let mut tracer = CodeTracer::new("x = 1\nx += 1", "").with_config(config);
    tracer.generate_trace()?;
    assert_eq!(column(&tracer, "(main)x"), vec!["1", "2"]);
    Ok(())
}

#[test]
fn test_table_exports_to_json() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut tracer = CodeTracer::new("x = 5", "");
    let json = tracer.generate_trace()?.to_json()?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(value["rows"][0]["line"], 1);
    assert_eq!(value["rows"][0]["values"][0], "5");
    Ok(())
}
