use tracetool_engine::{format_code_for_tracing, wrap_source, TraceConfig, WrappedSource};
use tracetool_runtime::{Interpreter, ScriptError};
use tracing::info;

#[test]
fn test_format_code_for_tracing() {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let code = "a = 1\nb = 1\nc = a + b";
    let formatted = format_code_for_tracing(code, &TraceConfig::default());
    assert_eq!(formatted, "def main():\n\ta = 1\n\tb = 1\n\tc = a + b\n\t_finished = True");
}

#[test]
fn test_wrap_appends_call() {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let wrapped = wrap_source("x = 1", &TraceConfig::default());
    assert_eq!(wrapped, "def main():\n\tx = 1\n\t_finished = True\nmain()");
}

#[test]
fn test_nested_blocks_stay_nested() {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let source = "for i in range(2):\n    if i:\n        print(i)";
    let wrapped = WrappedSource::new(source, &TraceConfig::default());
    assert_eq!(wrapped.snippet_lines(), 3);
    assert!(wrapped.code().contains("\n\t    if i:\n\t        print(i)\n"));
    assert!(Interpreter::new("").run_source(wrapped.code()).is_ok());
}

#[test]
fn test_blank_lines_are_kept() {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let wrapped = WrappedSource::new("x = 1\n\ny = 2\n", &TraceConfig::default());
    assert_eq!(wrapped.snippet_lines(), 4);
    assert_eq!(wrapped.sentinel_line(), 6);
    assert_eq!(wrapped.to_snippet_line(4), Some(3));
}

#[test]
fn test_errors_map_back_to_snippet_lines() {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");

    let wrapped = WrappedSource::new("a = 1\nb = c", &TraceConfig::default());
    let err = wrapped.to_snippet_error(ScriptError::raised("NameError", "name 'c' is not defined", 3));
    assert_eq!(err.line(), Some(2));

    let outside = wrapped.to_snippet_error(ScriptError::raised("SyntaxError", "bad", 5));
    assert_eq!(outside.line(), Some(5));

    let err = Interpreter::new("").run_source(wrapped.code()).unwrap_err();
    assert!(err.is("NameError"));
    assert_eq!(wrapped.to_snippet_error(err).line(), Some(2));
}
