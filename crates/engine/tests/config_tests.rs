use tracetool_engine::{TraceConfig, TraceStrategy, DEFAULT_BOOTSTRAP_OFFSET, DEFAULT_SENTINEL, DEFAULT_WRAPPER_NAME};
use tracetool_runtime::DEFAULT_MAX_DEPTH;
use tracing::info;

#[test]
fn test_default_config() {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");
    let config = TraceConfig::default();

    assert_eq!(config.strategy, TraceStrategy::MultiPass);
    assert_eq!(config.bootstrap_offset, DEFAULT_BOOTSTRAP_OFFSET);
    assert_eq!(config.bootstrap_offset, 3);
    assert_eq!(config.wrapper_name, DEFAULT_WRAPPER_NAME);
    assert_eq!(config.sentinel, DEFAULT_SENTINEL);
    assert!(!config.echo_untraced_output);
    assert_eq!(config.max_call_depth, DEFAULT_MAX_DEPTH);
}

#[test]
fn test_config_builders() {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");
    let config = TraceConfig::default()
        .with_strategy(TraceStrategy::SinglePass)
        .with_bootstrap_offset(5)
        .with_wrapper_name("entry")
        .with_sentinel("done = 1")
        .with_echo_untraced_output(true)
        .with_max_call_depth(50);

    assert_eq!(config.strategy, TraceStrategy::SinglePass);
    assert_eq!(config.bootstrap_offset, 5);
    assert_eq!(config.wrapper_name, "entry");
    assert_eq!(config.sentinel, "done = 1");
    assert!(config.echo_untraced_output);
    assert_eq!(config.max_call_depth, 50);
}

#[test]
fn test_config_clone() {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");
    let config = TraceConfig::default().with_wrapper_name("run");

    let cloned = config.clone();

    assert_eq!(config, cloned);
}

#[test]
fn test_config_deserializes_with_defaults() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");
    let config: TraceConfig = serde_json::from_str(r#"{"strategy": "SinglePass", "max_call_depth": 64}"#)?;

    assert_eq!(config.strategy, TraceStrategy::SinglePass);
    assert_eq!(config.max_call_depth, 64);
    assert_eq!(config.wrapper_name, DEFAULT_WRAPPER_NAME);
    assert_eq!(config.bootstrap_offset, DEFAULT_BOOTSTRAP_OFFSET);
    Ok(())
}

#[test]
fn test_custom_wrapper_traces_the_same() -> eyre::Result<()> {
    tracetool_common::logging::ensure_test_logging(None);
    info!("Running test");
    let source = "a = 2\nb = a * a";
    let config = TraceConfig::default().with_wrapper_name("entry").with_sentinel("pass");

    let mut default = tracetool_engine::CodeTracer::new(source, "");
    let mut custom = tracetool_engine::CodeTracer::new(source, "").with_config(config);
    let expected = default.generate_trace()?.rows().to_vec();
    let actual = custom.generate_trace()?;

    assert_eq!(actual.rows().len(), expected.len());
    assert_eq!(actual.value(1, "(entry)b"), Some("4"));
    assert_eq!(default.trace_table().and_then(|t| t.value(1, "(main)b")), Some("4"));
    Ok(())
}
