// tests/store_persistence.rs

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use sigdispatch::config::{ConfigDocument, load_config, load_config_with};
use sigdispatch::engine::DispatchReport;
use sigdispatch::errors::SigdispatchError;
use sigdispatch::fs::mock::MockFileSystem;
use sigdispatch::store::DataStore;
use sigdispatch::types::{LoadMode, Value};
use sigdispatch_test_utils::builders::{DocumentBuilder, EventBuilder};
use sigdispatch_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn reactive_store() -> DocumentBuilder {
    DocumentBuilder::new()
        .target("notify", "/bin/notify")
        .target("audit", "/bin/audit")
        .event(
            "on_change",
            EventBuilder::new().target("notify").dynamic("value").dynamic("to"),
        )
        .event("on_read", EventBuilder::new().target("audit").dynamic("value"))
        .bind_when("updated_value", "on_change", &[("value", "!secret")])
        .bind("retrieved_value", "on_read")
        .environment("greeting", "hello")
}

#[test]
fn put_then_get_returns_value_and_emits_signals() {
    init_tracing();

    let mut dispatcher = reactive_store().dispatcher();

    let step = dispatcher.put_value("speed", Value::Integer(12));
    assert_eq!(step.launches.len(), 1);
    assert_eq!(step.launches[0].target, "notify");
    assert_eq!(step.launches[0].args, vec!["speed", "12"]);

    let (value, step) = dispatcher.get_value("speed");
    assert_eq!(value, Some(Value::Integer(12)));
    assert_eq!(step.launches[0].target, "audit");
    assert_eq!(step.launches[0].args, vec!["speed"]);
}

#[test]
fn get_of_missing_key_still_emits_retrieved_value() {
    let dispatcher = reactive_store().dispatcher();

    let (value, step) = dispatcher.get_value("nope");
    assert_eq!(value, None);
    assert!(!dispatcher.store().contains_key("nope"));
    assert_eq!(step.launches.len(), 1);
}

#[test]
fn updated_value_conditions_apply_to_the_key() {
    let mut dispatcher = reactive_store().dispatcher();

    let step = dispatcher.put_value("secret", Value::from("hunter2"));
    assert!(step.launches.is_empty());
    assert!(matches!(step.reports[0], DispatchReport::Vetoed { .. }));
    assert_eq!(dispatcher.store().get("secret"), Some(&Value::from("hunter2")));
}

#[test]
fn environment_args_see_values_put_earlier() {
    let mut dispatcher = DocumentBuilder::new()
        .target("t", "/bin/t")
        .event("use", EventBuilder::new().target("t").environment("level"))
        .bind("go", "use")
        .dispatcher();

    assert!(dispatcher.signal("go", &Default::default()).launches.is_empty());

    let _ = dispatcher.put_value("level", Value::Integer(5));
    let step = dispatcher.signal("go", &Default::default());
    assert_eq!(step.launches[0].args, vec!["5"]);
}

#[test]
fn post_writes_environment_and_keeps_other_sections() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.toml");
    std::fs::write(&path, reactive_store().to_toml_string())?;

    let loaded = load_config(&path, LoadMode::Strict)?;
    let original_register = loaded.document.table().get("Register").cloned();
    let (mut dispatcher, mut document) = loaded.into_parts();

    let _ = dispatcher.put_value("speed", Value::Integer(12));
    let _ = dispatcher.put_value("tags", Value::List(vec!["a".into(), "b".into()]));
    document.set_environment(dispatcher.store());
    document.save()?;

    let reloaded = load_config(&path, LoadMode::Strict)?;
    assert_eq!(&reloaded.store, dispatcher.store());
    assert_eq!(reloaded.store.get("greeting"), Some(&Value::from("hello")));
    assert_eq!(reloaded.document.table().get("Register").cloned(), original_register);
    assert_eq!(
        reloaded.graph.bindings("updated_value").len(),
        dispatcher.graph().bindings("updated_value").len()
    );
    Ok(())
}

#[test]
fn reload_discards_unsaved_changes() -> TestResult {
    let fs = MockFileSystem::new();
    let path = PathBuf::from("/etc/sigdispatch.toml");
    fs.add_file(&path, reactive_store().to_toml_string());

    let loaded = load_config_with(Arc::new(fs.clone()), &path, LoadMode::Lenient)?;
    let (mut dispatcher, mut document) = loaded.into_parts();

    let _ = dispatcher.put_value("greeting", Value::from("changed"));
    assert_eq!(dispatcher.store().get("greeting"), Some(&Value::from("changed")));

    dispatcher.replace_store(document.reload()?);
    assert_eq!(dispatcher.store().get("greeting"), Some(&Value::from("hello")));
    Ok(())
}

#[test]
fn reload_picks_up_external_edits() -> TestResult {
    let fs = MockFileSystem::new();
    let path = PathBuf::from("/etc/sigdispatch.toml");
    fs.add_file(&path, "[Environment]\nmode = \"a\"\n");

    let mut document = ConfigDocument::load_with(Arc::new(fs.clone()), &path)?;
    assert_eq!(document.environment()?.get("mode"), Some(&Value::from("a")));

    fs.add_file(&path, "[Environment]\nmode = \"b\"\n");
    assert_eq!(document.reload()?.get("mode"), Some(&Value::from("b")));
    assert_eq!(document.environment()?.get("mode"), Some(&Value::from("b")));

    fs.add_file(&path, "[Register]\n");
    assert!(document.reload()?.is_empty());
    assert!(document.environment()?.is_empty());

    fs.add_file(&path, "Environment = 3\n");
    assert!(document.reload().is_err());
    assert!(document.environment()?.is_empty());
    Ok(())
}

#[test]
fn post_keeps_declaration_order_and_comments() -> TestResult {
    let fs = MockFileSystem::new();
    let path = PathBuf::from("/etc/sigdispatch.toml");
    fs.add_file(
        &path,
        r#"# launched in this order
[Register]
a = { path = "/bin/a", args = ["-x"] }
b = "/bin/b"

[Environment]
zeta = 1
alpha = "first"
"#,
    );

    let loaded = load_config_with(Arc::new(fs.clone()), &path, LoadMode::Strict)?;
    let (mut dispatcher, mut document) = loaded.into_parts();
    let _ = dispatcher.put_value("middle", Value::Boolean(true));
    let _ = dispatcher.put_value("zeta", Value::Integer(2));
    document.set_environment(dispatcher.store());
    document.save()?;

    let written = fs.contents(&path).expect("document written");
    assert!(written.starts_with("# launched in this order\n"));

    let reloaded = load_config_with(Arc::new(fs), &path, LoadMode::Strict)?;
    let targets: Vec<_> = reloaded.graph.targets().map(|t| t.name.as_str()).collect();
    assert_eq!(targets, vec!["a", "b"]);

    let keys: Vec<_> = reloaded.store.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["zeta", "alpha", "middle"]);
    assert_eq!(reloaded.store.get("zeta"), Some(&Value::Integer(2)));
    Ok(())
}

#[test]
fn post_to_mock_filesystem_round_trips() -> TestResult {
    let fs = MockFileSystem::new();
    let path = PathBuf::from("/data/state.toml");
    fs.add_file(&path, "[Register]\necho = \"/bin/echo\"\n");

    let mut document = ConfigDocument::load_with(Arc::new(fs.clone()), &path)?;
    let store: DataStore = [("count", Value::Integer(1)), ("on", Value::Boolean(true))]
        .into_iter()
        .collect();
    document.set_environment(&store);
    document.save()?;

    let written = fs.contents(&path).expect("document written");
    assert!(written.contains("[Environment]"));
    assert!(written.contains("echo = \"/bin/echo\""));

    let fresh = ConfigDocument::load_with(Arc::new(fs), &path)?;
    assert_eq!(fresh.environment()?, store);
    Ok(())
}

#[test]
fn missing_backing_file_is_a_config_error() {
    let fs = MockFileSystem::new();

    match ConfigDocument::load_with(Arc::new(fs), "/nowhere.toml") {
        Err(SigdispatchError::ConfigError(msg)) => assert!(msg.contains("/nowhere.toml")),
        other => panic!("Expected ConfigError, got: {:?}", other.map(|_| ())),
    }
}
