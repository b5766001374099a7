// tests/argument_resolution.rs

use sigdispatch::dispatch::{ArgumentSpec, Event, Target};
use sigdispatch::engine::DispatchReport;
use sigdispatch::errors::{ArgumentSource, DispatchError};
use sigdispatch::store::DataStore;
use sigdispatch::types::{Payload, Value, payload};
use sigdispatch_test_utils::builders::{DocumentBuilder, EventBuilder};
use sigdispatch_test_utils::init_tracing;

use std::sync::Arc;

/// Two targets with different fixed prefixes sharing one event.
fn fan_out(event: EventBuilder) -> DocumentBuilder {
    DocumentBuilder::new()
        .target_with_args("left", "/bin/left", &["-l"])
        .target_with_args("right", "/bin/right", &["-r", "--"])
        .event("fan", event.target("left").target("right"))
        .bind("go", "fan")
}

#[test]
fn every_target_gets_prefix_plus_same_resolved_args() {
    init_tracing();

    let dispatcher = fan_out(
        EventBuilder::new()
            .literal("start")
            .dynamic("who")
            .environment("mode")
            .literal(3i64),
    )
    .environment("mode", "fast")
    .dispatcher();

    let step = dispatcher.signal("go", &payload([("who", "alice")]));

    assert_eq!(step.launches.len(), 2);
    assert_eq!(step.launches[0].target, "left");
    assert_eq!(step.launches[0].program, "/bin/left");
    assert_eq!(step.launches[0].args, vec!["-l", "start", "alice", "fast", "3"]);
    assert_eq!(step.launches[1].target, "right");
    assert_eq!(step.launches[1].args, vec!["-r", "--", "start", "alice", "fast", "3"]);
    assert_eq!(
        step.reports,
        vec![DispatchReport::Ran {
            signal: "go".to_string(),
            event: "fan".to_string(),
            launched: 2,
        }]
    );
}

#[test]
fn missing_required_dynamic_aborts_all_targets() {
    init_tracing();

    let dispatcher = fan_out(EventBuilder::new().literal("a").dynamic("x")).dispatcher();

    let step = dispatcher.signal("go", &Payload::new());

    assert!(step.launches.is_empty());
    assert_eq!(
        step.reports,
        vec![DispatchReport::Aborted {
            signal: "go".to_string(),
            event: "fan".to_string(),
            error: DispatchError::MissingArgument {
                event: "fan".to_string(),
                relation: "x".to_string(),
                origin: ArgumentSource::Payload,
            },
        }]
    );
}

#[test]
fn missing_required_environment_aborts_all_targets() {
    let dispatcher = fan_out(EventBuilder::new().environment("token")).dispatcher();

    let step = dispatcher.signal("go", &payload([("token", "in-payload-does-not-count")]));

    assert!(step.launches.is_empty());
    assert!(matches!(
        &step.reports[0],
        DispatchReport::Aborted {
            error: DispatchError::MissingArgument { origin: ArgumentSource::Store, .. },
            ..
        }
    ));
}

#[test]
fn optional_missing_args_are_skipped_without_affecting_others() {
    let dispatcher = fan_out(
        EventBuilder::new()
            .literal("a")
            .optional_dynamic("maybe")
            .optional_environment("also_maybe")
            .literal("b"),
    )
    .dispatcher();

    let step = dispatcher.signal("go", &Payload::new());

    assert_eq!(step.launches.len(), 2);
    assert_eq!(step.launches[0].args, vec!["-l", "a", "b"]);
}

#[test]
fn unknown_kinds_and_incomplete_specs_contribute_nothing() {
    let dispatcher = fan_out(
        EventBuilder::new()
            .literal("keep")
            .arg(&[("type", "telepathy".into()), ("value", "x".into())])
            .arg(&[("value", "untyped".into())])
            .arg(&[("type", "dynamic".into())])
            .arg(&[("type", "literal".into())]),
    )
    .dispatcher();

    let step = dispatcher.signal("go", &Payload::new());

    assert_eq!(step.launches[0].args, vec!["-l", "keep"]);
}

#[test]
fn structured_values_use_one_rendering_rule() {
    let mut store = DataStore::new();
    store.insert("ratio", Value::Float(1.0));
    store.insert("enabled", Value::Boolean(false));
    store.insert("sizes", Value::List(vec![Value::Integer(1), Value::from("two")]));

    let target = Arc::new(Target::new("t", "/bin/t", Vec::new()));
    let event = Event::new(
        "render",
        vec![target],
        vec![
            ArgumentSpec::environment("ratio", false),
            ArgumentSpec::environment("enabled", false),
            ArgumentSpec::environment("sizes", false),
            ArgumentSpec::dynamic("n", false),
        ],
    );

    let args = event
        .resolve_arguments(&payload([("n", Value::Integer(-7))]), &store)
        .unwrap();

    assert_eq!(args, vec!["1.0", "false", "[1, \"two\"]", "-7"]);
}

#[test]
fn literal_integer_and_float_render_like_their_toml() {
    assert_eq!(Value::Integer(42).render(), "42");
    assert_eq!(Value::Float(0.25).render(), "0.25");
    assert_eq!(Value::from("plain text").render(), "plain text");
}
