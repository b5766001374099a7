// tests/cascade_cycles.rs

use std::io::Write;

use sigdispatch::config::cascade::find_cycles;
use sigdispatch::config::load_config;
use sigdispatch::types::LoadMode;
use sigdispatch_test_utils::builders::{DocumentBuilder, EventBuilder};

fn cycles(builder: DocumentBuilder) -> Vec<Vec<String>> {
    find_cycles(&builder.graph_build().lenient())
}

#[test]
fn event_relaunching_its_own_target_is_a_cycle() {
    let builder = DocumentBuilder::new()
        .target("t", "/bin/t")
        .event("again", EventBuilder::new().target("t"))
        .bind("target_terminated", "again");

    assert_eq!(cycles(builder), vec![vec!["again".to_string()]]);
}

#[test]
fn two_events_feeding_each_other_form_one_group() {
    let builder = DocumentBuilder::new()
        .target("ping", "/bin/ping")
        .target("pong", "/bin/pong")
        .event("on_ping", EventBuilder::new().target("pong"))
        .event("on_pong", EventBuilder::new().target("ping"))
        .bind_when("target_started", "on_ping", &[("name", "ping")])
        .bind_when("target_terminated", "on_pong", &[("name", "pong")]);

    assert_eq!(
        cycles(builder),
        vec![vec!["on_ping".to_string(), "on_pong".to_string()]]
    );
}

#[test]
fn name_conditions_break_cycles() {
    let builder = DocumentBuilder::new()
        .target("worker", "/bin/worker")
        .target("reporter", "/bin/reporter")
        .event("work", EventBuilder::new().target("worker"))
        .event("report", EventBuilder::new().target("reporter"))
        .bind("init", "work")
        .bind_when("target_terminated", "report", &[("name", "!reporter")]);

    assert!(cycles(builder).is_empty());
}

#[test]
fn non_lifecycle_signals_are_ignored() {
    let builder = DocumentBuilder::new()
        .target("t", "/bin/t")
        .event("e", EventBuilder::new().target("t"))
        .bind("init", "e")
        .bind("updated_value", "e")
        .bind("custom", "e");

    assert!(cycles(builder).is_empty());
}

#[test]
fn loader_reports_cycles_without_rejecting_config() {
    let builder = DocumentBuilder::new()
        .target("t", "/bin/t")
        .event("again", EventBuilder::new().target("t"))
        .bind("target_started", "again")
        .strict(true);

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(builder.to_toml_string().as_bytes())
        .expect("write config");

    let loaded = load_config(file.path(), LoadMode::Strict).expect("config loads");
    assert_eq!(loaded.cascade_cycles, vec![vec!["again".to_string()]]);
}

#[test]
fn dispatch_beyond_limit_is_reported_not_run() {
    use sigdispatch::engine::DispatchReport;
    use sigdispatch::errors::DispatchError;
    use sigdispatch::types::payload;

    let dispatcher = DocumentBuilder::new()
        .target("t", "/bin/t")
        .event("again", EventBuilder::new().target("t"))
        .bind("target_terminated", "again")
        .max_cascade_depth(2)
        .dispatcher();

    let at_limit = dispatcher.target_terminated("t", 1);
    assert_eq!(at_limit.launches.len(), 1);
    assert_eq!(at_limit.launches[0].depth, 2);

    let beyond = dispatcher.target_terminated("t", 2);
    assert!(beyond.launches.is_empty());
    assert_eq!(
        beyond.reports,
        vec![DispatchReport::CascadeLimited {
            signal: "target_terminated".to_string(),
            error: DispatchError::CascadeLimit {
                signal: "target_terminated".to_string(),
                depth: 3,
                limit: 2,
            },
        }]
    );

    // Unbound lifecycle signals stay silent at any depth.
    assert!(dispatcher.target_started("t", 50).is_empty());
    assert!(dispatcher.dispatch("target_terminated", &payload([("name", "t")]), 0).reports.len() == 1);
}
