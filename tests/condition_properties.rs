// tests/condition_properties.rs

use proptest::prelude::*;
use sigdispatch::dispatch::Condition;
use sigdispatch::types::payload;
use sigdispatch_test_utils::builders::{DocumentBuilder, EventBuilder};

proptest! {
    #[test]
    fn negated_pattern_admits_everything_but_its_remainder(
        pattern in "[a-z]{0,6}",
        actual in "[a-z]{0,6}",
    ) {
        let cond = Condition::parse(&format!("!{pattern}"));
        prop_assert_eq!(cond.admits(&actual), actual != pattern);
    }

    #[test]
    fn plain_pattern_admits_only_itself(
        pattern in "[a-z][a-z0-9]{0,6}",
        actual in "[a-z0-9]{0,6}",
    ) {
        let cond = Condition::parse(&pattern);
        prop_assert_eq!(cond.admits(&actual), actual == pattern);
    }

    #[test]
    fn keys_without_conditions_never_veto(
        key in "[a-z]{1,6}",
        value in "[ -~]{0,10}",
    ) {
        prop_assume!(key != "mode");

        let dispatcher = DocumentBuilder::new()
            .target("t", "/bin/t")
            .event("e", EventBuilder::new().target("t"))
            .bind_when("go", "e", &[("mode", "only-this")])
            .dispatcher();

        let step = dispatcher.signal("go", &payload([(key.as_str(), value.as_str())]));
        prop_assert_eq!(step.launches.len(), 1);
    }
}
