// src/config/cascade.rs

//! Static detection of lifecycle cascade cycles.
//!
//! Event A can re-trigger event B when A launches a target T and a
//! `target_started` / `target_terminated` binding whose `name` condition
//! admits T runs B. A cycle in that relation means the configuration can
//! relaunch itself forever; at runtime such chains are cut at
//! `max_cascade_depth`.

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use crate::config::graph::ConfigGraph;
use crate::engine::signals::{TARGET_STARTED, TARGET_TERMINATED};
use crate::types::EventName;

/// Payload key carried by lifecycle signals.
const NAME_KEY: &str = "name";

/// Groups of events that can trigger each other through lifecycle signals.
///
/// Each group is sorted; groups are sorted by their first member.
pub fn find_cycles(graph: &ConfigGraph) -> Vec<Vec<EventName>> {
    // Edge direction: launching event -> event run by the lifecycle binding.
    let mut cascade: DiGraphMap<&str, ()> = DiGraphMap::new();

    for event in graph.events() {
        cascade.add_node(event.name.as_str());
    }

    for event in graph.events() {
        for target in event.target_names() {
            for signal in [TARGET_STARTED, TARGET_TERMINATED] {
                for binding in graph.bindings(signal) {
                    if binding.admits_single(NAME_KEY, target) {
                        cascade.add_edge(event.name.as_str(), binding.event.name.as_str(), ());
                    }
                }
            }
        }
    }

    let mut cycles: Vec<Vec<EventName>> = tarjan_scc(&cascade)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || cascade.contains_edge(component[0], component[0])
        })
        .map(|component| {
            let mut names: Vec<EventName> = component.into_iter().map(str::to_string).collect();
            names.sort();
            names
        })
        .collect();

    cycles.sort();
    cycles
}
