use std::sync::Mutex;

use serde_json::json;

use super::*;

/// Handler that records which label saw which payload.
fn recording(label: &'static str, seen: &Arc<Mutex<Vec<(&'static str, Value)>>>) -> Arc<dyn EventHandler> {
    let seen = Arc::clone(seen);
    Arc::new(move |payload: &Value| {
        seen.lock().expect("lock").push((label, payload.clone()));
    })
}

#[test]
fn last_registration_for_a_name_wins() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut registry = Registry::new();
    registry.insert("call_created", recording("first", &seen));
    registry.insert("call_created", recording("second", &seen));

    let handler = registry.handler_for("call_created").expect("handler");
    handler.handle(&json!({"name": "call_created"}));

    let seen = seen.lock().expect("lock");
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "second");
}

#[test]
fn replacement_keeps_registration_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut registry = Registry::new();
    registry.insert("call_created", recording("a", &seen));
    registry.insert("call_ended", recording("b", &seen));
    registry.insert("call_created", recording("c", &seen));

    let names: Vec<&str> = registry.names().collect();
    assert_eq!(names, vec!["call_created", "call_ended"]);
}

#[test]
fn wildcard_suppresses_name_specific_handlers() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut registry = Registry::new();
    registry.insert("call_created", recording("named", &seen));
    registry.insert(WILDCARD, recording("wildcard", &seen));

    let handler = registry.handler_for("call_created").expect("handler");
    handler.handle(&json!({"name": "call_created"}));
    let handler = registry.handler_for("call_ended").expect("handler");
    handler.handle(&json!({"name": "call_ended"}));

    let seen = seen.lock().expect("lock");
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|(label, _)| *label == "wildcard"));
}

#[test]
fn unregistered_name_resolves_to_none() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut registry = Registry::new();
    registry.insert("call_created", recording("named", &seen));

    assert!(registry.handler_for("call_ended").is_none());
}

#[test]
fn clear_empties_the_registry() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut registry = Registry::new();
    registry.insert("call_created", recording("named", &seen));
    registry.insert(WILDCARD, recording("wildcard", &seen));
    assert!(!registry.is_empty());

    registry.clear();
    assert!(registry.is_empty());
    assert!(registry.handler_for("call_created").is_none());
    assert_eq!(registry.names().count(), 0);
}
