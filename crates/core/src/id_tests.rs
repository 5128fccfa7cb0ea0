// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap};

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId;
}

#[test]
fn define_id_new_and_display() {
    let id = TestId::new("abc");
    assert_eq!(id.as_str(), "abc");
    assert_eq!(id.to_string(), "abc");
}

#[test]
fn define_id_conversions() {
    let owned: TestId = String::from("owned").into();
    let borrowed: TestId = "borrowed".into();
    assert_eq!(owned, "owned");
    assert_eq!(borrowed, *"borrowed");
}

#[test]
fn define_id_usable_as_map_key_by_str() {
    let mut map = HashMap::new();
    map.insert(TestId::new("key"), 1);
    assert_eq!(map.get("key"), Some(&1));

    let id = TestId::new("key");
    let s: &str = id.borrow();
    assert_eq!(s, "key");
}

#[test]
fn define_id_serializes_as_plain_string() {
    let json = serde_json::to_string(&TestId::new("s-1")).unwrap();
    assert_eq!(json, "\"s-1\"");
    let back: TestId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, "s-1");
}

#[test]
fn define_id_orders_lexically() {
    let set: BTreeSet<TestId> = ["b", "a", "c"].into_iter().map(TestId::from).collect();
    let ordered: Vec<&str> = set.iter().map(TestId::as_str).collect();
    assert_eq!(ordered, vec!["a", "b", "c"]);
}

#[test]
fn generated_event_ids_are_unique() {
    let ids: BTreeSet<EventId> = (0..100).map(|_| EventId::generate()).collect();
    assert_eq!(ids.len(), 100);
}
