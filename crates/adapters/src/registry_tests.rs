// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::runtime::FakeRuntime;
use ao_core::RuntimeHandle;

#[test]
fn builtins_cover_every_slot() {
    let registry = PluginRegistry::with_builtins();
    assert_eq!(registry.names(PluginSlot::Runtime), vec!["process", "tmux"]);
    assert_eq!(registry.names(PluginSlot::Agent), vec!["claude"]);
    assert_eq!(registry.names(PluginSlot::Scm), vec!["github"]);
    assert_eq!(registry.names(PluginSlot::Notifier), vec!["desktop", "noop"]);
}

#[test]
fn unknown_name_is_absent() {
    let registry = PluginRegistry::with_builtins();
    assert!(registry.runtime("docker").is_none());
    assert!(registry.agent("aider").is_none());
    assert!(registry.scm("gitlab").is_none());
    assert!(registry.notifier("slack").is_none());
    assert!(!registry.contains(PluginSlot::Scm, "gitlab"));
}

#[test]
fn names_are_scoped_per_slot() {
    let registry = PluginRegistry::new().with_runtime("shared", FakeRuntime::new());
    assert!(registry.contains(PluginSlot::Runtime, "shared"));
    assert!(!registry.contains(PluginSlot::Agent, "shared"));
    assert!(registry.agent("shared").is_none());
}

#[tokio::test]
async fn lookup_returns_the_registered_instance() {
    let fake = FakeRuntime::new();
    let registry = PluginRegistry::new().with_runtime("fake", fake.clone());

    let runtime = registry.runtime("fake").unwrap();
    runtime
        .send_message(&RuntimeHandle::new("fake", "r1"), "hello")
        .await
        .unwrap();

    assert_eq!(fake.sent_messages().len(), 1);
}

#[test]
fn later_registration_replaces_earlier() {
    let first = FakeRuntime::new();
    let registry = PluginRegistry::new()
        .with_runtime("fake", first)
        .with_runtime("fake", FakeRuntime::new());
    assert_eq!(registry.names(PluginSlot::Runtime), vec!["fake"]);
}

#[test]
fn slot_display() {
    assert_eq!(PluginSlot::Notifier.to_string(), "notifier");
}
