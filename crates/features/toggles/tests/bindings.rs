mod fixtures;

use fixtures::open;
use flagkit_storage::MemoryStorage;
use std::sync::Arc;

#[test]
fn flag_binding_tracks_its_flag_only() {
    let flags = open(&Arc::new(MemoryStorage::new()));
    let reports = flags.bind("REPORTS");
    let mut rx = reports.watch();

    assert!(!reports.get());
    flags.enable("DARK_MODE");
    assert!(!rx.has_changed().unwrap());

    flags.enable("REPORTS");
    assert!(reports.get());
    assert!(rx.has_changed().unwrap());
    assert!(*rx.borrow_and_update());
}

#[test]
fn dropping_a_binding_unsubscribes() {
    let flags = open(&Arc::new(MemoryStorage::new()));
    let baseline = flags.observers().len();

    let binding = flags.bind("REPORTS");
    let rx = binding.watch();
    assert_eq!(flags.observers().len(), baseline + 1);

    drop(binding);
    assert_eq!(flags.observers().len(), baseline);
    assert!(rx.has_changed().is_err(), "receiver should see the binding gone");
}

#[test]
fn set_binding_caches_requested_flags() {
    let flags = open(&Arc::new(MemoryStorage::new()));
    let set = flags.bind_set(["DARK_MODE", "REPORTS"]);

    assert!(set.get("DARK_MODE"));
    assert!(!set.get("REPORTS"));
    assert!(!set.get("SETTINGS"), "ids outside the set read as disabled");

    let mut rx = set.watch();
    flags.update_many([("REPORTS", true), ("GENERAL", false)]);

    assert!(set.get("REPORTS"));
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().len(), 2);
    assert_eq!(set.ids().len(), 2);
    assert_eq!(set.values().get("REPORTS"), Some(&true));
}

#[test]
fn set_binding_ignores_unrelated_changes() {
    let flags = open(&Arc::new(MemoryStorage::new()));
    let set = flags.bind_set(["DARK_MODE"]);
    let rx = set.watch();

    flags.enable("REPORTS");
    assert!(!rx.has_changed().unwrap());
}

#[test]
fn module_binding_uses_the_catalog_tree() {
    let flags = open(&Arc::new(MemoryStorage::new()));
    let settings = flags.bind_module("SETTINGS");

    let subs: Vec<&str> = settings.sub_features().iter().map(|id| id.as_str()).collect();
    assert_eq!(subs, ["GENERAL", "SECURITY", "MFA"]);
    assert!(!settings.state().features.contains_key("SETTINGS_EXPORT"));

    let rx = settings.watch();
    flags.enable("SETTINGS_EXPORT");
    assert!(!rx.has_changed().unwrap(), "prefix siblings are not sub-features");
}

#[test]
fn module_state_gates_sub_features_on_the_module() {
    let flags = open(&Arc::new(MemoryStorage::new()));
    let settings = flags.bind_module("SETTINGS");

    assert!(settings.is_enabled());
    assert!(settings.is_active("GENERAL"));
    assert!(!settings.is_active("MFA"));

    flags.enable("MFA");
    assert!(settings.is_active("MFA"));

    flags.disable("SETTINGS");
    let state = settings.state();
    assert!(!state.enabled);
    assert!(state.is_feature_enabled("GENERAL"));
    assert!(!state.is_active("GENERAL"));
    assert!(!state.is_active("MFA"));
}

#[test]
fn leaf_module_has_no_sub_features() {
    let flags = open(&Arc::new(MemoryStorage::new()));
    let reports = flags.bind_module("REPORTS");
    assert!(reports.sub_features().is_empty());
    assert!(!reports.is_enabled());
    assert_eq!(reports.module().as_str(), "REPORTS");
}

#[tokio::test]
async fn watch_receiver_wakes_on_change() {
    let flags = open(&Arc::new(MemoryStorage::new()));
    let binding = flags.bind("DARK_MODE");
    let mut rx = binding.watch();

    let writer = flags.clone();
    let task = tokio::spawn(async move {
        tokio::task::yield_now().await;
        writer.disable("DARK_MODE");
    });

    rx.changed().await.unwrap();
    assert!(!*rx.borrow());
    task.await.unwrap();
}

#[tokio::test]
async fn change_channel_streams_flag_changes() {
    let flags = open(&Arc::new(MemoryStorage::new()));
    let mut changes = flags.subscribe_channel().unwrap();

    flags.update_many([("REPORTS", true), ("DARK_MODE", false)]);

    let first = changes.recv().await.unwrap();
    let second = changes.recv().await.unwrap();
    assert_eq!((first.id.as_str(), first.enabled), ("REPORTS", true));
    assert_eq!((second.id.as_str(), second.enabled), ("DARK_MODE", false));
}
