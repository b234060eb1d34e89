use flagkit_domain::{AccessContext, Permissions};
use flagkit_kernel::catalog::{BuiltinFlag, builtin};
use flagkit_storage::{FlagStorage, JsonFileStorage, MemoryStorage, WriteBehind};
use flagkit_toggles::FlagManager;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn file_storage(dir: &TempDir) -> Arc<dyn FlagStorage> {
    Arc::new(JsonFileStorage::builder().root(dir.path()).open().unwrap())
}

#[test]
fn reports_module_lifecycle_across_restart() {
    let dir = TempDir::new().unwrap();
    let reports = BuiltinFlag::ReportsModule;

    let flags = FlagManager::open(builtin(), file_storage(&dir));
    assert!(!flags.is_enabled(reports.as_ref()));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _sub = flags.subscribe(move |id, enabled| sink.lock().unwrap().push((id.clone(), enabled)));

    flags.enable(reports);
    assert!(flags.is_enabled(reports.as_ref()));
    assert_eq!(*seen.lock().unwrap(), [(reports.id(), true)]);

    drop(flags);
    let restarted = FlagManager::open(builtin(), file_storage(&dir));
    assert!(restarted.is_enabled(reports.as_ref()));
    assert!(restarted.is_persistent());
}

#[test]
fn document_uses_the_featureflags_key() {
    let dir = TempDir::new().unwrap();
    let flags = FlagManager::open(builtin(), file_storage(&dir));
    flags.disable(BuiltinFlag::UseNeumorphism);

    let raw = std::fs::read_to_string(dir.path().join("featureFlags.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["USE_NEUMORPHISM"], serde_json::Value::Bool(false));
    assert_eq!(doc.as_object().map(serde_json::Map::len), Some(builtin().len()));
}

#[test]
fn builtin_permissions_gate_usage() {
    let flags = FlagManager::open(builtin(), Arc::new(MemoryStorage::new()));
    let finance = AccessContext::authenticated(Permissions::FINANCE_MANAGER);

    assert!(flags.is_usable(BuiltinFlag::InvestmentOrder.as_ref(), &finance));
    assert!(!flags.is_usable(BuiltinFlag::UsersModule.as_ref(), &finance));
    assert!(flags.is_usable(BuiltinFlag::Notifications.as_ref(), &AccessContext::anonymous()));
    assert!(!flags.is_usable(BuiltinFlag::Dashboard.as_ref(), &AccessContext::anonymous()));
}

#[test]
fn users_module_binding_covers_its_sub_features() {
    let flags = FlagManager::open(builtin(), Arc::new(MemoryStorage::new()));
    let users = flags.bind_module(BuiltinFlag::UsersModule);

    assert_eq!(users.sub_features(), [BuiltinFlag::UserProfiles.id(), BuiltinFlag::UserRoles.id()]);
    assert!(users.is_active(BuiltinFlag::UserRoles.as_ref()));

    flags.disable(BuiltinFlag::UsersModule);
    assert!(!users.is_active(BuiltinFlag::UserRoles.as_ref()));
}

#[tokio::test]
async fn write_behind_persists_after_flush() {
    let dir = TempDir::new().unwrap();
    let writer = Arc::new(WriteBehind::spawn(file_storage(&dir)).unwrap());

    let flags = FlagManager::open(builtin(), writer.clone());
    flags.enable(BuiltinFlag::ReportsModule);
    flags.disable(BuiltinFlag::Dashboard);
    writer.flush().await.unwrap();

    let stored = file_storage(&dir).load().unwrap().unwrap();
    assert_eq!(stored.get(BuiltinFlag::ReportsModule.as_ref()), Some(true));
    assert_eq!(stored.get(BuiltinFlag::Dashboard.as_ref()), Some(false));

    writer.shutdown().await.unwrap();
}
