#![allow(dead_code, unreachable_pub)]

use flagkit_domain::{FlagCatalog, FlagDescriptor, FlagId, Permissions};
use flagkit_storage::MemoryStorage;
use flagkit_toggles::FlagManager;
use std::sync::{Arc, Mutex};

/// A small catalog: two modules (one with nested sub-features) and a UI toggle.
pub fn catalog() -> FlagCatalog {
    FlagCatalog::new(vec![
        FlagDescriptor::new("DARK_MODE", "Dark mode").enabled(true).group("UI"),
        FlagDescriptor::new("REPORTS", "Reports").group("Core").requires_auth(),
        FlagDescriptor::new("SETTINGS", "Settings")
            .enabled(true)
            .group("Core")
            .requires_auth()
            .permissions(Permissions::ADMIN)
            .sub_feature(FlagDescriptor::new("GENERAL", "General").enabled(true))
            .sub_feature(
                FlagDescriptor::new("SECURITY", "Security")
                    .enabled(true)
                    .permissions(Permissions::SECURITY_ADMIN)
                    .sub_feature(FlagDescriptor::new("MFA", "Multi-factor auth")),
            ),
        // Shares a prefix with SETTINGS without being part of its tree.
        FlagDescriptor::new("SETTINGS_EXPORT", "Settings export").group("Core"),
    ])
}

pub fn open(storage: &Arc<MemoryStorage>) -> FlagManager {
    FlagManager::open(catalog(), storage.clone())
}

pub type Log = Arc<Mutex<Vec<(String, bool)>>>;

/// Subscribes a recorder and returns its log. The subscription stays registered.
pub fn record(flags: &FlagManager) -> Log {
    let log: Log = Arc::default();
    let sink = log.clone();
    let _ = flags.subscribe(move |id: &FlagId, enabled| {
        sink.lock().unwrap().push((id.to_string(), enabled));
    });
    log
}

pub fn entries(log: &Log) -> Vec<(String, bool)> {
    log.lock().unwrap().clone()
}

pub fn pair(id: &str, enabled: bool) -> (String, bool) {
    (id.to_owned(), enabled)
}
