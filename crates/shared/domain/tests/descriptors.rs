use flagkit_domain::{AccessContext, FlagCatalog, FlagDescriptor, FlagId, PermissionError, Permissions};
use serde_json::json;

#[test]
fn permissions_parse_from_names() {
    assert_eq!("admin".parse::<Permissions>(), Ok(Permissions::ADMIN));
    assert_eq!("user-manager".parse::<Permissions>(), Ok(Permissions::USER_MANAGER));
    assert_eq!("*".parse::<Permissions>(), Ok(Permissions::ALL));
    assert!(matches!("root".parse::<Permissions>(), Err(PermissionError::Unknown { .. })));

    let set = Permissions::parse_all(["admin", "finance-manager"]).expect("known names");
    assert_eq!(set, Permissions::ADMIN | Permissions::FINANCE_MANAGER);
    assert_eq!(set.to_string(), "admin, finance-manager");
    assert!(Permissions::parse_all(["admin", "nope"]).is_err());
}

#[test]
fn permissions_serialize_as_name_lists() {
    let set = Permissions::SECURITY_ADMIN | Permissions::ADMIN;
    let value = serde_json::to_value(set).expect("serialize");
    assert_eq!(value, json!(["admin", "security-admin"]));

    let back: Permissions = serde_json::from_value(json!(["reports-viewer"])).expect("deserialize");
    assert_eq!(back, Permissions::REPORTS_VIEWER);
}

#[test]
fn unknown_required_permission_never_admits_a_caller() {
    let raw = json!({
        "id": "AUDIT_MODULE",
        "description": "Audit trail",
        "defaultEnabled": true,
        "requiresAuth": true,
        "permissions": ["auditor"]
    });

    let parsed = serde_json::from_value::<FlagDescriptor>(raw);
    let caller = AccessContext::authenticated(Permissions::empty());
    assert!(!parsed.as_ref().is_ok_and(|descriptor| descriptor.permits(&caller)));

    let err = parsed.expect_err("unknown permission must not parse");
    assert!(err.to_string().contains("Unknown permission `auditor`"));
}

#[test]
fn descriptor_tree_deserializes_from_camel_case() {
    let raw = json!([{
        "id": "SETTINGS_MODULE",
        "description": "Application settings",
        "defaultEnabled": true,
        "group": "Core",
        "requiresAuth": true,
        "permissions": ["admin"],
        "subFeatures": [
            { "id": "ADVANCED_SECURITY", "description": "MFA", "defaultEnabled": false }
        ]
    }]);

    let roots: Vec<FlagDescriptor> = serde_json::from_value(raw).expect("descriptors");
    let catalog = FlagCatalog::try_new(roots).expect("valid catalog");

    assert_eq!(catalog.default_of("SETTINGS_MODULE"), Some(true));
    assert_eq!(catalog.default_of("ADVANCED_SECURITY"), Some(false));
    assert_eq!(catalog.parent("ADVANCED_SECURITY"), Some(&FlagId::from_static("SETTINGS_MODULE")));
    assert_eq!(catalog.descriptor("ADVANCED_SECURITY").map(|d| &*d.group), Some("Core"));
}

#[test]
fn defaults_cover_every_descriptor() {
    let catalog = FlagCatalog::new(vec![
        FlagDescriptor::new("A", "a").enabled(true).sub_feature(FlagDescriptor::new("A_CHILD", "c")),
        FlagDescriptor::new("B", "b"),
    ]);

    let defaults = catalog.defaults();
    assert_eq!(defaults.len(), 3);
    assert_eq!(defaults.get("A"), Some(&true));
    assert_eq!(defaults.get("A_CHILD"), Some(&false));
    assert_eq!(defaults.get("B"), Some(&false));
}
