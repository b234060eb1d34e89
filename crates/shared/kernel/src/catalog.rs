//! The compiled-in flag catalog for the dashboard shell.
//!
//! One unified catalog: UI toggles and module/sub-feature toggles live in the same tree.

use flagkit_domain::{FlagCatalog, FlagDescriptor, FlagId, Permissions};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

pub const GROUP_UI: &str = "UI";
pub const GROUP_CORE: &str = "Core";

/// Every flag the shell knows about. Converts into [`FlagId`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BuiltinFlag {
    // UI
    UseNeumorphism,
    EnableDarkMode,

    // Modules
    Dashboard,
    TodoModule,
    UsersModule,
    SettingsModule,
    AdminModule,
    ReportsModule,
    Notifications,
    InvestmentOrder,

    // Sub-features
    UserProfiles,
    UserRoles,
    GeneralSettings,
    SecuritySettings,
    AdvancedSecurity,
}

impl BuiltinFlag {
    #[must_use]
    pub fn id(self) -> FlagId {
        FlagId::from_static(self.into())
    }
}

impl From<BuiltinFlag> for FlagId {
    fn from(flag: BuiltinFlag) -> Self {
        flag.id()
    }
}

fn module(flag: BuiltinFlag, description: &'static str, enabled: bool) -> FlagDescriptor {
    FlagDescriptor::new(flag, description).enabled(enabled).group(GROUP_CORE).requires_auth()
}

fn sub_feature(flag: BuiltinFlag, description: &'static str, enabled: bool) -> FlagDescriptor {
    FlagDescriptor::new(flag, description).enabled(enabled).requires_auth()
}

/// Builds the built-in catalog.
///
/// # Panics
/// Panics if the definition below ever declares the same flag twice.
#[must_use]
pub fn builtin() -> FlagCatalog {
    use BuiltinFlag as F;

    FlagCatalog::new(vec![
        FlagDescriptor::new(F::UseNeumorphism, "Enable neumorphic design style throughout the application")
            .enabled(true)
            .group(GROUP_UI),
        FlagDescriptor::new(F::EnableDarkMode, "Enable dark mode support")
            .enabled(true)
            .group(GROUP_UI),
        module(F::Dashboard, "Dashboard module with analytics and summary", true),
        module(F::TodoModule, "ToDo list management module", true),
        module(F::UsersModule, "User management module", true)
            .permissions(Permissions::ADMIN)
            .sub_feature(
                sub_feature(F::UserProfiles, "User profile management", true)
                    .permissions(Permissions::ADMIN | Permissions::USER_MANAGER),
            )
            .sub_feature(
                sub_feature(F::UserRoles, "User role management", true)
                    .permissions(Permissions::ADMIN),
            ),
        module(F::SettingsModule, "Application settings", true)
            .permissions(Permissions::ADMIN)
            .sub_feature(
                sub_feature(F::GeneralSettings, "General application settings", true)
                    .permissions(Permissions::ADMIN),
            )
            .sub_feature(
                sub_feature(F::SecuritySettings, "Security configuration", true)
                    .permissions(Permissions::ADMIN | Permissions::SECURITY_ADMIN),
            )
            .sub_feature(
                sub_feature(
                    F::AdvancedSecurity,
                    "Advanced security features like MFA and IP restrictions",
                    false,
                )
                .permissions(Permissions::SECURITY_ADMIN),
            ),
        module(F::AdminModule, "Admin panel", true).permissions(Permissions::ADMIN),
        module(F::ReportsModule, "Reporting and analytics", false)
            .permissions(Permissions::ADMIN | Permissions::REPORTS_VIEWER),
        FlagDescriptor::new(F::Notifications, "In-app notifications system")
            .enabled(true)
            .group(GROUP_CORE),
        module(F::InvestmentOrder, "Buy/sell investment order management", true)
            .permissions(Permissions::ADMIN | Permissions::FINANCE_MANAGER),
    ])
}
