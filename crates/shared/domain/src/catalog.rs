//! Static flag catalog: descriptors arranged as a module -> sub-feature tree.
//!
//! The catalog is read-only once built. It is the only authority on *which* flags exist,
//! on their defaults, and on how sub-features relate to their module.

use crate::error::CatalogError;
use crate::flag::{FlagId, FlagMap};
use crate::permissions::{AccessContext, Permissions};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Group used for root descriptors that do not name one.
pub const DEFAULT_GROUP: &str = "General";

/// One catalog entry.
///
/// A descriptor with an empty `group` inherits the group of its parent when the catalog is
/// built (roots fall back to [`DEFAULT_GROUP`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagDescriptor {
    pub id: FlagId,
    pub description: Cow<'static, str>,
    pub default_enabled: bool,
    #[serde(default)]
    pub group: Cow<'static, str>,
    #[serde(default)]
    pub requires_auth: bool,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub sub_features: Vec<FlagDescriptor>,
}

impl FlagDescriptor {
    /// A descriptor that is disabled by default, with no group, auth or permission requirements.
    pub fn new(id: impl Into<FlagId>, description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            default_enabled: false,
            group: Cow::Borrowed(""),
            requires_auth: false,
            permissions: Permissions::empty(),
            sub_features: Vec::new(),
        }
    }

    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.default_enabled = enabled;
        self
    }

    #[must_use]
    pub fn group(mut self, group: impl Into<Cow<'static, str>>) -> Self {
        self.group = group.into();
        self
    }

    #[must_use]
    pub const fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    #[must_use]
    pub const fn permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    #[must_use]
    pub fn sub_feature(mut self, child: Self) -> Self {
        self.sub_features.push(child);
        self
    }

    /// Whether `access` satisfies the requirements for *using* this feature.
    ///
    /// Auth is checked first; a non-empty permission set needs at least one match.
    #[must_use]
    pub fn permits(&self, access: &AccessContext) -> bool {
        if self.requires_auth && !access.authenticated {
            return false;
        }
        self.permissions.is_empty() || self.permissions.intersects(access.permissions)
    }

    #[must_use]
    pub fn has_sub_features(&self) -> bool {
        !self.sub_features.is_empty()
    }
}

/// A descriptor together with its position in the tree.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry<'a> {
    pub descriptor: &'a FlagDescriptor,
    pub parent: Option<&'a FlagId>,
    pub depth: usize,
}

#[derive(Debug, Clone)]
struct Slot {
    /// Child indices from the roots down to this descriptor.
    path: Vec<usize>,
    parent: Option<FlagId>,
}

/// The validated, immutable flag tree.
#[derive(Debug, Clone)]
pub struct FlagCatalog {
    roots: Vec<FlagDescriptor>,
    index: FxHashMap<FlagId, Slot>,
    order: Vec<FlagId>,
}

impl FlagCatalog {
    /// Validates and indexes `roots`.
    ///
    /// # Errors
    /// Returns [`CatalogError::DuplicateId`] when an id appears more than once anywhere in
    /// the tree and [`CatalogError::EmptyId`] for blank ids.
    pub fn try_new(roots: Vec<FlagDescriptor>) -> Result<Self, CatalogError> {
        let mut roots = roots;
        for root in &mut roots {
            if root.group.is_empty() {
                root.group = Cow::Borrowed(DEFAULT_GROUP);
            }
            inherit_group(root);
        }

        let mut index = FxHashMap::default();
        let mut order = Vec::new();
        let mut path = Vec::new();
        index_level(&roots, None, &mut path, &mut index, &mut order)?;

        Ok(Self { roots, index, order })
    }

    /// Builds the catalog, panicking on definition bugs.
    ///
    /// Intended for compiled-in catalogs where a duplicate id must stop the program at startup.
    ///
    /// # Panics
    /// Panics if [`FlagCatalog::try_new`] fails.
    #[must_use]
    pub fn new(roots: Vec<FlagDescriptor>) -> Self {
        match Self::try_new(roots) {
            Ok(catalog) => catalog,
            Err(err) => panic!("invalid flag catalog: {err}"),
        }
    }

    #[must_use]
    pub fn roots(&self) -> &[FlagDescriptor] {
        &self.roots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Every id in depth-first pre-order.
    pub fn ids(&self) -> impl Iterator<Item = &FlagId> {
        self.order.iter()
    }

    /// Every descriptor in depth-first pre-order (module before its sub-features).
    pub fn flatten(&self) -> impl Iterator<Item = &FlagDescriptor> {
        self.order.iter().filter_map(|id| self.descriptor(id.as_str()))
    }

    /// Depth-first walk with parent and depth information.
    pub fn walk(&self) -> impl Iterator<Item = CatalogEntry<'_>> {
        self.order.iter().filter_map(|id| {
            let slot = self.index.get(id)?;
            Some(CatalogEntry {
                descriptor: self.resolve(&slot.path)?,
                parent: slot.parent.as_ref(),
                depth: slot.path.len().saturating_sub(1),
            })
        })
    }

    #[must_use]
    pub fn descriptor(&self, id: &str) -> Option<&FlagDescriptor> {
        self.index.get(id).and_then(|slot| self.resolve(&slot.path))
    }

    #[must_use]
    pub fn parent(&self, id: &str) -> Option<&FlagId> {
        self.index.get(id).and_then(|slot| slot.parent.as_ref())
    }

    /// Direct sub-features of `id` (empty for leaves and unknown ids).
    #[must_use]
    pub fn children(&self, id: &str) -> &[FlagDescriptor] {
        self.descriptor(id).map(|d| d.sub_features.as_slice()).unwrap_or_default()
    }

    /// All sub-features below `id`, at any depth, in pre-order.
    #[must_use]
    pub fn descendants(&self, id: &str) -> Vec<&FlagId> {
        let mut out = Vec::new();
        if let Some(descriptor) = self.descriptor(id) {
            collect_ids(&descriptor.sub_features, &mut out);
        }
        out
    }

    /// The default state: `id -> default_enabled` for every descriptor in the tree.
    #[must_use]
    pub fn defaults(&self) -> FlagMap {
        self.flatten().map(|d| (d.id.clone(), d.default_enabled)).collect()
    }

    #[must_use]
    pub fn default_of(&self, id: &str) -> Option<bool> {
        self.descriptor(id).map(|d| d.default_enabled)
    }

    /// Flattened descriptors grouped by `group`, groups in order of first appearance.
    #[must_use]
    pub fn groups(&self) -> Vec<(&str, Vec<&FlagDescriptor>)> {
        group_in_order(self.flatten(), group_of)
    }

    fn resolve(&self, path: &[usize]) -> Option<&FlagDescriptor> {
        let (first, rest) = path.split_first()?;
        let mut current = self.roots.get(*first)?;
        for idx in rest {
            current = current.sub_features.get(*idx)?;
        }
        Some(current)
    }
}

/// Buckets `items` by `key`, keeping buckets in order of first appearance and items in input
/// order within each bucket.
pub fn group_in_order<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<(K, Vec<T>)>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();
    for item in items {
        let name = key(&item);
        match groups.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, members)) => members.push(item),
            None => groups.push((name, vec![item])),
        }
    }
    groups
}

fn group_of<'a>(descriptor: &&'a FlagDescriptor) -> &'a str {
    &descriptor.group
}

fn inherit_group(parent: &mut FlagDescriptor) {
    let group = parent.group.clone();
    for child in &mut parent.sub_features {
        if child.group.is_empty() {
            child.group = group.clone();
        }
        inherit_group(child);
    }
}

fn index_level(
    level: &[FlagDescriptor],
    parent: Option<&FlagId>,
    path: &mut Vec<usize>,
    index: &mut FxHashMap<FlagId, Slot>,
    order: &mut Vec<FlagId>,
) -> Result<(), CatalogError> {
    for (i, descriptor) in level.iter().enumerate() {
        if descriptor.id.as_str().trim().is_empty() {
            return Err(CatalogError::EmptyId { context: None });
        }
        if index.contains_key(&descriptor.id) {
            return Err(CatalogError::DuplicateId { id: descriptor.id.clone(), context: None });
        }

        path.push(i);
        index.insert(descriptor.id.clone(), Slot { path: path.clone(), parent: parent.cloned() });
        order.push(descriptor.id.clone());
        index_level(&descriptor.sub_features, Some(&descriptor.id), path, index, order)?;
        path.pop();
    }
    Ok(())
}

fn collect_ids<'a>(level: &'a [FlagDescriptor], out: &mut Vec<&'a FlagId>) {
    for descriptor in level {
        out.push(&descriptor.id);
        collect_ids(&descriptor.sub_features, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FlagCatalog {
        FlagCatalog::new(vec![
            FlagDescriptor::new("USE_NEUMORPHISM", "Neumorphic style").enabled(true).group("UI"),
            FlagDescriptor::new("USERS_MODULE", "Users")
                .enabled(true)
                .group("Core")
                .requires_auth()
                .permissions(Permissions::ADMIN)
                .sub_feature(FlagDescriptor::new("USER_PROFILES", "Profiles").enabled(true))
                .sub_feature(
                    FlagDescriptor::new("USER_ROLES", "Roles")
                        .sub_feature(FlagDescriptor::new("ROLE_AUDIT", "Audit trail")),
                ),
            FlagDescriptor::new("REPORTS_MODULE", "Reports"),
        ])
    }

    #[test]
    fn flatten_is_depth_first_pre_order() {
        let catalog = sample();
        let ids: Vec<&str> = catalog.flatten().map(|d| d.id.as_str()).collect();
        assert_eq!(
            ids,
            ["USE_NEUMORPHISM", "USERS_MODULE", "USER_PROFILES", "USER_ROLES", "ROLE_AUDIT", "REPORTS_MODULE"]
        );
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn sub_features_inherit_group() {
        let catalog = sample();
        assert_eq!(catalog.descriptor("ROLE_AUDIT").map(|d| &*d.group), Some("Core"));
        assert_eq!(catalog.descriptor("REPORTS_MODULE").map(|d| &*d.group), Some(DEFAULT_GROUP));
    }

    #[test]
    fn tree_relations_come_from_structure() {
        let catalog = sample();
        assert_eq!(catalog.parent("ROLE_AUDIT").map(FlagId::as_str), Some("USER_ROLES"));
        assert_eq!(catalog.children("USERS_MODULE").len(), 2);
        let descendants: Vec<&str> =
            catalog.descendants("USERS_MODULE").into_iter().map(FlagId::as_str).collect();
        assert_eq!(descendants, ["USER_PROFILES", "USER_ROLES", "ROLE_AUDIT"]);
        assert!(catalog.descendants("UNKNOWN").is_empty());

        let depths: Vec<usize> = catalog.walk().map(|e| e.depth).collect();
        assert_eq!(depths, [0, 0, 1, 1, 2, 0]);
    }

    #[test]
    fn duplicate_ids_are_rejected_at_any_depth() {
        let err = FlagCatalog::try_new(vec![
            FlagDescriptor::new("A", "a").sub_feature(FlagDescriptor::new("B", "b")),
            FlagDescriptor::new("C", "c").sub_feature(FlagDescriptor::new("B", "again")),
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId { id: FlagId::from_static("B"), context: None });
    }

    #[test]
    fn blank_ids_are_rejected() {
        let err = FlagCatalog::try_new(vec![FlagDescriptor::new(" ", "blank")]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyId { .. }));
        assert_eq!(err.to_string(), "Flag id cannot be empty");
    }

    #[test]
    fn groups_share_the_ordering_helper() {
        let grouped = group_in_order([3, 1, 4, 1, 5, 9, 2, 6], |n| n % 3);
        assert_eq!(grouped, [(0, vec![3, 9, 6]), (1, vec![1, 4, 1]), (2, vec![5, 2])]);
    }

    #[test]
    #[should_panic(expected = "invalid flag catalog")]
    fn new_panics_on_duplicates() {
        let _ = FlagCatalog::new(vec![FlagDescriptor::new("A", "a"), FlagDescriptor::new("A", "b")]);
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let catalog = sample();
        let names: Vec<&str> = catalog.groups().into_iter().map(|(g, _)| g).collect();
        assert_eq!(names, ["UI", "Core", DEFAULT_GROUP]);
    }

    #[test]
    fn permits_checks_auth_then_any_permission() {
        let catalog = sample();
        let users = catalog.descriptor("USERS_MODULE").unwrap();
        assert!(!users.permits(&AccessContext::anonymous()));
        assert!(!users.permits(&AccessContext::authenticated(Permissions::REPORTS_VIEWER)));
        assert!(users.permits(&AccessContext::authenticated(Permissions::ADMIN | Permissions::REPORTS_VIEWER)));

        let reports = catalog.descriptor("REPORTS_MODULE").unwrap();
        assert!(reports.permits(&AccessContext::anonymous()));
    }
}
