use crate::error::ToggleError;
use crate::manager::FlagManager;
use flagkit_domain::{FlagDescriptor, FlagId, FlagMap, group_in_order};
use tracing::debug;

/// One row of the administrative flag list.
#[derive(Debug, Clone, Copy)]
pub struct DraftEntry<'a> {
    pub descriptor: &'a FlagDescriptor,
    /// 0 for modules and top-level flags, 1 for their sub-features, and so on.
    pub depth: usize,
    /// The live value.
    pub live: bool,
    /// What the flag will be after commit.
    pub staged: bool,
}

impl DraftEntry<'_> {
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.live != self.staged
    }
}

/// Staged edits over the live flags, committed in one batch.
///
/// Nothing reaches the store until [`FlagDraft::commit`], which sends only the edits that
/// still differ from the live values.
#[derive(Debug, Clone)]
pub struct FlagDraft {
    manager: FlagManager,
    edits: FlagMap,
}

impl FlagDraft {
    pub(crate) fn new(manager: FlagManager) -> Self {
        Self { manager, edits: FlagMap::new() }
    }

    /// Stages `enabled` for `id`.
    ///
    /// # Errors
    /// Returns [`ToggleError::UnknownFlag`] if the catalog does not define `id`.
    pub fn stage(&mut self, id: impl Into<FlagId>, enabled: bool) -> Result<(), ToggleError> {
        let id = self.known(id.into())?;
        if self.manager.is_enabled(id.as_str()) == enabled {
            self.edits.remove(id.as_str());
        } else {
            self.edits.insert(id, enabled);
        }
        Ok(())
    }

    /// Flips the staged value and returns it.
    ///
    /// # Errors
    /// Returns [`ToggleError::UnknownFlag`] if the catalog does not define `id`.
    pub fn toggle(&mut self, id: impl Into<FlagId>) -> Result<bool, ToggleError> {
        let id = self.known(id.into())?;
        let next = !self.value(id.as_str());
        self.stage(id, next)?;
        Ok(next)
    }

    /// The staged value if there is one, the live value otherwise.
    #[must_use]
    pub fn value(&self, id: &str) -> bool {
        self.edits.get(id).copied().unwrap_or_else(|| self.manager.is_enabled(id))
    }

    /// Staged edits that differ from the live values right now.
    #[must_use]
    pub fn changes(&self) -> FlagMap {
        self.edits
            .iter()
            .filter(|(id, enabled)| self.manager.is_enabled(id.as_str()) != **enabled)
            .map(|(id, enabled)| (id.clone(), *enabled))
            .collect()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.changes().is_empty()
    }

    /// Every catalog flag in tree order, with live and staged values.
    #[must_use]
    pub fn entries(&self) -> Vec<DraftEntry<'_>> {
        self.manager
            .catalog()
            .walk()
            .map(|entry| {
                let id = entry.descriptor.id.as_str();
                DraftEntry {
                    descriptor: entry.descriptor,
                    depth: entry.depth,
                    live: self.manager.is_enabled(id),
                    staged: self.value(id),
                }
            })
            .collect()
    }

    /// [`FlagDraft::entries`] grouped by descriptor group, groups in order of first appearance.
    #[must_use]
    pub fn groups(&self) -> Vec<(&str, Vec<DraftEntry<'_>>)> {
        group_in_order(self.entries(), entry_group)
    }

    /// Drops every staged edit.
    pub fn discard(&mut self) {
        self.edits.clear();
    }

    /// Applies the edits that still differ from live state. Returns how many flags changed.
    pub fn commit(self) -> usize {
        let changes = self.changes();
        if changes.is_empty() {
            debug!("Flag draft committed with no changes");
            return 0;
        }
        debug!(changes = changes.len(), "Committing flag draft");
        self.manager.update_many(changes)
    }

    fn known(&self, id: FlagId) -> Result<FlagId, ToggleError> {
        if self.manager.catalog().contains(id.as_str()) {
            Ok(id)
        } else {
            Err(ToggleError::UnknownFlag { message: id.to_string().into(), context: None })
        }
    }
}

fn entry_group<'a>(entry: &DraftEntry<'a>) -> &'a str {
    &entry.descriptor.group
}
