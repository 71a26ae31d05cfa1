use super::{Model, ModelPopulator};
use crate::effects::Effects;
use crate::error::Result;
use crate::role::RoleStore;
use std::path::Path;

/// Makes the default role's variables visible to templates and guards.
/// Reads through the same [`Effects`] the vars handler writes with.
pub struct RoleModelPopulator<'a> {
    effects: &'a dyn Effects,
}

impl<'a> RoleModelPopulator<'a> {
    pub fn new(effects: &'a dyn Effects) -> Self {
        Self { effects }
    }
}

impl ModelPopulator for RoleModelPopulator<'_> {
    fn name(&self) -> &'static str {
        "role"
    }

    fn contribute_to_model(&self, root: &Path, model: &mut Model) -> Result<()> {
        let store = RoleStore::new(root);
        for (key, value) in store.load(self.effects, None)? {
            model.set_if_absent(key, value);
        }
        Ok(())
    }
}
