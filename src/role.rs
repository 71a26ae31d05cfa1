//! Persisted role variables under `.spring/roles/vars`.
//!
//! The default role lives in `vars.yml`, a named role `<name>` in
//! `vars-<name>.yml`. Files are flat YAML maps in block style.

use crate::constants::ROLES_VARS_DIR;
use crate::effects::Effects;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub type RoleVars = IndexMap<String, Value>;

const FILE_STEM: &str = "vars";
const FILE_EXTENSION: &str = "yml";

#[derive(Debug, Clone)]
pub struct RoleStore {
    dir: PathBuf,
}

impl RoleStore {
    pub fn new(project_root: &Path) -> Self {
        Self { dir: project_root.join(ROLES_VARS_DIR) }
    }

    /// Path of the file holding `role`; `None` or an empty name is the
    /// default role.
    pub fn file_path(&self, role: Option<&str>) -> PathBuf {
        match role.filter(|name| !name.is_empty()) {
            Some(name) => self.dir.join(format!("{FILE_STEM}-{name}.{FILE_EXTENSION}")),
            None => self.dir.join(format!("{FILE_STEM}.{FILE_EXTENSION}")),
        }
    }

    /// Reads a role. A role that was never written is empty.
    pub fn load(&self, effects: &dyn Effects, role: Option<&str>) -> Result<RoleVars> {
        let path = self.file_path(role);
        if !effects.exists(&path) {
            return Ok(RoleVars::new());
        }
        let text = effects.read_text(&path)?;
        let vars: Option<RoleVars> = serde_yaml::from_str(&text)
            .map_err(|e| Error::Role { path: path.clone(), reason: e.to_string() })?;
        Ok(vars.unwrap_or_default())
    }

    /// Overlays `entries` onto the stored role (new values win) and writes
    /// it back. Returns the path written.
    pub fn update(
        &self,
        effects: &dyn Effects,
        role: Option<&str>,
        entries: &RoleVars,
    ) -> Result<PathBuf> {
        let path = self.file_path(role);
        let mut vars = self.load(effects, role)?;
        for (key, value) in entries {
            vars.insert(key.clone(), value.clone());
        }

        let yaml = serde_yaml::to_string(&vars)
            .map_err(|e| Error::Role { path: path.clone(), reason: e.to_string() })?;
        effects.write_text(&path, &platform_line_endings(yaml))?;
        log::debug!("Updated role file {}", path.display());
        Ok(path)
    }

    /// Names of the stored non-default roles, sorted.
    pub fn role_names(&self, effects: &dyn Effects) -> Result<Vec<String>> {
        let prefix = format!("{FILE_STEM}-");
        let suffix = format!(".{FILE_EXTENSION}");
        let mut names: Vec<String> = effects
            .list_dir(&self.dir)?
            .iter()
            .filter(|path| !effects.is_dir(path))
            .filter_map(|path| path.file_name()?.to_str())
            .filter_map(|name| name.strip_prefix(&prefix)?.strip_suffix(&suffix))
            .map(str::to_string)
            .collect();
        names.sort();
        Ok(names)
    }
}

fn platform_line_endings(text: String) -> String {
    if cfg!(windows) {
        text.replace('\n', "\r\n")
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{MemoryEffects, OsEffects};
    use serde_json::json;

    #[test]
    fn file_paths_follow_role_names() {
        let store = RoleStore::new(Path::new("/project"));
        assert_eq!(
            store.file_path(None),
            Path::new("/project/.spring/roles/vars/vars.yml")
        );
        assert_eq!(store.file_path(Some("")), store.file_path(None));
        assert_eq!(
            store.file_path(Some("qa")),
            Path::new("/project/.spring/roles/vars/vars-qa.yml")
        );
    }

    #[test]
    fn update_overlays_existing_values() {
        let effects = MemoryEffects::new()
            .with_file("/project/.spring/roles/vars/vars.yml", "keep: 1\nreplace: old\n");
        let store = RoleStore::new(Path::new("/project"));

        let entries: RoleVars =
            [("replace".to_string(), json!("new")), ("added".to_string(), json!(true))]
                .into_iter()
                .collect();
        store.update(&effects, None, &entries).unwrap();

        let vars = store.load(&effects, None).unwrap();
        assert_eq!(vars.get("keep"), Some(&json!(1)));
        assert_eq!(vars.get("replace"), Some(&json!("new")));
        assert_eq!(vars.get("added"), Some(&json!(true)));
    }

    #[test]
    fn missing_role_loads_empty() {
        let store = RoleStore::new(Path::new("/project"));
        assert!(store.load(&MemoryEffects::new(), Some("dev")).unwrap().is_empty());
    }

    #[test]
    fn malformed_role_file_is_reported() {
        let effects =
            MemoryEffects::new().with_file("/project/.spring/roles/vars/vars.yml", "- a\n- b\n");
        let store = RoleStore::new(Path::new("/project"));
        assert!(matches!(store.load(&effects, None), Err(Error::Role { .. })));
    }

    #[test]
    fn role_names_read_through_effects() {
        let effects = MemoryEffects::new()
            .with_file("/project/.spring/roles/vars/vars-prod.yml", "a: b\n")
            .with_file("/project/.spring/roles/vars/vars.yml", "a: c\n")
            .with_file("/project/.spring/roles/vars/notes.txt", "")
            .with_dir("/project/.spring/roles/vars/vars-dir.yml");
        let store = RoleStore::new(Path::new("/project"));
        assert_eq!(store.role_names(&effects).unwrap(), vec!["prod"]);
        assert!(RoleStore::new(Path::new("/other")).role_names(&effects).unwrap().is_empty());
    }

    #[test]
    fn role_names_lists_named_roles() {
        let dir = tempfile::tempdir().unwrap();
        let store = RoleStore::new(dir.path());
        let entries: RoleVars = [("a".to_string(), json!("b"))].into_iter().collect();
        store.update(&OsEffects, None, &entries).unwrap();
        store.update(&OsEffects, Some("qa"), &entries).unwrap();
        store.update(&OsEffects, Some("dev"), &entries).unwrap();

        assert_eq!(store.role_names(&OsEffects).unwrap(), vec!["dev", "qa"]);
        let written = std::fs::read_to_string(store.file_path(Some("qa"))).unwrap();
        assert!(written.starts_with("a: b"));
    }
}
