use super::{Model, ModelPopulator};
use crate::error::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SOURCE_ROOT: &str = "src/main/java";
const APPLICATION_MARKER: &str = "@SpringBootApplication";

/// Locates the Java source file carrying the application annotation.
pub fn find_application_file(root: &Path) -> Result<Option<PathBuf>> {
    let source_root = root.join(SOURCE_ROOT);
    if !source_root.is_dir() {
        return Ok(None);
    }
    for entry in WalkDir::new(&source_root).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "java") {
            continue;
        }
        log::debug!("Looking for {APPLICATION_MARKER} in {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        if contents.lines().any(|line| line.contains(APPLICATION_MARKER)) {
            return Ok(Some(path.to_path_buf()));
        }
    }
    Ok(None)
}

/// Contributes `root-package` and `root-package-dir`.
pub struct RootPackageModelPopulator;

impl ModelPopulator for RootPackageModelPopulator {
    fn name(&self) -> &'static str {
        "root-package"
    }

    fn contribute_to_model(&self, root: &Path, model: &mut Model) -> Result<()> {
        let Some(application) = find_application_file(root)? else {
            return Ok(());
        };
        let source_root = root.join(SOURCE_ROOT);
        let Some(package_dir) = application
            .parent()
            .and_then(|dir| dir.strip_prefix(&source_root).ok())
        else {
            return Ok(());
        };

        let segments: Vec<String> = package_dir
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let package = segments.join(".");
        let dir = segments.join(std::path::MAIN_SEPARATOR_STR);

        model.set_if_absent("root-package", Value::String(package));
        model.set_if_absent("root-package-dir", Value::String(dir));
        Ok(())
    }
}
