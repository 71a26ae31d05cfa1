use std::path::{Path, PathBuf};

/// Extension trait for Path used when resolving action targets.
pub trait PathExt {
    /// Resolves `self` against `base` unless it is already absolute.
    ///
    /// # Examples
    /// ```
    /// use stencil::ext::PathExt;
    /// use std::path::Path;
    ///
    /// let resolved = Path::new("src/lib.rs").resolve_from(Path::new("/project"));
    /// assert_eq!(resolved, Path::new("/project/src/lib.rs"));
    /// ```
    fn resolve_from(&self, base: &Path) -> PathBuf;

    /// Whether the final component starts with a dot.
    fn is_hidden(&self) -> bool;
}

impl PathExt for Path {
    fn resolve_from(&self, base: &Path) -> PathBuf {
        if self.is_absolute() {
            self.to_path_buf()
        } else {
            base.join(self)
        }
    }

    fn is_hidden(&self) -> bool {
        self.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('.'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_from_keeps_absolute_paths() {
        let base = Path::new("/project");
        let absolute = std::env::temp_dir().join("x.txt");
        assert_eq!(absolute.resolve_from(base), absolute);
        assert_eq!(Path::new("a/b.txt").resolve_from(base), base.join("a/b.txt"));
    }

    #[test]
    fn detects_hidden_entries() {
        assert!(Path::new("cmds/.git").is_hidden());
        assert!(!Path::new("cmds/new").is_hidden());
    }
}
