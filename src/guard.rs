use std::path::{Component, Path, PathBuf};

use crate::error::ArgumentError;

/// Confines contract-source writes to the Clarinet projects directory.
pub struct ProjectGuard {
    /// Canonical (absolute, symlinks resolved) projects root.
    canonical_root: PathBuf,
}

impl ProjectGuard {
    /// Create a guard for the given projects directory, creating it if needed.
    pub fn new(projects_dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(projects_dir)?;
        let canonical_root = std::fs::canonicalize(projects_dir)?;
        Ok(Self { canonical_root })
    }

    pub fn canonical_root(&self) -> &Path {
        &self.canonical_root
    }

    /// Resolve a relative write target, creating its parent directories.
    ///
    /// Rejects absolute paths, `..` components and symlinked parents that
    /// lead outside the root.
    pub fn resolve_write(&self, relative: &Path) -> Result<PathBuf, ArgumentError> {
        let outside = || ArgumentError::OutsideProjects {
            path: relative.to_path_buf(),
            root: self.canonical_root.clone(),
        };

        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(outside());
        }
        let file_name = relative.file_name().ok_or_else(outside)?;

        let target = self.canonical_root.join(relative);
        let parent = target.parent().ok_or_else(outside)?;
        std::fs::create_dir_all(parent)?;
        let canonical_parent = std::fs::canonicalize(parent)?;

        if !canonical_parent.starts_with(&self.canonical_root) {
            return Err(outside());
        }
        Ok(canonical_parent.join(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_root_and_allows_nested_writes() {
        let tmp = TempDir::new().unwrap();
        let guard = ProjectGuard::new(&tmp.path().join("projects")).unwrap();
        let target = guard
            .resolve_write(Path::new("demo/contracts/counter.clar"))
            .unwrap();
        assert!(target.starts_with(guard.canonical_root()));
        assert!(target.parent().unwrap().is_dir());
    }

    #[test]
    fn rejects_parent_traversal_and_absolute_paths() {
        let tmp = TempDir::new().unwrap();
        let guard = ProjectGuard::new(&tmp.path().join("projects")).unwrap();
        assert!(matches!(
            guard.resolve_write(Path::new("../escape.clar")),
            Err(ArgumentError::OutsideProjects { .. })
        ));
        assert!(guard.resolve_write(Path::new("/tmp/escape.clar")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn rejects_symlink_escape() {
        let tmp = TempDir::new().unwrap();
        let outside = tmp.path().join("outside");
        std::fs::create_dir_all(&outside).unwrap();
        let guard = ProjectGuard::new(&tmp.path().join("projects")).unwrap();
        std::os::unix::fs::symlink(&outside, guard.canonical_root().join("link")).unwrap();

        assert!(matches!(
            guard.resolve_write(Path::new("link/evil.clar")),
            Err(ArgumentError::OutsideProjects { .. })
        ));
    }
}
