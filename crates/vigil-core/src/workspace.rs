//! Workspace layout: where MEMORY.md and the daily notes live.

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{VigilError, VigilResult};

/// Resolved paths for one agent workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    pub root: PathBuf,
}

impl WorkspacePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the workspace root, in order: an explicit path argument,
    /// the `VIGIL_WORKSPACE` environment variable, the nearest ancestor of
    /// the current directory that carries workspace markers (`MEMORY.md`
    /// or a `memory/` directory), the current directory itself.
    ///
    /// An explicitly named root must exist; the current-directory fallback
    /// is accepted as-is so read commands degrade to "nothing found"
    /// rather than refusing to run.
    pub fn discover(explicit: Option<&Path>) -> VigilResult<Self> {
        let root = match explicit {
            Some(path) => {
                if !path.is_dir() {
                    return Err(VigilError::Workspace(format!(
                        "workspace root not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match env::var_os("VIGIL_WORKSPACE") {
                Some(path) => {
                    let path = PathBuf::from(path);
                    if !path.is_dir() {
                        return Err(VigilError::Workspace(format!(
                            "VIGIL_WORKSPACE points at a missing directory: {}",
                            path.display()
                        )));
                    }
                    path
                }
                None => {
                    let cwd = env::current_dir()?;
                    Self::find_marked_root(&cwd).unwrap_or(cwd)
                }
            },
        };
        debug!(root = %root.display(), "workspace resolved");
        Ok(Self { root })
    }

    /// Nearest ancestor (including `start`) holding workspace markers.
    fn find_marked_root(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join("MEMORY.md").is_file() || dir.join("memory").is_dir())
            .map(Path::to_path_buf)
    }

    /// The long-term memory file.
    pub fn memory_md(&self) -> PathBuf {
        self.root.join("MEMORY.md")
    }

    /// Directory of dated daily notes (`YYYY-MM-DD.md`).
    pub fn memory_dir(&self) -> PathBuf {
        self.root.join("memory")
    }

    /// Directory where QA artifacts (`*_qa.json`) are written.
    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_root_must_exist() {
        let missing = Path::new("/nonexistent/vigil-workspace");
        assert!(WorkspacePaths::discover(Some(missing)).is_err());
    }

    #[test]
    fn test_explicit_root_wins() {
        let dir = tempfile::tempdir().unwrap();
        let ws = WorkspacePaths::discover(Some(dir.path())).unwrap();
        assert_eq!(ws.root, dir.path());
        assert_eq!(ws.memory_md(), dir.path().join("MEMORY.md"));
        assert_eq!(ws.memory_dir(), dir.path().join("memory"));
    }

    #[test]
    fn test_marked_root_is_found_in_an_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("MEMORY.md"), "facts").unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = WorkspacePaths::find_marked_root(&nested).unwrap();
        assert_eq!(found, dir.path());
    }

    #[test]
    fn test_unmarked_tree_yields_no_root_within_it() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("plain");
        std::fs::create_dir(&nested).unwrap();
        // The walk continues above the temp dir, so only assert that no
        // root inside the unmarked subtree is claimed.
        if let Some(root) = WorkspacePaths::find_marked_root(&nested) {
            assert!(!root.starts_with(dir.path()));
        }
    }
}
