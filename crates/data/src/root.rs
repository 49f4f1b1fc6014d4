use std::path::{Path, PathBuf};

use crate::error::{DataError, Result};

/// Directory entries whose name starts with this mark the project root (`.env`, `.env.local`, ...).
pub const MARKER_PREFIX: &str = ".env";

fn has_marker(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .any(|e| e.file_name().to_string_lossy().starts_with(MARKER_PREFIX))
        })
        .unwrap_or(false)
}

/// Walks from `start` towards the filesystem root and returns the first directory accepted by
/// `is_root`. The walk stops once a directory is its own parent.
pub fn find_marked_ancestor<F>(start: &Path, is_root: F) -> Result<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    let mut current = std::fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
    loop {
        if is_root(&current) {
            return Ok(current);
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => {
                return Err(DataError::MarkerNotFound {
                    start: start.to_path_buf(),
                })
            }
        }
    }
}

/// Finds the project root: the closest ancestor of `start` (itself included) holding a marker.
pub fn find_project_root<P: AsRef<Path>>(start: P) -> Result<PathBuf> {
    find_marked_ancestor(start.as_ref(), has_marker)
}

/// Where the pipeline keeps its data, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn discover<P: AsRef<Path>>(start: P) -> Result<Self> {
        find_project_root(start).map(Self::new)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("cad_builder").join("data")
    }

    pub fn annotations_dir(&self) -> PathBuf {
        self.data_dir().join("raw").join("annotations")
    }

    pub fn raw_stl_dir(&self) -> PathBuf {
        self.data_dir().join("raw").join("stl")
    }

    /// Rendered views of the mesh `identifier`, usually the raw STL file name.
    pub fn images_dir(&self, identifier: &str) -> PathBuf {
        self.data_dir().join("images").join(identifier)
    }

    pub fn prompts_dir(&self) -> PathBuf {
        self.data_dir().join("prompts")
    }

    pub fn prompt_path(&self, identifier: &str) -> PathBuf {
        self.prompts_dir().join(format!("{identifier}.json"))
    }

    pub fn prepared_csv(&self) -> PathBuf {
        self.data_dir().join("text2cad_v1.1.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_marker_in_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env.local"), "").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let root = find_project_root(&nested).unwrap();
        assert_eq!(std::fs::canonicalize(dir.path()).unwrap(), root);
    }

    #[test]
    fn start_directory_counts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".env")).unwrap();
        let root = find_project_root(dir.path()).unwrap();
        assert_eq!(std::fs::canonicalize(dir.path()).unwrap(), root);
    }

    #[test]
    fn walk_ends_at_filesystem_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_marked_ancestor(dir.path(), |_| false).unwrap_err();
        assert!(matches!(err, DataError::MarkerNotFound { .. }));
    }

    #[test]
    fn layout_paths() {
        let layout = ProjectLayout::new("/proj");
        assert_eq!(
            Path::new("/proj/cad_builder/data/images/chair.stl"),
            layout.images_dir("chair.stl")
        );
        assert_eq!(
            Path::new("/proj/cad_builder/data/prompts/chair.stl.json"),
            layout.prompt_path("chair.stl")
        );
        assert_eq!(
            Path::new("/proj/cad_builder/data/raw/stl"),
            layout.raw_stl_dir()
        );
    }
}
