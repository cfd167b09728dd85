//! Document sources for the loader.
//!
//! The loader does not care where documents come from; it only needs a list
//! of document paths and their text. [`FsSource`] reads a directory tree,
//! [`MemorySource`] serves documents held in memory.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::trace;

use crate::error::{Error, Result};

/// Trait for anything that can supply corpus documents.
///
/// Paths returned by [`list`](Self::list) are relative to the source root
/// and are handed back unchanged to [`read`](Self::read).
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// The name of this source (for logging/debugging).
    fn name(&self) -> &'static str;

    /// List the Markdown documents available, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be enumerated.
    async fn list(&self) -> Result<Vec<PathBuf>>;

    /// Read one document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    async fn read(&self, path: &Path) -> Result<String>;
}

/// Reads `*.md` files below a root directory.
///
/// Hidden directories (names starting with `.`) are skipped.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    /// Create a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

#[async_trait]
impl DocumentSource for FsSource {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    async fn list(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let scan_err = |source| Error::InputScan {
                path: dir.clone(),
                source,
            };
            let mut entries = tokio::fs::read_dir(&dir).await.map_err(scan_err)?;
            while let Some(entry) = entries.next_entry().await.map_err(scan_err)? {
                let path = entry.path();
                let file_type = entry.file_type().await.map_err(scan_err)?;
                if file_type.is_dir() {
                    if !is_hidden(&path) {
                        pending.push(path);
                    }
                } else if is_markdown(&path) {
                    let relative = path
                        .strip_prefix(&self.root)
                        .map_err(|e| Error::internal(format!("path outside input root: {e}")))?;
                    trace!(path = %relative.display(), "found document");
                    found.push(relative.to_path_buf());
                }
            }
        }

        found.sort();
        Ok(found)
    }

    async fn read(&self, path: &Path) -> Result<String> {
        let full = self.root.join(path);
        tokio::fs::read_to_string(&full)
            .await
            .map_err(|source| Error::DocumentRead {
                path: full,
                source,
            })
    }
}

/// Serves documents from memory, for tests and embedded corpora.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: BTreeMap<PathBuf, String>,
    unreadable: BTreeSet<PathBuf>,
}

impl MemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document (builder style).
    #[must_use]
    pub fn with(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    /// List a document whose reads always fail.
    #[must_use]
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.unreadable.insert(path.into());
        self
    }

    /// Add or replace a document.
    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.documents.insert(path.into(), text.into());
    }

    /// Remove a document, returning its text.
    pub fn remove(&mut self, path: impl AsRef<Path>) -> Option<String> {
        self.documents.remove(path.as_ref())
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<PathBuf>> {
        let paths: BTreeSet<PathBuf> = self
            .documents
            .keys()
            .chain(self.unreadable.iter())
            .cloned()
            .collect();
        Ok(paths.into_iter().collect())
    }

    async fn read(&self, path: &Path) -> Result<String> {
        match self.documents.get(path) {
            Some(text) if !self.unreadable.contains(path) => Ok(text.clone()),
            _ => Err(Error::DocumentRead {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "document not available"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_source_lists_markdown_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("cpp11_stl.md"), "# C++11 STL").unwrap();
        std::fs::write(root.join("README.md"), "# Index").unwrap();
        std::fs::write(root.join("notes.txt"), "skip").unwrap();
        std::fs::create_dir_all(root.join("docs")).unwrap();
        std::fs::write(root.join("docs/cpp14_stl.md"), "").unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join(".git/HEAD.md"), "").unwrap();

        let source = FsSource::new(root);
        let listed = source.list().await.unwrap();
        assert_eq!(
            listed,
            vec![
                PathBuf::from("README.md"),
                PathBuf::from("cpp11_stl.md"),
                PathBuf::from("docs/cpp14_stl.md"),
            ]
        );

        let text = source.read(Path::new("cpp11_stl.md")).await.unwrap();
        assert_eq!(text, "# C++11 STL");
    }

    #[tokio::test]
    async fn test_fs_source_missing_root_is_error() {
        let source = FsSource::new("/nonexistent/cppcat/corpus");
        let err = source.list().await.unwrap_err();
        assert!(err.is_io_failure());
        assert!(err.to_string().contains("/nonexistent/cppcat/corpus"));
    }

    #[tokio::test]
    async fn test_fs_source_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsSource::new(dir.path());
        let err = source.read(Path::new("gone.md")).await.unwrap_err();
        assert!(matches!(err, Error::DocumentRead { .. }));
    }

    #[tokio::test]
    async fn test_memory_source_round_trip() {
        let mut source = MemorySource::new().with("b.md", "B").with("a.md", "A");
        assert_eq!(
            source.list().await.unwrap(),
            vec![PathBuf::from("a.md"), PathBuf::from("b.md")]
        );
        assert_eq!(source.read(Path::new("a.md")).await.unwrap(), "A");

        assert_eq!(source.remove("a.md"), Some("A".to_string()));
        assert!(source.read(Path::new("a.md")).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_source_unreadable_is_listed() {
        let source = MemorySource::new().with_unreadable("x.md");
        assert_eq!(source.list().await.unwrap(), vec![PathBuf::from("x.md")]);
        assert!(source.read(Path::new("x.md")).await.is_err());
    }

    #[test]
    fn test_is_markdown() {
        assert!(is_markdown(Path::new("a/b.MD")));
        assert!(!is_markdown(Path::new("a/b.cpp")));
    }
}
