//! Deterministic enumeration of the files under a root directory.
//!
//! Both passes of a run (count, then hash) go through [`FileWalker::files`],
//! so they see the same order: lexical by file name within each directory,
//! depth-first. Symlinks are listed but never descended into, which rules
//! out traversal cycles. A symlink to a directory is not a file and is
//! skipped; a symlink to a file (or a dangling one) is listed like a file.

use std::path::{Component, Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

#[derive(Clone, Debug)]
pub struct FileWalker {
    root: PathBuf,
    skip: Option<PathBuf>,
}

impl FileWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), skip: None }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Exclude `output` from the walk if it resolves to a location under the root.
    /// Paths that cannot be resolved are ignored.
    pub fn skipping_output(mut self, output: &Path) -> Self {
        self.skip = resolve_under_root(&self.root, output);
        self
    }

    /// Files under the root, in walk order. Unreadable subtrees are logged and skipped.
    pub fn files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|ent| match ent {
                Ok(ent) => Some(ent),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    None
                }
            })
            .filter(is_listed_file)
            .map(DirEntry::into_path)
            .filter(move |p| self.skip.as_deref() != Some(p.as_path()))
    }

    /// The count pass: how many items [`FileWalker::files`] yields right now.
    pub fn count(&self) -> usize {
        self.files().count()
    }
}

fn is_listed_file(ent: &DirEntry) -> bool {
    let ft = ent.file_type();
    if ft.is_dir() {
        return false;
    }
    if ft.is_symlink() {
        return !ent.path().is_dir();
    }
    true
}

fn resolve_under_root(root: &Path, output: &Path) -> Option<PathBuf> {
    let name = output.file_name()?;
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let parent_can = std::fs::canonicalize(parent).ok()?;
    let root_can = std::fs::canonicalize(root).ok()?;
    let inner = parent_can.strip_prefix(&root_can).ok()?;
    Some(root.join(inner).join(name))
}

/// `path` relative to `root`, with `/` separators on every platform.
pub fn rel_path(root: &Path, path: &Path) -> String {
    let rel = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    parts.join("/")
}
