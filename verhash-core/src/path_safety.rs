use anyhow::{bail, Result};
use std::path::{Component, Path, PathBuf};

/// Resolve a manifest-recorded `rel` path under `root`.
///
/// Manifests are plain text and may come from elsewhere: reject empty and
/// absolute paths and any `..` component so a lookup never leaves `root`.
pub fn validate_rel_path(root: &Path, rel: &str) -> Result<PathBuf> {
    if rel.is_empty() {
        bail!("empty path");
    }
    let rel_path = Path::new(rel);
    if rel_path.is_absolute() || rel.starts_with('/') || rel.starts_with('\\') {
        bail!("absolute paths are not allowed: {:?}", rel);
    }
    let mut out = root.to_path_buf();
    for comp in rel_path.components() {
        match comp {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir => bail!("parent traversal not allowed: {:?}", rel),
            Component::RootDir | Component::Prefix(_) => {
                bail!("absolute paths are not allowed: {:?}", rel)
            }
        }
    }
    Ok(out)
}
