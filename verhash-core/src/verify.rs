use crate::digest::{file_digest, is_error_digest};
use crate::manifest::Manifest;
use crate::path_safety::validate_rel_path;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io;
use std::path::Path;
use tracing::debug;

#[derive(Serialize, Debug, Clone, Default)]
pub struct VerifyReport {
    pub version: String,
    pub ok: u64,
    pub mismatched: Vec<String>,
    pub missing: Vec<String>,
    /// Entries recorded as `Error: ...`, or files that could not be read now.
    pub unreadable: Vec<String>,
    /// Entries whose path would escape the root.
    pub rejected: Vec<String>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.mismatched.is_empty()
            && self.missing.is_empty()
            && self.unreadable.is_empty()
            && self.rejected.is_empty()
    }

    pub fn checked(&self) -> u64 {
        let failed = self.mismatched.len()
            + self.missing.len()
            + self.unreadable.len()
            + self.rejected.len();
        self.ok + failed as u64
    }
}

/// Re-hash every file listed in the manifest at `manifest_path` under `root`.
pub fn verify(manifest_path: &Path, root: &Path) -> Result<VerifyReport> {
    let mf = Manifest::read(manifest_path)
        .with_context(|| format!("read manifest {:?}", manifest_path))?;
    Ok(verify_manifest(&mf, root))
}

pub fn verify_manifest(mf: &Manifest, root: &Path) -> VerifyReport {
    let mut rep = VerifyReport { version: mf.version.clone(), ..Default::default() };
    for ent in &mf.entries {
        if is_error_digest(&ent.digest) {
            rep.unreadable.push(ent.rel_path.clone());
            continue;
        }
        let path = match validate_rel_path(root, &ent.rel_path) {
            Ok(p) => p,
            Err(e) => {
                debug!(path = %ent.rel_path, error = %e, "rejected manifest path");
                rep.rejected.push(ent.rel_path.clone());
                continue;
            }
        };
        match file_digest(&path) {
            Ok(d) if d == ent.digest => rep.ok += 1,
            Ok(_) => rep.mismatched.push(ent.rel_path.clone()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => rep.missing.push(ent.rel_path.clone()),
            Err(_) => rep.unreadable.push(ent.rel_path.clone()),
        }
    }
    rep
}
