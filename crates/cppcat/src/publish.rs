//! Writing a rendered site to disk.
//!
//! Files whose on-disk content already hashes to the same BLAKE3 digest are
//! left untouched, so repeated builds of an unchanged corpus do not bump
//! modification times. A `manifest.json` mapping each output path to its
//! hash is written alongside the site. Files from earlier builds that are no
//! longer produced are not removed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::render::Site;

/// Name of the manifest written next to the site.
pub const MANIFEST_FILE: &str = "manifest.json";

/// What a publish run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishSummary {
    /// Files that were created or changed.
    pub written: Vec<String>,
    /// Files whose content was already current.
    pub unchanged: Vec<String>,
    /// Location of the manifest.
    pub manifest: PathBuf,
}

/// Compute the BLAKE3 hash of the given content.
#[must_use]
pub fn compute_hash(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

fn current_hash(path: &Path) -> Option<String> {
    fs::read(path)
        .ok()
        .map(|bytes| blake3::hash(&bytes).to_hex().to_string())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

/// Write `content` to `path` unless it already holds exactly that content.
///
/// Returns `true` if the file was written.
fn write_if_changed(path: &Path, content: &str, hash: &str) -> Result<bool> {
    if current_hash(path).as_deref() == Some(hash) {
        return Ok(false);
    }
    ensure_parent(path)?;
    fs::write(path, content).map_err(|source| Error::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

/// Write every file of `site` below `output_root`.
///
/// # Errors
///
/// Returns an error if a directory cannot be created or a file cannot be
/// written. Files written before the failure stay on disk.
pub fn publish(site: &Site, output_root: &Path) -> Result<PublishSummary> {
    if !output_root.exists() {
        fs::create_dir_all(output_root).map_err(|source| Error::DirectoryCreate {
            path: output_root.to_path_buf(),
            source,
        })?;
    }

    let mut summary = PublishSummary::default();
    let mut hashes = BTreeMap::new();

    for (relative, content) in site.iter() {
        let target = output_root.join(relative);
        let hash = compute_hash(content);
        if write_if_changed(&target, content, &hash)? {
            debug!(path = %target.display(), "wrote");
            summary.written.push(relative.to_string());
        } else {
            summary.unchanged.push(relative.to_string());
        }
        hashes.insert(relative, hash);
    }

    let manifest = output_root.join(MANIFEST_FILE);
    let mut json = serde_json::to_string_pretty(&hashes)?;
    json.push('\n');
    write_if_changed(&manifest, &json, &compute_hash(&json))?;
    summary.manifest = manifest;

    info!(
        output = %output_root.display(),
        written = summary.written.len(),
        unchanged = summary.unchanged.len(),
        "site published"
    );
    Ok(summary)
}
