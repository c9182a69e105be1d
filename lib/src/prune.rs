//! Removing generated documents that no longer have a row.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::document::is_managed;
use crate::error::{Chainable, Result};

/// Finds the managed `.md` documents under each `<root>/_<category>` directory
/// whose path, relative to `root`, is not in `written`.
///
/// Documents without a `managed_by = "spreadsheet"` marker are never listed.
/// Bytes that aren't UTF-8 are read lossily, so such a file is simply
/// unmanaged unless its front matter still carries the marker.
pub fn stale<I, S>(root: &Path, categories: I, written: &FxHashSet<PathBuf>) -> Result<Vec<PathBuf>>
    where I: IntoIterator<Item = S>, S: AsRef<str>
{
    let mut stale = vec![];
    for category in categories {
        let dir = root.join(format!("_{}", category.as_ref()));
        if !dir.is_dir() {
            continue;
        }

        for entry in jwalk::WalkDir::new(&dir).sort(true) {
            let entry = entry.chain_with(|| error! {
                "failed to walk output directory",
                "directory" => dir.display(),
            })?;

            let path = entry.path();
            if !entry.file_type.is_file() || path.extension().map_or(true, |ext| ext != "md") {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(&path);
            if written.contains(relative) {
                continue;
            }

            let bytes = std::fs::read(&path).chain_with(|| error! {
                "failed to read document while pruning",
                "path" => path.display(),
            })?;

            if is_managed(&String::from_utf8_lossy(&bytes)) {
                stale.push(path);
            }
        }
    }

    Ok(stale)
}

/// Deletes the documents [`stale`] finds. Returns the number removed.
pub fn prune<I, S>(root: &Path, categories: I, written: &FxHashSet<PathBuf>) -> Result<usize>
    where I: IntoIterator<Item = S>, S: AsRef<str>
{
    let stale = stale(root, categories, written)?;
    for path in &stale {
        std::fs::remove_file(path).chain_with(|| error! {
            "failed to remove stale document",
            "path" => path.display(),
        })?;

        tracing::info!(path = %path.display(), "pruned stale document");
    }

    Ok(stale.len())
}
