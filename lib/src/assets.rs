//! Copying of the static asset tree into the output root.

use std::fs;
use std::path::Path;

use jwalk::WalkDir;

use crate::error::{Result, Chainable};
use crate::util::dircheck;

/// Copies the children of `static_root` into `output_root`, preserving
/// relative paths. Directories that already exist are merged into; files that
/// already exist are replaced.
///
/// Returns `None` without touching `output_root` if `static_root` doesn't
/// exist, otherwise the number of files copied.
pub fn copy_tree(static_root: &Path, output_root: &Path) -> Result<Option<usize>> {
    let exists = dircheck(static_root, || error! {
        CopyError, "static asset path must be a directory",
        "path" => static_root.display(),
    })?;

    if !exists {
        tracing::debug!(path = %static_root.display(), "no static assets");
        return Ok(None);
    }

    fs::create_dir_all(output_root).chain_with(|| error! {
        CopyError, "failed to create output directory",
        "directory" => output_root.display(),
    })?;

    let mut files = 0;
    let walker = WalkDir::new(static_root)
        .follow_links(true)
        .sort(true)
        .skip_hidden(false);

    for entry in walker {
        let entry = entry.chain_with(|| error! {
            CopyError, "failed to read static asset tree",
            "root" => static_root.display(),
        })?;

        if entry.depth == 0 {
            continue;
        }

        let source = entry.path();
        let relative = source.strip_prefix(static_root).map_err(|_| error! {
            CopyError, "static asset is outside of the static root",
            "path" => source.display(),
            "root" => static_root.display(),
        })?;

        let dest = output_root.join(relative);
        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&dest).chain_with(|| error! {
                CopyError, "failed to create asset directory",
                "directory" => dest.display(),
            })?;
        } else if file_type.is_file() {
            fs::copy(&source, &dest).chain_with(|| error! {
                CopyError, "failed to copy asset",
                "source path" => source.display(),
                "destination path" => dest.display(),
            })?;

            tracing::debug!(source = %source.display(), dest = %dest.display(), "copied asset");
            files += 1;
        } else {
            tracing::debug!(path = %source.display(), "skipping special file");
        }
    }

    Ok(Some(files))
}
