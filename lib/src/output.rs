use std::{fs, io};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::fmt::Debug;

use crate::error::{Result, Chainable};
use crate::render::RenderedPage;

/// A destination for rendered pages.
pub trait Sink: Debug {
    /// Writes `page`, returning where it was written.
    fn write_page(&self, page: &RenderedPage) -> Result<PathBuf>;
}

/// Writes `bytes` to `relative` under `root`, creating missing parent
/// directories and replacing an existing file at the same path.
pub fn write<R: AsRef<Path>>(relative: &Path, bytes: &[u8], root: R) -> Result<PathBuf> {
    let path = root.as_ref().join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).chain_with(|| error! {
            WriteError, "failed to create page directory",
            "directory" => parent.display(),
        })?;
    }

    let file = fs::File::create(&path).chain_with(|| error! {
        WriteError, "failed to open/create file for writing",
        "file path" => path.display(),
    })?;

    let mut writer = io::BufWriter::new(file);
    writer.write_all(bytes)
        .and_then(|_| writer.flush())
        .chain_with(|| error! {
            WriteError, "failed to write page",
            "file path" => path.display(),
        })?;

    Ok(path)
}

/// A directory is a sink: pages are written at their path relative to it.
impl Sink for Path {
    fn write_page(&self, page: &RenderedPage) -> Result<PathBuf> {
        write(&page.path, page.content.as_bytes(), self)
    }
}

impl Sink for PathBuf {
    fn write_page(&self, page: &RenderedPage) -> Result<PathBuf> {
        self.as_path().write_page(page)
    }
}

impl<T: Sink + ?Sized> Sink for &T {
    fn write_page(&self, page: &RenderedPage) -> Result<PathBuf> {
        <T as Sink>::write_page(self, page)
    }
}
