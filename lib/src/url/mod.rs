//! Mapping of logical page URLs to output file paths.
//!
//! A page at URL `/a/b/` is written to `a/b/index.html` under the output root;
//! the root URL (`""` or `/`) is written to `index.html`. Leading and trailing
//! slashes are irrelevant, as are empty and `.` segments:
//!
//! ```rust
//! use std::path::Path;
//! use atticus::url::permapath;
//!
//! assert_eq!(permapath("").unwrap(), Path::new("index.html"));
//! assert_eq!(permapath("/").unwrap(), Path::new("index.html"));
//! assert_eq!(permapath("a/b").unwrap(), Path::new("a/b/index.html"));
//! assert_eq!(permapath("/a/b/").unwrap(), Path::new("a/b/index.html"));
//! assert_eq!(permapath("//a/./b//").unwrap(), Path::new("a/b/index.html"));
//! ```

mod validate;

use std::path::PathBuf;

pub use validate::{validate, Invalid};

/// The file written for every page.
pub const INDEX_FILE: &str = "index.html";

/// The non-empty, non-`.` segments of `url`, in order.
///
/// Performs no validation: see [`validate()`].
pub fn segments(url: &str) -> impl Iterator<Item = &str> {
    url.split('/').filter(|s| !s.is_empty() && *s != ".")
}

/// Returns the output path, relative to the output root, of the page at `url`.
///
/// Fails if `url` could escape the output root or isn't a site-local path.
pub fn permapath(url: &str) -> Result<PathBuf, Invalid> {
    validate(url)?;

    let mut path: PathBuf = segments(url).collect();
    path.push(INDEX_FILE);
    Ok(path)
}

/// Returns the canonical, absolute form of `url`: a leading `/`, a trailing
/// `/` for every non-root page, and no empty or `.` segments.
///
/// ```rust
/// use atticus::url::canonical;
///
/// assert_eq!(canonical("").unwrap(), "/");
/// assert_eq!(canonical("/").unwrap(), "/");
/// assert_eq!(canonical("a/b").unwrap(), "/a/b/");
/// assert_eq!(canonical("/a//b/").unwrap(), "/a/b/");
/// assert!(canonical("/a/../b").is_err());
/// ```
pub fn canonical(url: &str) -> Result<String, Invalid> {
    validate(url)?;

    let mut canonical = String::with_capacity(url.len() + 2);
    canonical.push('/');
    for segment in segments(url) {
        canonical.push_str(segment);
        canonical.push('/');
    }

    Ok(canonical)
}
