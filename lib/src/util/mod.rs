use std::path::Path;

use crate::error::{Error, Result};

/// Convert spaces to hyphens. Remove characters that aren't alphanumerics,
/// underscores, or hyphens. Convert to lowercase. Also strip leading and
/// trailing whitespace.
pub fn slugify(string: &str) -> String {
    let mut output = String::with_capacity(string.len());

    let mut need_dash = false;
    for ch in string.chars() {
        let ascii = deunicode::deunicode_char(ch).unwrap_or("-");
        if ascii.is_empty() || ch.is_whitespace() {
            need_dash = !output.is_empty();
            continue;
        }

        for b in ascii.bytes() {
            match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' => {
                    if need_dash {
                        output.push('-');
                        need_dash = false;
                    }

                    output.push(b.to_ascii_lowercase() as char);
                }
                _ => {
                    // This deviates from Django: all sequences of characters
                    // not alphanumeric or `_` or converted into one `-`.
                    need_dash = !output.is_empty();
                }
            }
        }
    }

    output
}

/// Returns `Ok(true)` if `path` is an existing directory, `Ok(false)` if
/// nothing exists at `path`, and the error made by `not_dir` if something
/// other than a directory does or `path` can't be inspected.
pub fn dircheck<F>(path: &Path, not_dir: F) -> Result<bool>
    where F: FnOnce() -> Error
{
    match path.metadata() {
        Ok(metadata) if metadata.is_dir() => Ok(true),
        Ok(_) => Err(not_dir()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(not_dir().with_cause(e)),
    }
}
