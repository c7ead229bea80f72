use std::fmt;

/// Why a URL cannot be mapped to an output path.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Invalid {
    /// A `..` segment, which could escape the output root.
    ParentSegment,
    /// A scheme and authority such as `https://`: the URL isn't site-local.
    Scheme,
    /// A `?` query or `#` fragment, which has no file system meaning.
    QueryOrFragment,
    /// A `\` or NUL byte, which file systems interpret differently.
    ForbiddenChar(char),
}

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invalid::ParentSegment => write!(f, "`..` segments are not allowed"),
            Invalid::Scheme => write!(f, "URL must be a site path, not an absolute URL with a scheme"),
            Invalid::QueryOrFragment => write!(f, "URL must not contain a query or fragment"),
            Invalid::ForbiddenChar(c) => write!(f, "URL must not contain {c:?}"),
        }
    }
}

impl std::error::Error for Invalid { }

impl_error_detail_with_std_error!(Invalid);

/// Returns the scheme of `url` if it is an absolute URL of the form
/// `scheme://...`. A `:` after the first `/`, `?`, or `#`, or one not followed
/// by `//`, is part of a path segment.
fn scheme(url: &str) -> Option<&str> {
    let bytes = url.as_bytes();
    match memchr::memchr3(b':', b'?', b'/', bytes) {
        Some(i) if bytes[i] == b':' && bytes[i + 1..].starts_with(b"//") => {
            match memchr::memrchr(b'#', &bytes[..i]) {
                Some(_) => None,
                None => Some(&url[..i]),
            }
        }
        _ => None,
    }
}

/// Checks that `url` can be mapped to a path inside the output root.
pub fn validate(url: &str) -> Result<(), Invalid> {
    if let Some(c) = url.chars().find(|&c| c == '\\' || c == '\0') {
        return Err(Invalid::ForbiddenChar(c));
    }

    if scheme(url).is_some() {
        return Err(Invalid::Scheme);
    }

    if memchr::memchr2(b'?', b'#', url.as_bytes()).is_some() {
        return Err(Invalid::QueryOrFragment);
    }

    if url.split('/').any(|segment| segment == "..") {
        return Err(Invalid::ParentSegment);
    }

    Ok(())
}
