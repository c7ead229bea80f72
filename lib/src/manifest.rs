//! The page manifest: an ordered JSON array of page descriptors.
//!
//! ```json
//! [
//!   { "url": "/", "template": "index.html", "context": { "title": "Home" } },
//!   { "url": "/about/", "template": "about.html" }
//! ]
//! ```

use std::{fs, io};
use std::path::{Path, PathBuf};

use derive_more::{Deref, From};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, Chainable};
use crate::url;

/// The variables a template is rendered with.
pub type Context = Map<String, Value>;

/// One page to render: which template, with which context, written where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDescriptor {
    pub url: String,
    pub template: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub context: Context,
}

fn null_as_empty<'de, D: Deserializer<'de>>(de: D) -> Result<Context, D::Error> {
    Ok(Option::<Context>::deserialize(de)?.unwrap_or_default())
}

impl PageDescriptor {
    /// The output path of this page, relative to the output root.
    pub fn permapath(&self) -> Result<PathBuf> {
        url::permapath(&self.url).chain_with(|| error! {
            ManifestMalformed, "page url cannot be mapped to an output path",
            "url" => &self.url,
        })
    }
}

/// All of the pages of a site, in manifest order.
#[derive(Debug, Default, Clone, PartialEq, Deref, From)]
pub struct Manifest(Vec<PageDescriptor>);

impl Manifest {
    /// Reads and parses the manifest at `path`. All-or-nothing: either every
    /// entry is valid or no manifest is produced.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            let error = match e.kind() {
                io::ErrorKind::NotFound => error! {
                    ManifestNotFound, "manifest file does not exist",
                    "path" => path.display(),
                },
                _ => error! {
                    ManifestMalformed, "manifest file exists but can't be read",
                    "path" => path.display(),
                },
            };

            error.with_cause(e)
        })?;

        let source = String::from_utf8(bytes).map_err(|e| error! {
            ManifestMalformed, "manifest is not valid UTF-8",
            "path" => path.display(),
            "byte offset" => e.utf8_error().valid_up_to(),
        })?;

        Self::parse(&source, path)
    }

    /// Parses `source` as a manifest. `origin` is used only in diagnostics.
    pub fn parse(source: &str, origin: &Path) -> Result<Self> {
        let value: Value = serde_json::from_str(source).map_err(|e| error!(
            ManifestMalformed, "manifest is not valid JSON",
            "path" => origin.display(),
            "line" => e.line(),
            "column" => e.column(),
        ).with_cause(e))?;

        let entries = match value {
            Value::Array(entries) => entries,
            other => return err! {
                ManifestMalformed, "manifest must be a JSON array of pages",
                "path" => origin.display(),
                "found" => json_kind(&other),
            },
        };

        let mut pages = Vec::with_capacity(entries.len());
        for (i, entry) in entries.into_iter().enumerate() {
            let url = entry.get("url").and_then(|v| v.as_str()).map(|s| s.to_owned());
            let page: PageDescriptor = serde_json::from_value(entry).chain_with(|| error! {
                ManifestMalformed, "invalid page entry",
                "path" => origin.display(),
                "entry" => i,
                if url.is_some() => "url" => url.as_deref().unwrap_or_default(),
            })?;

            url::validate(&page.url).chain_with(|| error! {
                ManifestMalformed, "invalid page url",
                "path" => origin.display(),
                "entry" => i,
                "url" => &page.url,
            })?;

            pages.push(page);
        }

        let manifest = Manifest(pages);
        manifest.warn_on_collisions();
        Ok(manifest)
    }

    /// Reports pairs of entries that map to the same output path. The later
    /// entry overwrites the earlier one.
    fn warn_on_collisions(&self) -> usize {
        let mut seen: FxHashMap<PathBuf, usize> = FxHashMap::default();
        let mut collisions = 0;
        for (i, page) in self.iter().enumerate() {
            let Ok(path) = url::permapath(&page.url) else { continue };
            if let Some(first) = seen.insert(path.clone(), i) {
                collisions += 1;
                tracing::warn!(
                    path = %path.display(), first, second = i,
                    "two manifest entries map to the same output path; the later entry wins"
                );
            }
        }

        collisions
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
