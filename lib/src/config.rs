use std::{fs, io};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, Chainable};

pub const TEMPLATE_DIR: &str = "templates";
pub const MANIFEST_FILE: &str = "config.json";
pub const STATIC_DIR: &str = "static";
pub const SETTINGS_FILE: &str = "site.toml";
pub const DEFAULT_OUTPUT: &str = "generated_html";

/// Where a build reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub input: PathBuf,
    pub templates: PathBuf,
    pub manifest: PathBuf,
    pub static_root: PathBuf,
    pub settings: PathBuf,
    pub output: PathBuf,
    pub verbose: bool,
}

impl BuildConfig {
    /// Resolves the fixed input layout under `input`. The output directory
    /// defaults to [`DEFAULT_OUTPUT`] in the working directory.
    pub fn new<I: AsRef<Path>>(input: I, output: Option<PathBuf>, verbose: bool) -> Self {
        let input = input.as_ref().to_path_buf();
        BuildConfig {
            templates: input.join(TEMPLATE_DIR),
            manifest: input.join(MANIFEST_FILE),
            static_root: input.join(STATIC_DIR),
            settings: input.join(SETTINGS_FILE),
            output: output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            input,
            verbose,
        }
    }
}

/// Optional site-wide settings. Every key is made available to templates as a
/// member of the global `G`.
#[derive(Default, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(flatten)]
    pub globals: FxHashMap<String, toml::Value>,
}

impl Settings {
    /// Reads the settings file at `path`. A missing file yields the defaults.
    pub fn discover(path: &Path) -> Result<Self> {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
            Err(e) => return Err(error!(
                ManifestMalformed, "failed to read site settings",
                "path" => path.display(),
            ).with_cause(e)),
        };

        toml::from_str(&source).chain_with(|| error! {
            ManifestMalformed, "site settings are not valid TOML",
            "path" => path.display(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn fixed_layout() {
        let config = BuildConfig::new("site", None, false);
        assert_eq!(config.templates, Path::new("site/templates"));
        assert_eq!(config.manifest, Path::new("site/config.json"));
        assert_eq!(config.static_root, Path::new("site/static"));
        assert_eq!(config.settings, Path::new("site/site.toml"));
        assert_eq!(config.output, Path::new("generated_html"));

        let config = BuildConfig::new("site", Some("out".into()), true);
        assert_eq!(config.output, Path::new("out"));
        assert!(config.verbose);
    }

    #[test]
    fn settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        assert_eq!(Settings::discover(&path).unwrap(), Settings::default());

        fs::write(&path, "name = \"Example\"\n[social]\nmastodon = \"@me\"\n").unwrap();
        let settings = Settings::discover(&path).unwrap();
        assert_eq!(settings.globals["name"].as_str(), Some("Example"));
        assert!(settings.globals["social"].is_table());

        fs::write(&path, "name = ").unwrap();
        let e = Settings::discover(&path).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::ManifestMalformed);
    }
}
