//! A pipeline for rendering manifest-driven static sites.
//!
//! # Overview
//!
//! An input directory is laid out as:
//!
//! ```text
//! input/
//! ├── config.json     the manifest: which pages to render, and how
//! ├── site.toml       optional: globals available to every template as `G`
//! ├── templates/      templates, loaded by name
//! └── static/         optional: copied verbatim into the output root
//! ```
//!
//! The manifest is a JSON array of pages, each naming a `url`, a `template`,
//! and an optional `context` object whose keys become template variables:
//!
//! ```json
//! [{ "url": "/", "template": "index.html", "context": { "title": "Hi" } }]
//! ```
//!
//! A build proceeds in order:
//!
//! 1. The output directory is checked to _not_ exist and the template
//!    directory to exist.
//! 2. The manifest is loaded, all-or-nothing.
//! 3. Every page is rendered and written to `<url>/index.html` under the
//!    output root, in manifest order.
//! 4. The static tree is copied into the output root, merging with rendered
//!    directories. Static files win any collision with a rendered page.
//!
//! Every failure is fatal and carries an [`ErrorKind`]. See [`build()`].

#[macro_use]
pub mod error;
pub mod util;
pub mod url;
pub mod config;
pub mod manifest;
pub mod templating;
pub mod render;
pub mod output;
pub mod assets;
pub mod build;

pub use build::{build, Builder, Report, Stage};
pub use config::BuildConfig;
pub use error::{Error, ErrorKind, Result};
