pub mod minijinja;

use std::fmt::Debug;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::manifest::Context;

pub trait EngineInit {
    type Engine: Engine + 'static;

    /// Creates an engine loading templates from the directory `root`. Every
    /// template sees `globals` as `G`.
    fn init<G: Serialize>(root: &Path, globals: G) -> Self::Engine;
}

/// A template engine, opaque to the rest of the pipeline.
pub trait Engine: Send + Sync + Debug {
    /// Checks that the template `name` exists and can be loaded. Fails with
    /// `TemplateNotFound` if it doesn't exist.
    fn resolve(&self, name: &str) -> Result<()>;

    /// Renders the template `name` with the variables in `context`.
    fn render(&self, name: &str, context: &Context) -> Result<String>;
}
