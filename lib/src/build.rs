//! The build driver: validate, load, render, copy.
//!
//! ```text
//! Start -> ValidateInputs -> LoadManifest -> RenderPages -> CopyAssets -> Done
//! ```
//!
//! Any stage may fail; the failure is returned as-is and nothing is retried or
//! rolled back. Pages written before a failure stay on disk.

use std::{fmt, fs, io};
use std::io::Write;
use std::path::Path;

use crate::config::{BuildConfig, Settings};
use crate::error::{Result, Chainable};
use crate::manifest::Manifest;
use crate::output::Sink;
use crate::templating::{Engine, EngineInit};
use crate::templating::minijinja::MiniJinjaEngine;
use crate::{assets, render, util};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    Start,
    ValidateInputs,
    LoadManifest,
    RenderPages,
    CopyAssets,
    Done,
}

/// What a successful build produced.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Report {
    pub pages: usize,
    pub assets: usize,
}

pub struct Builder<'a> {
    config: &'a BuildConfig,
    stage: Stage,
    stdout: Box<dyn Write + 'a>,
}

/// Builds the site described by `config` with the default template engine.
pub fn build(config: &BuildConfig) -> Result<Report> {
    Builder::new(config).run::<MiniJinjaEngine>()
}

impl<'a> Builder<'a> {
    pub fn new(config: &'a BuildConfig) -> Self {
        Builder { config, stage: Stage::Start, stdout: Box::new(io::stdout()) }
    }

    /// Sends verbose progress lines to `stdout` instead of the process's
    /// standard output.
    pub fn with_stdout<W: Write + 'a>(mut self, stdout: W) -> Self {
        self.stdout = Box::new(stdout);
        self
    }

    /// The last stage entered. After a failed [`run()`](Self::run), the stage
    /// that failed.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        tracing::debug!(from = ?self.stage, to = ?stage, "build stage");
        self.stage = stage;
    }

    pub fn run<E: EngineInit>(&mut self) -> Result<Report> {
        self.enter(Stage::ValidateInputs);
        self.validate()?;

        self.enter(Stage::LoadManifest);
        let manifest = Manifest::load(&self.config.manifest)?;
        let settings = Settings::discover(&self.config.settings)?;

        self.enter(Stage::RenderPages);
        let engine = E::init(&self.config.templates, &settings.globals);
        let pages = self.render_pages(&engine, &manifest)?;

        self.enter(Stage::CopyAssets);
        let assets = self.copy_assets()?;

        self.enter(Stage::Done);
        let report = Report { pages, assets };
        tracing::info!(pages, assets, output = %self.config.output.display(), "build complete");
        Ok(report)
    }

    fn validate(&self) -> Result<()> {
        let config = self.config;
        if fs::symlink_metadata(&config.output).is_ok() {
            return err! {
                OutputExists, "output directory already exists",
                "path" => config.output.display(),
            };
        }

        let templates = util::dircheck(&config.templates, || error! {
            TemplateRootMissing, "template path is not a directory",
            "path" => config.templates.display(),
        })?;

        if !templates {
            return err! {
                TemplateRootMissing, "template directory does not exist",
                "path" => config.templates.display(),
            };
        }

        Ok(())
    }

    /// Writes one verbose progress line, if verbose output is enabled.
    fn progress(&mut self, line: fmt::Arguments<'_>) -> Result<()> {
        if !self.config.verbose {
            return Ok(());
        }

        writeln!(self.stdout, "{line}").chain_with(|| error! {
            WriteError, "failed to write progress output",
        })
    }

    fn render_pages<E: Engine + ?Sized>(&mut self, engine: &E, manifest: &Manifest) -> Result<usize> {
        let config = self.config;
        let output = &config.output;
        create_output(output)?;

        render::render_each(engine, manifest, |page| {
            let written = output.write_page(&page)?;
            tracing::debug!(template = %page.template, path = %written.display(), "rendered page");
            self.progress(format_args!("Rendered {} -> {}", page.template, written.display()))
        })
    }

    fn copy_assets(&mut self) -> Result<usize> {
        let config = self.config;
        match assets::copy_tree(&config.static_root, &config.output)? {
            Some(files) => {
                let (src, dst) = (config.static_root.display(), config.output.display());
                self.progress(format_args!("Copied {src} -> {dst}"))?;
                Ok(files)
            }
            None => Ok(0),
        }
    }
}

impl fmt::Debug for Builder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("config", &self.config)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

/// Creates the output root, which must not exist yet. Missing parents are
/// created.
fn create_output(output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).chain_with(|| error! {
            WriteError, "failed to create output directory parent",
            "path" => parent.display(),
        })?;
    }

    fs::create_dir(output).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => error!(
            OutputExists, "output directory already exists",
            "path" => output.display(),
        ),
        _ => error!(
            WriteError, "failed to create output directory",
            "path" => output.display(),
        ).with_cause(e),
    })
}
