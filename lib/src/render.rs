//! Rendering of manifest pages through a template engine.
//!
//! Pages render in parallel, but results are consumed in manifest order, and
//! rendering stops at the first failing page in that order: a build reports
//! and writes exactly what a sequential build would have.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::error::Result;
use crate::manifest::PageDescriptor;
use crate::templating::Engine;

/// A rendered page and the output path, relative to the output root, that it
/// belongs at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub template: String,
    pub path: PathBuf,
    pub content: String,
}

/// Renders a single page.
pub fn render_page<E>(engine: &E, page: &PageDescriptor) -> Result<RenderedPage>
    where E: Engine + ?Sized
{
    let path = page.permapath()?;
    let content = engine.render(&page.template, &page.context)?;
    Ok(RenderedPage { template: page.template.clone(), path, content })
}

/// Renders every page in parallel. The result at index `i` is `None` only if
/// a page before `i` failed.
fn render_ordered<E>(engine: &E, pages: &[PageDescriptor]) -> Vec<Option<Result<RenderedPage>>>
    where E: Engine + ?Sized
{
    let first_failure = AtomicUsize::new(usize::MAX);
    pages.par_iter()
        .enumerate()
        .map(|(i, page)| {
            if i > first_failure.load(Ordering::Acquire) {
                return None;
            }

            let result = render_page(engine, page);
            if result.is_err() {
                first_failure.fetch_min(i, Ordering::AcqRel);
            }

            Some(result)
        })
        .collect()
}

/// Renders all `pages`, failing with the error of the first failing page in
/// manifest order.
pub fn render_all<E>(engine: &E, pages: &[PageDescriptor]) -> Result<Vec<RenderedPage>>
    where E: Engine + ?Sized
{
    render_ordered(engine, pages).into_iter().flatten().collect()
}

/// Renders all `pages` and hands each to `f` in manifest order. Stops at the
/// first failure, from rendering or from `f`: pages before it have been passed
/// to `f`, pages after it have not. Returns the number of pages passed to `f`.
pub fn render_each<E, F>(engine: &E, pages: &[PageDescriptor], mut f: F) -> Result<usize>
    where E: Engine + ?Sized, F: FnMut(RenderedPage) -> Result<()>
{
    let mut count = 0;
    for result in render_ordered(engine, pages).into_iter().flatten() {
        f(result?)?;
        count += 1;
    }

    Ok(count)
}
