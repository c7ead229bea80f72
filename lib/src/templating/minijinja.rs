use std::path::{Path, PathBuf};

use minijinja::{Environment, ErrorKind, UndefinedBehavior, path_loader};
use minijinja::value::Value;
use serde::Serialize;

use crate::error::{Result, Chainable};
use crate::manifest::Context;
use crate::templating::{Engine, EngineInit};

#[derive(Debug)]
pub struct MiniJinjaEngine {
    root: PathBuf,
    env: Environment<'static>,
}

impl EngineInit for MiniJinjaEngine {
    type Engine = Self;

    fn init<G: Serialize>(root: &Path, globals: G) -> Self::Engine {
        let mut env = Environment::new();
        env.set_loader(path_loader(root));
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        env.add_global("G", Value::from_serializable(&globals));
        env.add_function("url", ext::url);
        env.add_function("now", ext::now);
        env.add_filter("slugify", ext::slugify);
        env.add_filter("deslug", ext::deslug);
        env.add_filter("date", ext::date);
        env.add_filter("split", ext::split);
        MiniJinjaEngine { root: root.to_path_buf(), env }
    }
}

impl MiniJinjaEngine {
    /// Loads the template `name`. Only a regular file under the root is a
    /// template: anything else at that path is not found.
    fn template(&self, name: &str) -> Result<minijinja::Template<'_, '_>> {
        self.env.get_template(name).map_err(|e| {
            let missing = e.kind() == ErrorKind::TemplateNotFound
                || !self.root.join(name).is_file();

            match missing {
                true => error!(
                    TemplateNotFound, "template does not exist",
                    "template" => name,
                ).with_cause(e),
                false => error!(
                    TemplateRenderError, "failed to load template",
                    "template" => name,
                ).with_cause(e),
            }
        })
    }
}

impl Engine for MiniJinjaEngine {
    fn resolve(&self, name: &str) -> Result<()> {
        self.template(name).map(|_| ())
    }

    fn render(&self, name: &str, context: &Context) -> Result<String> {
        let template = self.template(name)?;
        template.render(Value::from_serializable(context)).chain_with(|| error! {
            TemplateRenderError, "failed to render template",
            "template" => name,
        })
    }
}

mod ext {
    use minijinja::value::{Rest, Value};
    use minijinja::{Error, ErrorKind};

    /// Joins `parts` into the canonical site URL, e.g. `url("blog", "post")`
    /// is `/blog/post/`.
    pub fn url(parts: Rest<String>) -> Result<Value, Error> {
        let joined = parts.0.join("/");
        let url = crate::url::canonical(&joined)
            .map_err(|e| Error::new(ErrorKind::InvalidOperation, format!("`url`: {e}")))?;

        Ok(Value::from_safe_string(url))
    }

    pub fn slugify(value: &str) -> String {
        crate::util::slugify(value)
    }

    pub fn deslug(value: &str) -> String {
        value.replace('-', " ")
    }

    pub fn date(value: Value, fmt: &str) -> Result<Value, Error> {
        use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

        if let Ok(ts) = i64::try_from(value.clone()) {
            let datetime = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| Error::new(
                    ErrorKind::InvalidOperation,
                    "invalid timestamp provided to `date`"
                ))?;

            return Ok(datetime.format(fmt).to_string().into());
        }

        let kind = value.kind();
        let attr = value.get_attr("$__toml_private_datetime");
        let string = attr.as_ref()
            .ok()
            .filter(|v| !v.is_undefined())
            .map_or_else(|| value.as_str(), |v| v.as_str())
            .ok_or_else(|| Error::new(
                ErrorKind::InvalidOperation,
                format!("`date` must be applied to a string or integer, found {kind}")
            ))?;

        let datetime = string.parse::<NaiveDate>().map(|d| d.format(fmt).to_string())
            .or_else(|_| string.parse::<NaiveTime>().map(|t| t.format(fmt).to_string()))
            .or_else(|_| string.parse::<NaiveDateTime>().map(|dt| dt.format(fmt).to_string()))
            .or_else(|_| string.parse::<DateTime<Utc>>().map(|dt| dt.format(fmt).to_string()))
            .map_err(|e| Error::new(
                ErrorKind::InvalidOperation,
                format!("failed to parse {string}: {e}")
            ))?;

        Ok(datetime.into())
    }

    pub fn split(value: &str, pat: &str, n: Option<usize>) -> Value {
        match n {
            Some(n) => value.split(pat).nth(n).map(Value::from).unwrap_or(Value::UNDEFINED),
            None => value.split(pat).map(Value::from).collect(),
        }
    }

    pub fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}

impl_error_detail_with_std_error!(minijinja::Error);
