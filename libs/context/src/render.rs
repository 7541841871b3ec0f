//! Template rendering seam
//!
//! [`Context::display`](crate::Context::display) renders through a
//! [`Renderer`]. The default implementation is backed by Tera.

use std::error::Error as _;
use std::sync::Arc;

use serde_json::Value;
use tera::Tera;

use crate::error::{Error, Result};

pub trait Renderer: Send + Sync {
    /// Render the template registered as `template` with `model`.
    fn render(&self, template: &str, model: &Value) -> Result<String>;
}

pub type SharedRenderer = Arc<dyn Renderer>;

/// Tera-based runtime template renderer
///
/// Object models become the template context as is. Any other model is
/// exposed to the template under the `data` key.
pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    /// Load every template matching `glob` (e.g. `templates/**/*.html`).
    pub fn from_glob(glob: &str) -> Result<Self> {
        let tera = Tera::new(glob).map_err(render_error)?;
        tracing::debug!(
            glob = %glob,
            templates = tera.get_template_names().count(),
            "Loaded templates"
        );
        Ok(Self { tera })
    }

    /// Build from in-memory `(name, source)` pairs.
    pub fn from_raw<I, N, S>(templates: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, S)>,
        N: AsRef<str>,
        S: AsRef<str>,
    {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates).map_err(render_error)?;
        Ok(Self { tera })
    }

    pub fn into_shared(self) -> SharedRenderer {
        Arc::new(self)
    }
}

impl Renderer for TeraRenderer {
    fn render(&self, template: &str, model: &Value) -> Result<String> {
        let context = match model {
            Value::Object(_) => tera::Context::from_value(model.clone()).map_err(render_error)?,
            other => {
                let mut context = tera::Context::new();
                context.insert("data", other);
                context
            }
        };

        self.tera.render(template, &context).map_err(render_error)
    }
}

/// Tera reports the useful part (e.g. the missing variable) in the source chain.
fn render_error(err: tera::Error) -> Error {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    Error::Render(message)
}
