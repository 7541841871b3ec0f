//! Shared application state

use anyhow::Context as _;
use std::sync::Arc;
use strata_context::{ContextSettings, TeraRenderer};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Settings handed to the context middleware for every request.
    pub context: ContextSettings,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let mut context = ContextSettings::new()
            .with_body_limit(config.server.max_request_body_size)
            .with_format_negotiation(config.context.negotiate_format);

        if config.templates.enabled {
            let renderer = TeraRenderer::from_glob(&config.templates.glob)
                .with_context(|| format!("Failed to load templates from {}", config.templates.glob))?;
            context = context.with_renderer(renderer.into_shared());
        } else {
            tracing::warn!("Templates disabled; HTML pages will fail to render");
        }

        Ok(Self {
            config: Arc::new(config),
            context,
        })
    }
}
