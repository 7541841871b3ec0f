//! Context adaptation middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::context::{ContextState, DEFAULT_BODY_LIMIT};
use crate::format::Format;
use crate::render::SharedRenderer;

/// Settings applied to every context created by [`new_context`].
#[derive(Clone)]
pub struct ContextSettings {
    pub renderer: Option<SharedRenderer>,
    /// Maximum number of body bytes buffered by `get_body` and binding.
    pub body_limit: usize,
    /// Pre-fill the format from `_format` / `Accept`.
    pub negotiate_format: bool,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            renderer: None,
            body_limit: DEFAULT_BODY_LIMIT,
            negotiate_format: false,
        }
    }
}

impl ContextSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_renderer(mut self, renderer: SharedRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    pub fn with_format_negotiation(mut self, enabled: bool) -> Self {
        self.negotiate_format = enabled;
        self
    }

    fn new_state(&self, req: &Request) -> ContextState {
        let mut state = ContextState::default();
        self.apply(&mut state, req);
        state
    }

    /// Fill in renderer, body limit and (when still unset) the format.
    /// Data bag and buffered body are left alone.
    fn apply(&self, state: &mut ContextState, req: &Request) {
        if state.renderer.is_none() {
            state.renderer = self.renderer.clone();
        }
        state.body_limit = self.body_limit;

        if self.negotiate_format && state.format.is_empty() {
            if let Some(format) = Format::negotiate(req.uri().query(), req.headers()) {
                state.format = format.as_str().to_string();
            }
        }

        state.configured = true;
    }
}

/// Ensure the request carries configured context state for the rest of
/// the chain.
///
/// Install with `axum::middleware::from_fn_with_state(settings, new_context)`.
/// State already configured by an outer `new_context` is kept untouched.
/// State created by an earlier `get_context` without settings is completed
/// with these settings, keeping its format, data bag and buffered body.
pub async fn new_context(
    State(settings): State<ContextSettings>,
    mut req: Request,
    next: Next,
) -> Response {
    let state = match req.extensions_mut().remove::<ContextState>() {
        Some(state) if state.configured => {
            tracing::trace!("Request context already installed");
            state
        }
        Some(mut state) => {
            settings.apply(&mut state, &req);
            tracing::trace!(format = %state.format, "Configured adapted request context");
            state
        }
        None => {
            let state = settings.new_state(&req);
            tracing::trace!(format = %state.format, "Installed request context");
            state
        }
    };
    req.extensions_mut().insert(state);

    next.run(req).await
}
