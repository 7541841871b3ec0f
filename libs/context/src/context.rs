//! The per-request context
//!
//! A [`Context`] owns the inbound request together with its
//! [`ContextState`]: the response format tag, the data bag and the buffered
//! body. Between middleware and handler the state lives in the request
//! extensions, which is what makes adaptation idempotent.

use std::convert::Infallible;
use std::panic::Location;

use axum::{
    async_trait,
    body::{Body, Bytes},
    extract::{FromRequest, Request},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use crate::bind;
use crate::envelope::{is_valid_callback, to_jsonp, Output};
use crate::error::{self, AppError, Error, Result};
use crate::format::{Format, FORMAT_JSONP};
use crate::payload::{DataBag, Payload};
use crate::render::SharedRenderer;

/// Default cap on buffered request bodies (2 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Header used by JavaScript clients to mark XHR requests.
pub const REQUESTED_WITH_HEADER: &str = "x-requested-with";

/// Query parameter naming the JSONP callback.
pub const CALLBACK_PARAM: &str = "callback";

/// Typed per-request storage.
#[derive(Clone)]
pub(crate) struct ContextState {
    pub(crate) format: String,
    pub(crate) data: Option<DataBag>,
    pub(crate) raw_body: Option<Bytes>,
    pub(crate) renderer: Option<SharedRenderer>,
    pub(crate) body_limit: usize,
    /// Set once `ContextSettings` have been applied by `new_context`.
    pub(crate) configured: bool,
}

impl Default for ContextState {
    fn default() -> Self {
        Self {
            format: String::new(),
            data: None,
            raw_body: None,
            renderer: None,
            body_limit: DEFAULT_BODY_LIMIT,
            configured: false,
        }
    }
}

pub struct Context {
    request: Request,
    state: ContextState,
}

impl Context {
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// Unwrap the request, keeping the context state in its extensions so a
    /// later adaptation picks it up again.
    pub fn into_request(self) -> Request {
        let mut request = self.request;
        request.extensions_mut().insert(self.state);
        request
    }

    pub fn renderer(&self) -> Option<&SharedRenderer> {
        self.state.renderer.as_ref()
    }

    // ------------------------------------------------------------------
    // Binding
    // ------------------------------------------------------------------

    /// Deserialize the request payload into `T`.
    ///
    /// The body is buffered first, so it stays readable afterwards.
    pub async fn bind<T: DeserializeOwned>(&mut self) -> Result<T> {
        let body = self.buffer_body().await?;
        bind::bind_bytes(self.request.headers(), self.request.uri().query(), &body).map_err(
            |e| {
                tracing::debug!(error = %e, "Failed to bind request payload");
                e
            },
        )
    }

    /// Bind, then validate. A failed bind never reaches the validator.
    pub async fn bind_validate<T>(&mut self) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        let value: T = self.bind().await?;
        value.validate()?;
        Ok(value)
    }

    // ------------------------------------------------------------------
    // Format
    // ------------------------------------------------------------------

    pub fn get_format(&self) -> &str {
        &self.state.format
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        self.state.format = format.into();
    }

    /// Fill in the format from `_format` / `Accept` when none was set yet.
    pub fn negotiate_format(&mut self) -> &str {
        if self.state.format.is_empty() {
            if let Some(format) = Format::negotiate(self.request.uri().query(), self.request.headers())
            {
                self.state.format = format.as_str().to_string();
            }
        }
        &self.state.format
    }

    /// `true` only for an exact `X-Requested-With: XMLHttpRequest`.
    pub fn is_ajax(&self) -> bool {
        self.request
            .headers()
            .get(REQUESTED_WITH_HEADER)
            .map(|v| v.as_bytes() == b"XMLHttpRequest")
            .unwrap_or(false)
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.request.uri().query()?;
        serde_urlencoded::from_str::<Vec<(String, String)>>(query)
            .ok()?
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    // ------------------------------------------------------------------
    // Body
    // ------------------------------------------------------------------

    /// Read the whole body as text and put the same bytes back on the request.
    pub async fn get_body(&mut self) -> Result<String> {
        let body = self.buffer_body().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Bytes captured by the last [`get_body`](Self::get_body) or bind.
    pub fn raw_body(&self) -> Option<&Bytes> {
        self.state.raw_body.as_ref()
    }

    async fn buffer_body(&mut self) -> Result<Bytes> {
        let body = std::mem::take(self.request.body_mut());
        let bytes = axum::body::to_bytes(body, self.state.body_limit)
            .await
            .map_err(Error::Body)?;

        *self.request.body_mut() = Body::from(bytes.clone());
        self.state.raw_body = Some(bytes.clone());

        tracing::debug!(bytes = bytes.len(), "Buffered request body");
        Ok(bytes)
    }

    // ------------------------------------------------------------------
    // Data bag
    // ------------------------------------------------------------------

    /// The request's data bag, created on first use.
    pub fn data(&mut self) -> &mut DataBag {
        self.state.data.get_or_insert_with(DataBag::new)
    }

    pub fn set_data(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.data().insert(name.into(), value.into());
    }

    fn resolve(&mut self, payload: Payload) -> Value {
        match payload {
            Payload::Replace(value) => value,
            Payload::Merge(entries) => {
                for (name, value) in entries {
                    self.set_data(name, value);
                }
                Value::Object(self.data().clone())
            }
            Payload::Empty => Value::Object(self.data().clone()),
        }
    }

    // ------------------------------------------------------------------
    // Responses
    // ------------------------------------------------------------------

    /// Render `template` as a `200 OK` HTML page.
    pub fn display(&mut self, template: &str, payload: Payload) -> Result<Response> {
        let model = self.resolve(payload);
        let renderer = self
            .state
            .renderer
            .clone()
            .ok_or(Error::RendererNotConfigured)?;

        let html = renderer.render(template, &model)?;
        Ok((StatusCode::OK, Html(html)).into_response())
    }

    /// Emit a `200 OK` [`Output`] envelope.
    pub fn ret_data(&mut self, payload: Payload) -> Result<Response> {
        let data = self.resolve(payload);
        self.write_output(StatusCode::OK, &Output::success(data))
    }

    /// Emit an error envelope for `err`, tagged with the caller's location.
    #[track_caller]
    pub fn ret_error(&self, err: impl Into<AppError>, code: Option<i32>) -> Result<Response> {
        let location = Location::caller();
        let mut err = err.into().at(location);
        if let Some(code) = code {
            err = err.with_code(code);
        }
        error::catch_error(err, self)
    }

    /// Serialize `output` with `status`, as JSONP when the request asks for it.
    pub(crate) fn write_output(&self, status: StatusCode, output: &Output) -> Result<Response> {
        if self.get_format() == FORMAT_JSONP {
            if let Some(callback) = self
                .query_param(CALLBACK_PARAM)
                .filter(|c| is_valid_callback(c))
            {
                let script = to_jsonp(&callback, output)?;
                return Ok((
                    status,
                    [(header::CONTENT_TYPE, Format::Jsonp.mime_type())],
                    script,
                )
                    .into_response());
            }
        }

        Ok((status, Json(output)).into_response())
    }
}

/// Values that can be adapted into a [`Context`].
pub trait IntoContext {
    fn into_context(self) -> Context;
}

impl IntoContext for Request {
    fn into_context(mut self) -> Context {
        let state = match self.extensions_mut().remove::<ContextState>() {
            Some(state) => state,
            None => {
                tracing::trace!("No context state on request, using defaults");
                ContextState::default()
            }
        };
        Context {
            request: self,
            state,
        }
    }
}

impl IntoContext for Context {
    fn into_context(self) -> Context {
        self
    }
}

/// Adapt a request into a [`Context`]. Already adapted values pass through.
pub fn get_context(value: impl IntoContext) -> Context {
    value.into_context()
}

#[async_trait]
impl<S> FromRequest<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        Ok(get_context(req))
    }
}
