//! Error types for the request context

use std::fmt;
use std::panic::Location;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;

use crate::context::Context;
use crate::envelope::Output;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Bind error: {0}")]
    Bind(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Failed to read request body: {0}")]
    Body(#[source] axum::Error),

    #[error("No template renderer configured")]
    RendererNotConfigured,

    #[error("Render error: {0}")]
    Render(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Bind(_) | Error::Body(_) => StatusCode::BAD_REQUEST,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::RendererNotConfigured | Error::Render(_) | Error::Serialize(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the message is safe to send to clients.
    fn is_internal(&self) -> bool {
        self.status().is_server_error()
    }

    fn public_message(&self) -> String {
        if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            Error::Validation(errors) => serde_json::to_value(errors).ok(),
            _ => None,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_internal() {
            tracing::error!("Internal error: {}", self);
        }

        let body = Output::failure(
            i32::from(status.as_u16()),
            self.public_message(),
            self.details(),
        );
        (status, Json(body)).into_response()
    }
}

/// Structured application error submitted through [`Context::ret_error`].
///
/// Carries an application code, the HTTP status it is emitted with and one
/// frame of call-site context.
#[derive(Debug, Clone)]
pub struct AppError {
    code: i32,
    status: StatusCode,
    message: String,
    data: Option<Value>,
    detail: Option<String>,
    location: Option<&'static Location<'static>>,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: i32::from(status.as_u16()),
            status,
            message: message.into(),
            data: None,
            detail: None,
            location: None,
        }
    }

    /// Override the application code.
    ///
    /// A code that is also a 4xx/5xx HTTP status becomes the response status.
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = code;
        if let Some(status) = u16::try_from(code)
            .ok()
            .and_then(|c| StatusCode::from_u16(c).ok())
            .filter(|s| s.is_client_error() || s.is_server_error())
        {
            self.status = status;
        }
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Record `location` unless a frame was already captured.
    pub fn at(mut self, location: &'static Location<'static>) -> Self {
        self.location.get_or_insert(location);
        self
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn location(&self) -> Option<&'static Location<'static>> {
        self.location
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(location) = self.location {
            write!(f, " (at {location})")?;
        }
        Ok(())
    }
}

impl From<&str> for AppError {
    fn from(message: &str) -> Self {
        AppError::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<String> for AppError {
    fn from(message: String) -> Self {
        AppError::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let mut app = AppError::new(err.status(), err.public_message());
        app.data = err.details();
        if err.is_internal() {
            app.detail = Some(err.to_string());
        }
        app
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        let mut app = AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        app.detail = Some(format!("{err:#}"));
        app
    }
}

/// Shared error emitter: logs the error and writes the error envelope.
pub(crate) fn catch_error(err: AppError, ctx: &Context) -> Result<Response> {
    let location = err
        .location
        .map(|l| l.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if err.status.is_server_error() {
        tracing::error!(
            code = err.code,
            status = err.status.as_u16(),
            method = %ctx.request().method(),
            path = %ctx.request().uri().path(),
            location = %location,
            detail = err.detail.as_deref().unwrap_or(""),
            "{}",
            err.message
        );
    } else {
        tracing::warn!(
            code = err.code,
            status = err.status.as_u16(),
            method = %ctx.request().method(),
            path = %ctx.request().uri().path(),
            location = %location,
            "{}",
            err.message
        );
    }

    let body = Output::failure(err.code, err.message, err.data);
    ctx.write_output(err.status, &body)
}
