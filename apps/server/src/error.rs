use std::io::Error as IoError;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use warmwatch_service::registry::RegistryError;

/// Startup failures of the server binary
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Configuration error: {0}")]
    Config(#[from] warmwatch_service::config::Error),
    #[error("Store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

/// Error returned by the endpoint handlers
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub RegistryError);

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(ErrorBody { message: self.0.message(), error: self.0.to_string() })
    }
}
