use std::{
    error::Error,
    fmt::{self, Display},
};

use actix_web::HttpResponse;
use log::error;
use serde_json::json;

#[derive(Debug)]
pub enum ServiceError {
    // Caller supplied a missing or invalid field.
    BadRequest(String),
    // External API answered with a non-2xx status; the status is forwarded
    // to the caller. Only the market-data route uses this.
    Upstream(u16, String),
    // External API answered with a non-2xx status, but the caller only gets
    // a generic 500; the detail stays in the logs.
    UpstreamInternal(u16, String),
    // The analysis process exited non-zero or produced unusable output.
    Process(String),
    Http(reqwest::Error),
    Json(serde_json::Error),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::BadRequest(msg) => write!(f, "bad request: {}", msg),
            ServiceError::Upstream(status, msg) => {
                write!(f, "upstream returned {}: {}", status, msg)
            }
            ServiceError::UpstreamInternal(status, msg) => {
                write!(f, "upstream returned {}: {}", status, msg)
            }
            ServiceError::Process(msg) => write!(f, "analysis process failed: {}", msg),
            ServiceError::Http(e) => write!(f, "http error: {}", e),
            ServiceError::Json(e) => write!(f, "json error: {}", e),
        }
    }
}

impl Error for ServiceError {}

impl From<reqwest::Error> for ServiceError {
    fn from(error: reqwest::Error) -> Self {
        ServiceError::Http(error)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(error: serde_json::Error) -> Self {
        ServiceError::Json(error)
    }
}

impl ServiceError {
    /// Map onto an HTTP response. Upstream detail is logged, not returned,
    /// except the explicit Upstream variant which forwards its status code.
    pub fn to_response(&self) -> HttpResponse {
        match self {
            ServiceError::BadRequest(msg) => {
                HttpResponse::BadRequest().json(json!({ "error": msg }))
            }
            ServiceError::Upstream(status, msg) => {
                error!("Upstream failure ({}): {}", status, msg);
                let code = actix_web::http::StatusCode::from_u16(*status)
                    .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
                HttpResponse::build(code).json(json!({ "error": "Upstream request failed" }))
            }
            other => {
                error!("Internal service failure: {}", other);
                HttpResponse::InternalServerError()
                    .json(json!({ "error": "Internal server error" }))
            }
        }
    }
}
