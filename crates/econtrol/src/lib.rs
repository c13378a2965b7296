use std::error;
use std::fmt;

pub mod client;
pub mod model;
pub mod parser;

/// Base URL of the public E-Control fuel price API.
pub const ECONTROL_API_URL: &str = "https://api.e-control.at/sprit/1.0";

#[derive(Debug)]
pub enum ApiError {
    /// The HTTP call itself failed (connect error, timeout, ...).
    Request(reqwest::Error),
    /// A response body did not decode as the expected shape.
    Json(serde_json::Error),
    /// The API answered non-2xx with its structured error body.
    Upstream {
        status_code: reqwest::StatusCode,
        code: i32,
        name: String,
        message: String,
    },
}

impl error::Error for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::Request(why) => write!(f, "HTTP request error: {}", why),
            ApiError::Json(why) => write!(f, "JSON parse error: {}", why),
            ApiError::Upstream {
                status_code,
                code,
                name,
                message,
            } => write!(
                f,
                "API call failed ({status_code}) [{code} {name}]: {message}"
            ),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(why: reqwest::Error) -> Self {
        ApiError::Request(why)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(why: serde_json::Error) -> Self {
        ApiError::Json(why)
    }
}
