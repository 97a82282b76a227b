// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors that can occur when talking to the Podcast Digest API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}{}", detail_suffix(.detail))]
    Status {
        url: String,
        status: u16,
        /// The `detail` field of the error body, if the server sent one
        detail: Option<String>,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

/// How a failed call should be presented to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    /// HTTP 400, carrying the server-provided detail
    Validation(String),
    /// HTTP 429
    RateLimited,
    /// HTTP 500 and above
    ServiceUnavailable,
    /// Everything else, including requests that never got a response
    Network,
}

const DEFAULT_VALIDATION_DETAIL: &str = "Invalid request";

impl ApiError {
    /// HTTP status of the response, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify the error for user messaging
    pub fn class(&self) -> ErrorClass {
        match self {
            ApiError::Status {
                status: 400,
                detail,
                ..
            } => ErrorClass::Validation(
                detail
                    .clone()
                    .unwrap_or_else(|| DEFAULT_VALIDATION_DETAIL.to_string()),
            ),
            ApiError::Status { status: 429, .. } => ErrorClass::RateLimited,
            ApiError::Status { status, .. } if *status >= 500 => ErrorClass::ServiceUnavailable,
            _ => ErrorClass::Network,
        }
    }
}

/// Errors raised while building the client configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid API base URL '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("API base URL '{0}' cannot carry endpoint paths")]
    CannotBeBase(String),
}
