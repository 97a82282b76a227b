// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{error, info};

use crate::api::ApiClient;
use crate::error::{ApiError, ErrorClass};
use crate::http::HttpClient;
use crate::models::SubscribeRequest;
use crate::progress::{ProgressEvent, SharedProgressReporter};

pub const DEFAULT_UTM_SOURCE: &str = "website";
pub const DEFAULT_UTM_MEDIUM: &str = "organic";

pub const EMAIL_REQUIRED_MESSAGE: &str = "Please enter your email address.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Subscription failed. Please try again.";
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again in a few minutes.";
pub const UNAVAILABLE_MESSAGE: &str =
    "Newsletter service is temporarily unavailable. Please try again later.";
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection and try again.";

/// Where the form is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeStatus {
    Idle,
    Loading,
    Success(String),
    /// Stays until the next submission
    Error(String),
}

/// Text shown to the user for a failed subscribe call
pub fn failure_message(error: &ApiError) -> String {
    match error.class() {
        ErrorClass::Validation(detail) => detail,
        ErrorClass::RateLimited => RATE_LIMITED_MESSAGE.to_string(),
        ErrorClass::ServiceUnavailable => UNAVAILABLE_MESSAGE.to_string(),
        ErrorClass::Network => NETWORK_ERROR_MESSAGE.to_string(),
    }
}

#[derive(Debug, Clone)]
struct FormFields {
    email: String,
    name: String,
    status: SubscribeStatus,
}

/// Newsletter subscribe form
pub struct SubscribeForm<C> {
    api: ApiClient<C>,
    reporter: SharedProgressReporter,
    utm_source: String,
    utm_medium: String,
    fields: Mutex<FormFields>,
}

impl<C: HttpClient> SubscribeForm<C> {
    pub fn new(api: ApiClient<C>, reporter: SharedProgressReporter) -> Self {
        Self {
            api,
            reporter,
            utm_source: DEFAULT_UTM_SOURCE.to_string(),
            utm_medium: DEFAULT_UTM_MEDIUM.to_string(),
            fields: Mutex::new(FormFields {
                email: String::new(),
                name: String::new(),
                status: SubscribeStatus::Idle,
            }),
        }
    }

    /// Attribute subscriptions to a different campaign
    pub fn with_utm(mut self, source: impl Into<String>, medium: impl Into<String>) -> Self {
        self.utm_source = source.into();
        self.utm_medium = medium.into();
        self
    }

    fn lock(&self) -> MutexGuard<'_, FormFields> {
        self.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_email(&self, email: impl Into<String>) {
        self.lock().email = email.into();
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.lock().name = name.into();
    }

    pub fn email(&self) -> String {
        self.lock().email.clone()
    }

    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    pub fn status(&self) -> SubscribeStatus {
        self.lock().status.clone()
    }

    /// The request the current fields would produce
    pub fn request(&self) -> SubscribeRequest {
        let fields = self.lock();
        let name = fields.name.trim();

        SubscribeRequest {
            email: fields.email.trim().to_string(),
            name: (!name.is_empty()).then(|| name.to_string()),
            utm_source: Some(self.utm_source.clone()),
            utm_medium: Some(self.utm_medium.clone()),
        }
    }

    /// Send the subscription and move to `Success` or `Error`.
    ///
    /// Ignored while a previous submission is still loading, and nothing is
    /// sent while the email is blank. On success the fields are cleared; on
    /// any failure they are kept.
    pub async fn submit(&self) -> SubscribeStatus {
        let request = {
            let mut fields = self.lock();
            if fields.status == SubscribeStatus::Loading {
                return SubscribeStatus::Loading;
            }
            if fields.email.trim().is_empty() {
                let status = SubscribeStatus::Error(EMAIL_REQUIRED_MESSAGE.to_string());
                fields.status = status.clone();
                return status;
            }
            fields.status = SubscribeStatus::Loading;
            drop(fields);
            self.request()
        };

        self.reporter.report(ProgressEvent::Subscribing {
            email: request.email.clone(),
        });

        let status = match self.api.subscribe_to_newsletter(&request).await {
            Ok(response) if response.success => {
                info!(subscriber_id = ?response.subscriber_id, "subscribed to newsletter");
                SubscribeStatus::Success(response.message)
            }
            Ok(response) => {
                error!(message = %response.message, "newsletter subscription was not accepted");
                SubscribeStatus::Error(GENERIC_FAILURE_MESSAGE.to_string())
            }
            Err(e) => {
                error!(error = %e, "newsletter subscription failed");
                SubscribeStatus::Error(failure_message(&e))
            }
        };

        let mut fields = self.lock();
        if matches!(status, SubscribeStatus::Success(_)) {
            fields.email.clear();
            fields.name.clear();
        }
        fields.status = status.clone();
        status
    }
}
