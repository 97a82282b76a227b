// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod admin;
pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod progress;
pub mod site;
pub mod subscribe;

#[cfg(test)]
mod mock;

// Re-export main types for convenience
pub use admin::{AdminPanel, AdminState, FormState, Phase, SubmitOutcome, ToggleOutcome};
pub use api::ApiClient;
pub use config::{API_URL_ENV, ApiConfig, DEFAULT_API_URL};
pub use error::{ApiError, ConfigError, ErrorClass};
pub use http::{HttpClient, HttpRequest, HttpResponse, Method, ReqwestClient};
pub use models::{
    NewPodcast, NewsletterHealth, Podcast, PodcastFull, PodcastUpdate, SubscribeRequest,
    SubscribeResponse,
};
pub use progress::{ListScope, NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use site::{GridCard, PodcastGrid, Route};
pub use subscribe::{SubscribeForm, SubscribeStatus};
