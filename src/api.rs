// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::http::{HttpClient, HttpRequest, HttpResponse, Method};
use crate::models::{
    NewPodcast, NewsletterHealth, Podcast, PodcastFull, PodcastUpdate, SubscribeRequest,
    SubscribeResponse, is_web_url,
};

/// Element of the public list as it comes off the wire.
///
/// The public endpoint does not normally send `is_active`, but if it does,
/// an inactive entry must never reach the grid.
#[derive(Deserialize)]
struct PublicPodcastWire {
    #[serde(flatten)]
    podcast: Podcast,
    #[serde(default)]
    is_active: Option<bool>,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Value,
}

#[derive(Serialize)]
struct FromRssBody<'a> {
    rss_url: &'a str,
}

/// Typed client for the Podcast Digest REST API
///
/// Every call is a single round trip: no retries, no caching.
#[derive(Clone)]
pub struct ApiClient<C> {
    http: C,
    config: ApiConfig,
}

impl<C: HttpClient> ApiClient<C> {
    pub fn new(http: C, config: ApiConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `GET /podcasts`: active podcasts for the public site
    pub async fn get_podcasts(&self) -> Result<Vec<Podcast>, ApiError> {
        let wire: Vec<PublicPodcastWire> = self.get_json("podcasts").await?;

        Ok(wire
            .into_iter()
            .filter_map(|entry| {
                if entry.is_active == Some(false) {
                    warn!(
                        id = entry.podcast.id,
                        name = %entry.podcast.name,
                        "public list contained an inactive podcast, dropping it"
                    );
                    None
                } else {
                    Some(entry.podcast)
                }
            })
            .collect())
    }

    /// `GET /admin/podcasts`: every podcast, active or not
    pub async fn get_all_podcasts(&self) -> Result<Vec<PodcastFull>, ApiError> {
        self.get_json("admin/podcasts").await
    }

    /// `POST /admin/podcasts`
    ///
    /// The input is trimmed and checked locally first; nothing is sent if
    /// the name is empty or the RSS URL is not a valid URL.
    pub async fn create_podcast(&self, podcast: &NewPodcast) -> Result<PodcastFull, ApiError> {
        let podcast = podcast.trimmed();
        podcast.validate().map_err(ApiError::InvalidInput)?;

        self.send_json(Method::Post, "admin/podcasts", &podcast.body())
            .await
    }

    /// `POST /admin/podcasts/from-rss`: let the backend read name,
    /// description and cover from the feed itself
    pub async fn create_podcast_from_rss(&self, rss_url: &str) -> Result<PodcastFull, ApiError> {
        let rss_url = rss_url.trim();
        if !is_web_url(rss_url) {
            return Err(ApiError::InvalidInput(format!(
                "'{rss_url}' is not a valid RSS feed URL"
            )));
        }

        self.send_json(Method::Post, "admin/podcasts/from-rss", &FromRssBody { rss_url })
            .await
    }

    /// `PUT /admin/podcasts/{id}`: only the fields set in `update` change
    pub async fn update_podcast(
        &self,
        id: u64,
        update: &PodcastUpdate,
    ) -> Result<PodcastFull, ApiError> {
        self.send_json(Method::Put, &format!("admin/podcasts/{id}"), update)
            .await
    }

    /// `DELETE /admin/podcasts/{id}`; the response body is ignored
    pub async fn delete_podcast(&self, id: u64) -> Result<(), ApiError> {
        self.call(Method::Delete, &format!("admin/podcasts/{id}"), None)
            .await?;
        Ok(())
    }

    /// `POST /newsletter/subscribe`
    pub async fn subscribe_to_newsletter(
        &self,
        request: &SubscribeRequest,
    ) -> Result<SubscribeResponse, ApiError> {
        self.send_json(Method::Post, "newsletter/subscribe", request)
            .await
    }

    /// `GET /newsletter/health`
    pub async fn newsletter_health(&self) -> Result<NewsletterHealth, ApiError> {
        self.get_json("newsletter/health").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (url, response) = self.call(Method::Get, path, None).await?;
        decode(&url, &response.body)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = Bytes::from(serde_json::to_vec(body)?);
        let (url, response) = self.call(method, path, Some(body)).await?;
        decode(&url, &response.body)
    }

    /// Issue one request and turn non-2xx statuses into errors
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<(String, HttpResponse), ApiError> {
        let url = self.config.endpoint(path)?;
        let url_str = url.to_string();

        debug!(method = method.as_str(), url = %url_str, "sending request");

        let response = self
            .http
            .send(HttpRequest { method, url, body })
            .await
            .map_err(|e| ApiError::Request {
                url: url_str.clone(),
                source: e,
            })?;

        debug!(status = response.status, url = %url_str, "received response");

        if !response.is_success() {
            return Err(ApiError::Status {
                url: url_str,
                status: response.status,
                detail: error_detail(&response.body),
            });
        }

        Ok((url_str, response))
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        source: e,
    })
}

/// Pull the human-readable message out of an error body.
///
/// Handles `{"detail": "..."}` and the list form used for request
/// validation errors (`{"detail": [{"msg": "..."}]}`).
fn error_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail {
        Value::String(detail) => Some(detail),
        Value::Array(items) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
