// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};
use url::Url;

/// A podcast as shown on the public site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Podcast {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
}

/// A podcast as seen by the admin panel, including feed URL and active flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodcastFull {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    /// Stored as given; the backend owns feed URL validation
    pub rss_url: String,
    pub cover_image_url: Option<String>,
    pub is_active: bool,
}

impl From<PodcastFull> for Podcast {
    fn from(full: PodcastFull) -> Self {
        Self {
            id: full.id,
            name: full.name,
            description: full.description,
            cover_image_url: full.cover_image_url,
        }
    }
}

/// Input for creating a podcast, exactly as typed into the admin form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPodcast {
    pub name: String,
    pub description: String,
    pub rss_url: String,
    pub cover_image_url: String,
}

/// Request body for `POST /admin/podcasts`
#[derive(Debug, Serialize)]
pub(crate) struct NewPodcastBody<'a> {
    name: &'a str,
    description: Option<&'a str>,
    rss_url: &'a str,
    cover_image_url: Option<&'a str>,
}

impl NewPodcast {
    /// Copy with surrounding whitespace removed from every field
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            rss_url: self.rss_url.trim().to_string(),
            cover_image_url: self.cover_image_url.trim().to_string(),
        }
    }

    /// Check the constraints the admin form enforces before submitting.
    ///
    /// Expects already trimmed input.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Name is required".to_string());
        }
        if self.rss_url.is_empty() {
            return Err("RSS feed URL is required".to_string());
        }
        if !is_web_url(&self.rss_url) {
            return Err(format!("'{}' is not a valid RSS feed URL", self.rss_url));
        }
        if !self.cover_image_url.is_empty() && !is_web_url(&self.cover_image_url) {
            return Err(format!(
                "'{}' is not a valid cover image URL",
                self.cover_image_url
            ));
        }
        Ok(())
    }

    /// Empty optional fields are sent as `null`
    pub(crate) fn body(&self) -> NewPodcastBody<'_> {
        NewPodcastBody {
            name: &self.name,
            description: non_empty(&self.description),
            rss_url: &self.rss_url,
            cover_image_url: non_empty(&self.cover_image_url),
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

/// Partial update for `PUT /admin/podcasts/{id}`; unset fields are left out
/// of the request body entirely
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PodcastUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rss_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl PodcastUpdate {
    /// An update that only sets the active flag
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Whether a string is an absolute http(s) URL with a host
pub fn is_web_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
