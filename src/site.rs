// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::error;

use crate::api::ApiClient;
use crate::http::HttpClient;
use crate::models::Podcast;
use crate::progress::{ListScope, ProgressEvent, SharedProgressReporter};

/// Cover images used when a podcast has none, picked by position
pub const PLACEHOLDER_IMAGES: [&str; 6] = [
    "https://via.placeholder.com/300x300/4F46E5/ffffff?text=Podcast+1",
    "https://via.placeholder.com/300x300/7C3AED/ffffff?text=Podcast+2",
    "https://via.placeholder.com/300x300/EC4899/ffffff?text=Podcast+3",
    "https://via.placeholder.com/300x300/F59E0B/ffffff?text=Podcast+4",
    "https://via.placeholder.com/300x300/10B981/ffffff?text=Podcast+5",
    "https://via.placeholder.com/300x300/3B82F6/ffffff?text=Podcast+6",
];

/// Shown while the backend has no active podcasts
pub const DEMO_PODCASTS: [&str; 6] = [
    "The Tim Ferriss Show",
    "TED Talks Daily",
    "How I Built This",
    "The Daily",
    "Planet Money",
    "Freakonomics Radio",
];

pub const DEFAULT_BLURB: &str = "优质英文播客，每周更新";

/// Which screen a URL fragment selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Admin,
}

impl Route {
    /// Resolve a full URL or just its fragment; only `#admin` opens the
    /// admin panel
    pub fn from_fragment(location: &str) -> Self {
        let fragment = location.rsplit_once('#').map(|(_, f)| f);
        match fragment {
            Some("admin") => Route::Admin,
            _ => Route::Home,
        }
    }
}

/// One tile of the podcast grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCard {
    /// None for demo cards
    pub id: Option<u64>,
    pub name: String,
    pub description: String,
    pub image_url: String,
}

/// The public podcast grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodcastGrid {
    pub podcasts: Vec<Podcast>,
}

impl PodcastGrid {
    /// Fetch the active podcasts. A failed fetch is logged and yields an
    /// empty grid, which renders the demo cards.
    pub async fn load<C: HttpClient>(
        api: &ApiClient<C>,
        reporter: &SharedProgressReporter,
    ) -> Self {
        reporter.report(ProgressEvent::LoadingPodcasts {
            scope: ListScope::Public,
        });

        match api.get_podcasts().await {
            Ok(podcasts) => {
                reporter.report(ProgressEvent::PodcastsLoaded {
                    scope: ListScope::Public,
                    count: podcasts.len(),
                });
                Self { podcasts }
            }
            Err(e) => {
                error!(error = %e, "failed to fetch podcasts");
                reporter.report(ProgressEvent::LoadFailed {
                    scope: ListScope::Public,
                    error: e.to_string(),
                });
                Self::default()
            }
        }
    }

    pub fn is_demo(&self) -> bool {
        self.podcasts.is_empty()
    }

    pub fn cards(&self) -> Vec<GridCard> {
        if self.is_demo() {
            return DEMO_PODCASTS
                .iter()
                .zip(PLACEHOLDER_IMAGES)
                .map(|(name, image)| GridCard {
                    id: None,
                    name: name.to_string(),
                    description: DEFAULT_BLURB.to_string(),
                    image_url: image.to_string(),
                })
                .collect();
        }

        self.podcasts
            .iter()
            .enumerate()
            .map(|(index, podcast)| GridCard {
                id: Some(podcast.id),
                name: podcast.name.clone(),
                description: podcast
                    .description
                    .clone()
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| DEFAULT_BLURB.to_string()),
                image_url: podcast
                    .cover_image_url
                    .clone()
                    .filter(|url| !url.is_empty())
                    .unwrap_or_else(|| {
                        PLACEHOLDER_IMAGES[index % PLACEHOLDER_IMAGES.len()].to_string()
                    }),
            })
            .collect()
    }

    /// HTML fragment for embedding the grid in a page
    pub fn render_html(&self) -> String {
        let mut html = String::from("<div class=\"podcast-grid\">\n");

        for card in self.cards() {
            // Writing to a String cannot fail
            let _ = write!(
                html,
                "  <div class=\"podcast-card\">\n    <img src=\"{}\" alt=\"{}\">\n    <h3>{}</h3>\n    <p>{}</p>\n  </div>\n",
                encode_double_quoted_attribute(&card.image_url),
                encode_double_quoted_attribute(&card.name),
                encode_text(&card.name),
                encode_text(&card.description),
            );
        }

        html.push_str("</div>\n");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::http::Method;
    use crate::mock::MockHttpClient;
    use crate::progress::NoopReporter;

    fn podcast(id: u64, name: &str, description: Option<&str>, cover: Option<&str>) -> Podcast {
        Podcast {
            id,
            name: name.to_string(),
            description: description.map(str::to_string),
            cover_image_url: cover.map(str::to_string),
        }
    }

    #[test]
    fn route_from_fragment() {
        assert_eq!(Route::from_fragment("#admin"), Route::Admin);
        assert_eq!(
            Route::from_fragment("https://digest.example.com/#admin"),
            Route::Admin
        );
        assert_eq!(Route::from_fragment("https://digest.example.com/"), Route::Home);
        assert_eq!(Route::from_fragment("#administrator"), Route::Home);
        assert_eq!(Route::from_fragment(""), Route::Home);
    }

    #[test]
    fn empty_grid_shows_demo_cards() {
        let cards = PodcastGrid::default().cards();
        assert_eq!(cards.len(), 6);
        assert_eq!(cards[0].name, "The Tim Ferriss Show");
        assert_eq!(cards[5].image_url, PLACEHOLDER_IMAGES[5]);
        assert!(cards.iter().all(|c| c.id.is_none()));
    }

    #[test]
    fn cards_fall_back_to_placeholders_by_position() {
        let grid = PodcastGrid {
            podcasts: (0..8)
                .map(|i| podcast(i, &format!("Show {i}"), None, None))
                .collect(),
        };

        let cards = grid.cards();
        assert_eq!(cards.len(), 8);
        assert_eq!(cards[6].image_url, PLACEHOLDER_IMAGES[0]);
        assert_eq!(cards[7].image_url, PLACEHOLDER_IMAGES[1]);
        assert_eq!(cards[0].description, DEFAULT_BLURB);
    }

    #[test]
    fn cards_prefer_podcast_data() {
        let grid = PodcastGrid {
            podcasts: vec![podcast(
                3,
                "The Daily",
                Some("News in 20 minutes"),
                Some("https://example.com/daily.jpg"),
            )],
        };

        let card = &grid.cards()[0];
        assert_eq!(card.id, Some(3));
        assert_eq!(card.description, "News in 20 minutes");
        assert_eq!(card.image_url, "https://example.com/daily.jpg");
    }

    #[test]
    fn render_html_escapes_content() {
        let grid = PodcastGrid {
            podcasts: vec![podcast(
                1,
                "Tom & Jerry <Live>",
                Some("\"quoted\""),
                Some("https://example.com/a.jpg?x=1&y=\"2\""),
            )],
        };

        let html = grid.render_html();
        assert!(html.contains("<h3>Tom &amp; Jerry &lt;Live&gt;</h3>"));
        assert!(!html.contains("<Live>"));
        assert!(html.contains("src=\"https://example.com/a.jpg?x=1&amp;y=&quot;2&quot;\""));
    }

    #[tokio::test]
    async fn load_failure_degrades_to_demo() {
        let mock = MockHttpClient::new();
        mock.respond(Method::Get, "/podcasts", 500, json!({ "detail": "boom" }));

        let grid = PodcastGrid::load(&mock.api(), &NoopReporter::shared()).await;
        assert!(grid.is_demo());
    }

    #[tokio::test]
    async fn load_uses_public_endpoint() {
        let mock = MockHttpClient::new();
        mock.respond(
            Method::Get,
            "/podcasts",
            200,
            json!([{ "id": 1, "name": "The Daily", "description": null, "cover_image_url": null }]),
        );

        let grid = PodcastGrid::load(&mock.api(), &NoopReporter::shared()).await;
        assert_eq!(grid.podcasts.len(), 1);
        assert_eq!(mock.count(Method::Get, "/admin/podcasts"), 0);
    }
}
