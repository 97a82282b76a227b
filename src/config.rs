// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use url::Url;

use crate::error::{ApiError, ConfigError};

/// Environment variable holding the API base URL
pub const API_URL_ENV: &str = "PODDIGEST_API_URL";

/// Base URL used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Where the API lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
}

impl ApiConfig {
    /// Parse a base URL such as `https://digest.example.com/api`
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let mut url = Url::parse(base_url.trim()).map_err(|e| ConfigError::InvalidBaseUrl {
            value: base_url.to_string(),
            source: e,
        })?;

        if url.cannot_be_a_base() {
            return Err(ConfigError::CannotBeBase(base_url.to_string()));
        }

        // Url::join replaces the last segment unless the path ends in '/'
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self { base_url: url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path (e.g. `admin/podcasts/3`) against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:8000/api/").expect("valid default URL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_server() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url().as_str(), "http://localhost:8000/api/");
        assert_eq!(config, ApiConfig::new(DEFAULT_API_URL).unwrap());
    }

    #[test]
    fn endpoint_keeps_base_path_without_trailing_slash() {
        let config = ApiConfig::new("https://digest.example.com/api").unwrap();
        assert_eq!(
            config.endpoint("podcasts").unwrap().as_str(),
            "https://digest.example.com/api/podcasts"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_with_trailing_slash() {
        let config = ApiConfig::new("https://digest.example.com/api/").unwrap();
        assert_eq!(
            config.endpoint("/admin/podcasts/7").unwrap().as_str(),
            "https://digest.example.com/api/admin/podcasts/7"
        );
    }

    #[test]
    fn endpoint_on_bare_host() {
        let config = ApiConfig::new("http://127.0.0.1:9000").unwrap();
        assert_eq!(
            config.endpoint("newsletter/subscribe").unwrap().as_str(),
            "http://127.0.0.1:9000/newsletter/subscribe"
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            ApiConfig::new("not a url"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            ApiConfig::new("mailto:admin@example.com"),
            Err(ConfigError::CannotBeBase(_))
        ));
    }
}
