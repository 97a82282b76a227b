// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /newsletter/subscribe`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribeRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
}

impl SubscribeRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
            utm_source: None,
            utm_medium: None,
        }
    }
}

/// Result of a subscribe call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub subscriber_id: Option<String>,
}

/// Newsletter service status from `GET /newsletter/health`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewsletterHealth {
    pub status: String,
    pub beehiiv_configured: bool,
    pub service: String,
}

// The backend sends `null` or `""` when it has no subscriber id
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn request_omits_unset_fields() {
        let body = serde_json::to_value(SubscribeRequest::new("a@b.com")).unwrap();
        assert_eq!(body, json!({ "email": "a@b.com" }));
    }

    #[test]
    fn response_with_subscriber_id() {
        let response: SubscribeResponse = serde_json::from_value(json!({
            "success": true,
            "message": "Successfully subscribed to newsletter!",
            "subscriber_id": "sub_00000000"
        }))
        .unwrap();

        assert!(response.success);
        assert_eq!(response.subscriber_id.as_deref(), Some("sub_00000000"));
    }

    #[test]
    fn response_normalizes_missing_null_and_empty_ids() {
        for body in [
            json!({ "success": true, "message": "ok" }),
            json!({ "success": true, "message": "ok", "subscriber_id": null }),
            json!({ "success": true, "message": "ok", "subscriber_id": "" }),
        ] {
            let response: SubscribeResponse = serde_json::from_value(body).unwrap();
            assert_eq!(response.subscriber_id, None);
        }
    }

    #[test]
    fn response_requires_success_flag() {
        let result: Result<SubscribeResponse, _> =
            serde_json::from_value(json!({ "message": "ok" }));
        assert!(result.is_err());
    }

    #[test]
    fn health_decodes() {
        let health: NewsletterHealth = serde_json::from_value(json!({
            "status": "healthy",
            "beehiiv_configured": false,
            "service": "newsletter"
        }))
        .unwrap();

        assert_eq!(health.status, "healthy");
        assert!(!health.beehiiv_configured);
    }
}
