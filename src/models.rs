use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A single navigation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Link {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// The persisted links document, also the body of `GET /api/links`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub last_updated: String,
}

impl Document {
    /// An empty document stamped with `now`.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            links: Vec::new(),
            last_updated: timestamp(now),
        }
    }

    /// The sample document served before anything has been written.
    pub fn sample(now: DateTime<Utc>) -> Self {
        let link = |id: &str, title: &str, url: &str, category: &str, icon: &str| Link {
            id: id.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            category: Some(category.to_string()),
            icon: Some(icon.to_string()),
        };

        Self {
            links: vec![
                link("1", "Google", "https://google.com", "Search", "🔍"),
                link("2", "GitHub", "https://github.com", "Development", "💻"),
                link("3", "Baidu", "https://baidu.com", "Search", "🌐"),
            ],
            last_updated: timestamp(now),
        }
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix, e.g. `2024-05-01T12:00:00.000Z`
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Raw body of `POST /api/webhook`
///
/// Fields stay untyped here; [`crate::mutation::Action::from_request`] turns
/// them into a typed action or a specific validation error.
#[derive(Debug, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WebhookRequest {
    /// One of `add`, `update`, `delete`, `replace`
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub action: Option<JsonValue>,
    /// Link payload for `add`, `update` and `delete`
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub link: Option<JsonValue>,
    /// Full replacement list for `replace`
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub links: Option<JsonValue>,
}

/// Response type for successful webhook mutations
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub last_updated: String,
    /// The link as stored after `add` or `update`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}
