//! Webhook actions and the pure function that applies them to a [`Document`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Document, Link, WebhookRequest, timestamp};

/// Rejections of a webhook payload; every variant is reported as 400
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("Missing action parameter")]
    MissingAction,
    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),
    #[error("Missing required link fields (title, url)")]
    MissingFields,
    #[error("Missing link id")]
    MissingLinkId,
    #[error("Link not found: {0}")]
    LinkNotFound(String),
    #[error("Link id already exists: {0}")]
    DuplicateLinkId(String),
    #[error("Invalid link: {0}")]
    InvalidLink(String),
    #[error("Invalid links array")]
    InvalidLinksArray,
}

/// Link fields as sent by a webhook caller; anything may be left out.
///
/// `category` and `icon` tell an explicit `null` (`Some(None)`, clear the
/// field) apart from an absent key (`None`, keep it).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LinkPatch {
    pub id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub icon: Option<Option<String>>,
}

/// Wraps whatever the key held, `null` included, so only a missing key stays `None`
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl LinkPatch {
    /// Overwrite the fields of `link` that this patch carries. The id is never touched.
    pub fn merge_into(self, link: &mut Link) {
        if let Some(title) = self.title {
            link.title = title;
        }
        if let Some(url) = self.url {
            link.url = url;
        }
        if let Some(category) = self.category {
            link.category = category;
        }
        if let Some(icon) = self.icon {
            link.icon = icon;
        }
    }
}

/// A validated link for `add`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub id: Option<String>,
    pub title: String,
    pub url: String,
    pub category: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add(NewLink),
    Update { id: String, changes: LinkPatch },
    Delete { id: String },
    Replace { links: Vec<Link> },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Add(_) => "add",
            Action::Update { .. } => "update",
            Action::Delete { .. } => "delete",
            Action::Replace { .. } => "replace",
        }
    }

    /// Decode and validate a raw webhook body.
    ///
    /// Checks that need the current document (existence, duplicates) happen
    /// later in [`apply`].
    pub fn from_request(request: WebhookRequest) -> Result<Self, MutationError> {
        let action = match request.action {
            Some(JsonValue::String(action)) if !action.is_empty() => action,
            _ => return Err(MutationError::MissingAction),
        };

        match action.as_str() {
            "add" => {
                let patch = decode_patch(request.link)?.ok_or(MutationError::MissingFields)?;
                match (non_empty(patch.title), non_empty(patch.url)) {
                    (Some(title), Some(url)) => Ok(Action::Add(NewLink {
                        id: non_empty(patch.id),
                        title,
                        url,
                        category: patch.category.flatten(),
                        icon: patch.icon.flatten(),
                    })),
                    _ => Err(MutationError::MissingFields),
                }
            }
            "update" => {
                let mut changes =
                    decode_patch(request.link)?.ok_or(MutationError::MissingLinkId)?;
                let id = non_empty(changes.id.take()).ok_or(MutationError::MissingLinkId)?;
                // title and url may be left out, but never blanked
                if changes.title.as_deref() == Some("") || changes.url.as_deref() == Some("") {
                    return Err(MutationError::InvalidLink(
                        "title and url must not be empty".to_string(),
                    ));
                }
                Ok(Action::Update { id, changes })
            }
            "delete" => {
                let patch = decode_patch(request.link)?.ok_or(MutationError::MissingLinkId)?;
                let id = non_empty(patch.id).ok_or(MutationError::MissingLinkId)?;
                Ok(Action::Delete { id })
            }
            "replace" => Ok(Action::Replace {
                links: decode_links(request.links)?,
            }),
            _ => Err(MutationError::UnsupportedAction(action)),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn decode_patch(link: Option<JsonValue>) -> Result<Option<LinkPatch>, MutationError> {
    match link {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value @ JsonValue::Object(_)) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| MutationError::InvalidLink(e.to_string())),
        Some(_) => Err(MutationError::InvalidLink("expected a JSON object".to_string())),
    }
}

fn decode_links(links: Option<JsonValue>) -> Result<Vec<Link>, MutationError> {
    let Some(JsonValue::Array(items)) = links else {
        return Err(MutationError::InvalidLinksArray);
    };

    items
        .into_iter()
        .map(|item| match item {
            JsonValue::Object(_) => {
                serde_json::from_value(item).map_err(|_| MutationError::InvalidLinksArray)
            }
            _ => Err(MutationError::InvalidLinksArray),
        })
        .collect()
}

/// Result of a successful [`apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub document: Document,
    /// The link as stored, for `add` and `update`
    pub link: Option<Link>,
}

/// Apply `action` to `document`, stamping `lastUpdated` with `now` on success.
///
/// On error the input document is dropped unchanged; nothing is persisted by
/// this function.
pub fn apply(
    mut document: Document,
    action: Action,
    now: DateTime<Utc>,
) -> Result<Applied, MutationError> {
    let link = match action {
        Action::Add(new_link) => {
            let id = match new_link.id {
                Some(id) if document.links.iter().any(|l| l.id == id) => {
                    return Err(MutationError::DuplicateLinkId(id));
                }
                Some(id) => id,
                None => generate_id(&document.links),
            };
            let link = Link {
                id,
                title: new_link.title,
                url: new_link.url,
                category: new_link.category,
                icon: new_link.icon,
            };
            document.links.push(link.clone());
            Some(link)
        }
        Action::Update { id, changes } => {
            let existing = document
                .links
                .iter_mut()
                .find(|l| l.id == id)
                .ok_or(MutationError::LinkNotFound(id))?;
            changes.merge_into(existing);
            Some(existing.clone())
        }
        Action::Delete { id } => {
            let before = document.links.len();
            document.links.retain(|l| l.id != id);
            if document.links.len() == before {
                return Err(MutationError::LinkNotFound(id));
            }
            None
        }
        Action::Replace { links } => {
            document.links = links;
            None
        }
    };

    document.last_updated = timestamp(now);
    Ok(Applied { document, link })
}

fn generate_id(links: &[Link]) -> String {
    loop {
        let id = Uuid::new_v4().simple().to_string();
        if !links.iter().any(|l| l.id == id) {
            return id;
        }
    }
}
