use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::models::Document;
use crate::store::KvStore;

/// Storage key of the one and only links document
pub const LINKS_KEY: &str = "links";

/// Reads and writes the links document through a [`KvStore`]
///
/// `fetch` then `save` is a plain read-modify-write with no version check:
/// two webhook calls racing on the same key can lose one of the updates.
#[derive(Clone)]
pub struct DocumentRepository {
    store: Arc<dyn KvStore>,
}

impl DocumentRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Load the stored document, or the sample document when nothing is stored yet.
    pub async fn fetch(&self) -> Result<Document> {
        match self.store.get(LINKS_KEY).await? {
            Some(value) => {
                let document: Document = serde_json::from_value(value)
                    .context("Stored links document is malformed")?;
                tracing::debug!("Loaded links document with {} links", document.links.len());
                Ok(document)
            }
            None => {
                tracing::debug!("No links document stored, serving sample data");
                Ok(Document::sample(Utc::now()))
            }
        }
    }

    /// Overwrite the stored document.
    pub async fn save(&self, document: &Document) -> Result<()> {
        let value = serde_json::to_value(document)
            .context("Failed to serialize links document")?;
        self.store.put(LINKS_KEY, value).await?;
        tracing::debug!("Saved links document with {} links", document.links.len());
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        self.store.health_check().await
    }
}
