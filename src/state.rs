use crate::config::Config;
use crate::repository::DocumentRepository;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repository: DocumentRepository,
    pub config: Arc<Config>,
}
