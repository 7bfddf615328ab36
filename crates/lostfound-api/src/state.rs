use std::sync::Arc;

use lostfound_db::Database;
use tracing::error;

use crate::error::ApiError;
use crate::identity::IdentityResolver;
use crate::pagination::DEFAULT_MAX_PAGE_SIZE;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub identity: Box<dyn IdentityResolver>,
    pub max_page_size: u32,
}

impl AppStateInner {
    pub fn new(db: Database, identity: Box<dyn IdentityResolver>) -> Self {
        Self {
            db,
            identity,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size.max(1);
        self
    }

    /// Run blocking DB work off the async runtime.
    pub async fn run_db<F, T>(self: &Arc<Self>, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || f(&state.db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ApiError::Internal
            })?
    }
}
