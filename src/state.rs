//! Shared application state for all routes.

use crate::store::CatalogStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    /// Show error messages on error pages. Off in production.
    pub expose_errors: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, expose_errors: bool) -> Self {
        Self {
            store,
            expose_errors,
        }
    }

    pub fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }
}
