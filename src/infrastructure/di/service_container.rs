//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::ReorderService;
use crate::config::Settings;
use crate::infrastructure::traits::{CategoryStore, HttpCategoryStore};
use crate::infrastructure::{InfraResult, Session};

/// Container holding the settings and the remote store.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Remote category store
    pub store: Arc<dyn CategoryStore>,
}

impl ServiceContainer {
    /// Create a new service container with the HTTP store.
    ///
    /// Reads the session token (inline or from `token_file`) up front.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let session = Session::from_config(&settings.session)?;
        debug!(
            base_url = %settings.api.base_url,
            authenticated = session.is_authenticated(),
            "building category store"
        );
        let store = HttpCategoryStore::new(&settings.api, session)?;
        Ok(Self::with_deps(settings, Arc::new(store)))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, store: Arc<dyn CategoryStore>) -> Self {
        Self {
            settings: Arc::new(settings),
            store,
        }
    }

    /// Fresh reorder service with an empty forest.
    pub fn reorder_service(&self) -> ReorderService {
        ReorderService::new(Arc::clone(&self.store))
    }
}
