//! Application context built once at startup.

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::listing::ListView;
use crate::services::{AuthService, CartService, CatalogService, OrderService, ReviewService};
use crate::session::Store;
use crate::storage::{FileStore, KeyValueStore};

/// Everything the storefront views share.
///
/// Constructed once per process and passed by reference. The session store
/// is owned here and only mutated through the services, which dispatch
/// actions on it.
#[derive(Debug)]
pub struct AppContext {
    config: ClientConfig,
    api: ApiClient,
    store: Store,
}

impl AppContext {
    /// Create the context with file-backed storage under `config.state_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory cannot be created or the
    /// HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let storage = FileStore::open(&config.state_dir)?;
        Self::with_storage(config, Box::new(storage))
    }

    /// Create the context over an explicit storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_storage(config: ClientConfig, storage: Box<dyn KeyValueStore>) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        let store = Store::hydrate(storage);

        Ok(Self { config, api, store })
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get a reference to the API client.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Get a reference to the session store.
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// An empty product list view using the configured page size.
    #[must_use]
    pub fn list_view(&self) -> ListView {
        ListView::new(self.config.page_limit)
    }

    pub fn cart(&mut self) -> CartService<'_> {
        CartService::new(&mut self.store)
    }

    pub fn auth(&mut self) -> AuthService<'_> {
        AuthService::new(&self.api, &mut self.store)
    }

    #[must_use]
    pub const fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(&self.api)
    }

    #[must_use]
    pub const fn reviews(&self) -> ReviewService<'_> {
        ReviewService::new(&self.api, &self.store)
    }

    #[must_use]
    pub const fn orders(&self) -> OrderService<'_> {
        OrderService::new(&self.api, &self.store)
    }
}
