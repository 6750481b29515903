//! Application layer: configuration, repositories, use cases and event
//! subscribers wired around the finance domain.

pub mod config;
pub mod error;
pub mod repositories;
pub mod search;
pub mod subscribers;
pub mod use_cases;

use std::sync::Arc;

use pocketbook_events::DomainEventRegistry;
use pocketbook_finance::ClientEvent;

pub use config::{AppConfig, ConfigError};
pub use error::{RepositoryError, UseCaseError, UseCaseResult};
pub use repositories::Repositories;
pub use search::{PaginationMeta, SearchParams, SearchResult, SortDirection};
pub use subscribers::register_subscribers;
pub use use_cases::FinanceUseCases;

pub type SharedRegistry = Arc<DomainEventRegistry<ClientEvent>>;

/// Fully wired application over in-memory storage.
#[derive(Debug)]
pub struct App {
    pub config: AppConfig,
    pub registry: SharedRegistry,
    pub use_cases: FinanceUseCases<SharedRegistry>,
}

impl App {
    /// Wire repositories, registry and subscribers. Does not touch logging.
    pub fn in_memory(config: AppConfig) -> Self {
        let repos = Repositories::in_memory();
        let registry: SharedRegistry = Arc::new(DomainEventRegistry::new());
        register_subscribers(&registry, &repos);

        let use_cases = FinanceUseCases::new(repos, Arc::clone(&registry), &config);
        Self {
            config,
            registry,
            use_cases,
        }
    }

    /// Read the configuration from the environment, initialize tracing and
    /// wire the application.
    pub fn bootstrap() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        pocketbook_observability::init(&config.log)?;
        tracing::info!(
            log_format = ?config.log.format,
            page_size = config.default_page_size,
            "pocketbook starting"
        );
        Ok(Self::in_memory(config))
    }
}
