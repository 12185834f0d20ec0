use std::sync::{Arc, OnceLock};

use crate::{
	adapters::repositories::{InMemoryRepository, PgRepository, Repository},
	config::{Config, StoreBackend},
	database::{connection_pool, run_migrations},
	services::response::ServiceError,
};

pub fn config() -> Result<&'static Config, ServiceError> {
	static CONFIG: OnceLock<Config> = OnceLock::new();
	let config = match CONFIG.get() {
		None => {
			let config = Config::new()?;

			CONFIG.get_or_init(|| config)
		}
		Some(config) => config,
	};
	Ok(config)
}

/// Entity store selected by `STORE_BACKEND`.
pub async fn repository(config: &Config) -> Result<Arc<dyn Repository>, ServiceError> {
	match config.store_backend {
		StoreBackend::Memory => {
			tracing::warn!("Using the in-memory store, nothing will be persisted");
			Ok(Arc::new(InMemoryRepository::new()))
		}
		StoreBackend::Postgres => {
			let pool = connection_pool(config).await?;
			run_migrations(pool).await?;
			Ok(Arc::new(PgRepository::new(pool.clone())))
		}
	}
}
