use std::{sync::Arc, time::Duration};

use crate::{
	adapters::repositories::{InMemoryRepository, Repository},
	config::Config,
	dependencies::repository,
	services::{accounts::DEFAULT_SESSION_TTL, cache::PageCache, paginator::Paginator, response::ServiceError},
};

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
	pub repository: Arc<dyn Repository>,
	pub cache: PageCache,
	pub paginator: Paginator,
	pub session_ttl: Duration,
}

impl AppState {
	pub fn new(
		repository: Arc<dyn Repository>,
		paginator: Paginator,
		cache: PageCache,
	) -> Self {
		Self {
			repository,
			cache,
			paginator,
			session_ttl: DEFAULT_SESSION_TTL,
		}
	}

	pub fn with_session_ttl(
		mut self,
		session_ttl: Duration,
	) -> Self {
		self.session_ttl = session_ttl;
		self
	}

	/// Fresh process-local store, nothing persisted.
	pub fn in_memory(
		page_size: usize,
		cache_ttl: Duration,
	) -> Self {
		Self::new(Arc::new(InMemoryRepository::new()), Paginator::new(page_size), PageCache::new(cache_ttl))
	}
}

pub struct Bootstrap;
impl Bootstrap {
	pub async fn app_state(config: &Config) -> Result<AppState, ServiceError> {
		let repository = repository(config).await?;
		let state = AppState::new(repository, Paginator::new(config.page_size), PageCache::new(config.cache_ttl))
			.with_session_ttl(config.session_ttl);
		tracing::info!(page_size = state.paginator.per_page(), cache_ttl = ?state.cache.ttl(), "Application state ready");
		Ok(state)
	}
}
