use std::time::Duration;

use bytes::Bytes;
use moka::future::Cache;

use crate::domain::feed::Scope;

/// Upper bound on rendered pages kept at once.
const MAX_CACHED_PAGES: u64 = 1_000;

#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct CacheKey {
	pub scope: Scope,
	pub page: usize,
}

impl CacheKey {
	pub fn new(
		scope: Scope,
		page: usize,
	) -> Self {
		Self { scope, page }
	}
}

/// Rendered feed pages kept for a fixed time-to-live.
///
/// Entries may be stale for up to `ttl`; writes call [`PageCache::invalidate_all`].
/// A zero `ttl` disables caching.
#[derive(Clone)]
pub struct PageCache {
	ttl: Duration,
	pages: Option<Cache<CacheKey, Bytes>>,
}

impl PageCache {
	pub fn new(ttl: Duration) -> Self {
		let pages = (!ttl.is_zero()).then(|| Cache::builder().max_capacity(MAX_CACHED_PAGES).time_to_live(ttl).build());
		Self { ttl, pages }
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	pub async fn get(
		&self,
		key: &CacheKey,
	) -> Option<Bytes> {
		self.pages.as_ref()?.get(key).await
	}

	pub async fn insert(
		&self,
		key: CacheKey,
		body: Bytes,
	) {
		if let Some(pages) = &self.pages {
			pages.insert(key, body).await;
		}
	}

	pub async fn invalidate_all(&self) {
		if let Some(pages) = &self.pages {
			pages.invalidate_all();
			pages.run_pending_tasks().await;
			tracing::debug!("Page cache invalidated");
		}
	}

	/// Number of live pages, after pending evictions have been applied.
	pub async fn len(&self) -> u64 {
		match &self.pages {
			Some(pages) => {
				pages.run_pending_tasks().await;
				pages.entry_count()
			}
			None => 0,
		}
	}
}
