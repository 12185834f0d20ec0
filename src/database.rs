use std::sync::OnceLock;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::{config::Config, services::response::ServiceError};

pub async fn connection_pool(config: &Config) -> Result<&'static PgPool, ServiceError> {
	static POOL: OnceLock<PgPool> = OnceLock::new();

	let p = match POOL.get() {
		None => {
			let url = config
				.database_url
				.as_deref()
				.ok_or_else(|| ServiceError::Config("DATABASE_URL must be set".to_string()))?;
			let pool = PgPoolOptions::new().max_connections(config.db_max_connections).connect(url).await.map_err(|err| {
				tracing::error!("Database connection failed: {:?}", err);
				ServiceError::Database(err)
			})?;
			POOL.get_or_init(|| pool)
		}
		Some(pool) => pool,
	};
	Ok(p)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), ServiceError> {
	sqlx::migrate!("./migrations").run(pool).await?;
	tracing::info!("Database migrations applied");
	Ok(())
}
