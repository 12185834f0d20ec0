use std::{str::FromStr, time::Duration};

use crate::services::{accounts::DEFAULT_SESSION_TTL, paginator::DEFAULT_PAGE_SIZE, response::ServiceError};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StoreBackend {
	Postgres,
	Memory,
}

impl FromStr for StoreBackend {
	type Err = ServiceError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"postgres" | "postgresql" => Ok(StoreBackend::Postgres),
			"memory" => Ok(StoreBackend::Memory),
			other => Err(ServiceError::Config(format!("unknown STORE_BACKEND `{}`", other))),
		}
	}
}

#[derive(Clone, Debug)]
pub struct Config {
	/// Default tracing filter level when RUST_LOG is not set
	pub log_level: String,

	/// Address server is listening to
	pub server_ip_port: String,
	pub database_url: Option<String>,
	pub db_max_connections: u32,
	pub allow_origins: String,
	pub store_backend: StoreBackend,

	/// Posts per feed page
	pub page_size: usize,
	pub cache_ttl: Duration,
	pub request_timeout: Duration,

	/// How long a login stays valid
	pub session_ttl: Duration,
}

impl Config {
	pub fn new() -> Result<Config, ServiceError> {
		dotenv::dotenv().ok();
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ServiceError> {
		let log_level = lookup("LOG_LEVEL").unwrap_or("info".to_string());
		let server_ip_port = lookup("SERVER_IP_PORT").unwrap_or("0.0.0.0:80".into());
		let database_url = lookup("DATABASE_URL");
		let allow_origins = lookup("ALLOW_ORIGINS").unwrap_or("http://localhost:3000,http://localhost:3001".to_string());
		let store_backend = match lookup("STORE_BACKEND") {
			Some(value) => value.parse()?,
			None => StoreBackend::Postgres,
		};
		if store_backend == StoreBackend::Postgres && database_url.is_none() {
			return Err(ServiceError::Config("DATABASE_URL must be set!".to_string()));
		}

		let db_max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 30)?;
		let page_size: usize = parse_or(&lookup, "PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
		if page_size == 0 {
			return Err(ServiceError::Config("PAGE_SIZE must be positive".to_string()));
		}
		let cache_ttl = Duration::from_secs(parse_or(&lookup, "CACHE_TTL_SECS", 20)?);
		let request_timeout = Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?);
		let session_ttl = Duration::from_secs(parse_or(&lookup, "SESSION_TTL_SECS", DEFAULT_SESSION_TTL.as_secs())?);

		Ok(Config {
			log_level,
			server_ip_port,
			database_url,
			db_max_connections,
			allow_origins,
			store_backend,
			page_size,
			cache_ttl,
			request_timeout,
			session_ttl,
		})
	}

	pub fn allowed_origins(&self) -> Vec<&str> {
		self.allow_origins.split(',').map(str::trim).filter(|origin| !origin.is_empty()).collect()
	}
}

fn parse_or<T: FromStr>(
	lookup: &impl Fn(&str) -> Option<String>,
	key: &str,
	default: T,
) -> Result<T, ServiceError> {
	match lookup(key) {
		Some(value) => value.trim().parse().map_err(|_| ServiceError::Config(format!("{} must be a number, got `{}`", key, value))),
		None => Ok(default),
	}
}
