use axum::http::{HeaderValue, Method};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yatube::{create_routes, dependencies::config, services::response::ServiceError, Bootstrap};

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
	println!("Environment Variable Is Being Set...");
	let config = config()?;

	// ! Tracing
	tracing_subscriber::registry()
		.with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			// axum logs rejections from built-in extractors with the `axum::rejection`
			// target, at `TRACE` level. `axum::rejection=trace` enables showing those events
			format!("yatube={0},tower_http={0},axum::rejection=trace", config.log_level).into()
		}))
		.with(tracing_subscriber::fmt::layer())
		.init();

	// ! Connection
	tracing::info!(backend = ?config.store_backend, "Connections are being pooled...");
	let state = Bootstrap::app_state(config).await?;

	let origins = config
		.allowed_origins()
		.into_iter()
		.map(|origin| origin.parse::<HeaderValue>())
		.collect::<Result<Vec<_>, _>>()
		.map_err(|err| ServiceError::Config(format!("invalid ALLOW_ORIGINS: {}", err)))?;

	let app = create_routes(state).layer(
		ServiceBuilder::new()
			.layer(TraceLayer::new_for_http())
			.layer(TimeoutLayer::new(config.request_timeout))
			.layer(CorsLayer::new().allow_origin(origins).allow_methods([Method::GET, Method::POST])),
	);

	let listener = tokio::net::TcpListener::bind(&config.server_ip_port).await?;
	tracing::info!(addr = %config.server_ip_port, "Start Web Server...");
	axum::serve(listener, app).await?;

	Ok(())
}
