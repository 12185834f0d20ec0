use std::time::Duration;

use argon2::{
	password_hash::{PasswordHasher, SaltString},
	Argon2, PasswordHash, PasswordVerifier,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
	bootstrap::AppState,
	domain::user::{AccountForm, User},
	services::response::{ServiceError, ValidationErrors},
};

/// Two weeks, as long as a browser login cookie lives by default.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// Sessions opened at or before the returned instant have expired.
fn sessions_expire_at_or_before(session_ttl: Duration) -> DateTime<Utc> {
	let now = Utc::now();
	chrono::Duration::from_std(session_ttl)
		.ok()
		.and_then(|ttl| now.checked_sub_signed(ttl))
		.unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// A logged-in user and the bearer token identifying their session.
#[derive(Clone, Debug, Serialize)]
pub struct Session {
	pub token: String,
	pub user: User,
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
	let salt = SaltString::generate(rand::thread_rng());
	let hash = Argon2::default()
		.hash_password(password.as_bytes(), &salt)
		.map_err(|err| ServiceError::PasswordHash(err.to_string()))?
		.to_string();
	Ok(hash)
}

fn verify_password(
	password: &str,
	hash: &str,
) -> Result<bool, ServiceError> {
	let parsed = PasswordHash::new(hash).map_err(|err| ServiceError::PasswordHash(err.to_string()))?;
	Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Argon2 is CPU bound, keep it off the async workers.
async fn blocking<T: Send + 'static>(job: impl FnOnce() -> Result<T, ServiceError> + Send + 'static) -> Result<T, ServiceError> {
	tokio::task::spawn_blocking(job).await.map_err(|err| ServiceError::PasswordHash(err.to_string()))?
}

pub struct AccountHandler;
impl AccountHandler {
	pub async fn signup(
		state: &AppState,
		form: &AccountForm,
	) -> Result<Session, ServiceError> {
		let username = form.clean()?;
		let password = form.password.clone();
		let hash = blocking(move || hash_password(&password)).await?;

		let Some(user) = state.repository.create_user(&username, &hash).await? else {
			let mut errors = ValidationErrors::default();
			errors.add("username", "A user with that username already exists.");
			return Err(errors.into());
		};
		tracing::info!(user_id = user.id, username = %user.username, "User signed up");
		Self::open_session(state, user).await
	}

	pub async fn login(
		state: &AppState,
		form: &AccountForm,
	) -> Result<Session, ServiceError> {
		let invalid = || {
			let mut errors = ValidationErrors::default();
			errors.add("credentials", "Please enter a correct username and password.");
			ServiceError::Validation(errors)
		};

		let username = form.clean().map_err(|_| invalid())?;
		let Some((user, hash)) = state.repository.password_hash(&username).await? else {
			return Err(invalid());
		};
		let password = form.password.clone();
		if !blocking(move || verify_password(&password, &hash)).await? {
			tracing::info!(username = %user.username, "Rejected login");
			return Err(invalid());
		}
		Self::open_session(state, user).await
	}

	pub async fn logout(
		state: &AppState,
		token: &str,
	) -> Result<(), ServiceError> {
		state.repository.delete_session(token).await
	}

	/// Unknown and expired tokens resolve to an anonymous viewer.
	pub async fn viewer(
		state: &AppState,
		token: &str,
	) -> Result<Option<User>, ServiceError> {
		state.repository.session_user(token, sessions_expire_at_or_before(state.session_ttl)).await
	}

	async fn open_session(
		state: &AppState,
		user: User,
	) -> Result<Session, ServiceError> {
		let expired = state.repository.delete_sessions_before(sessions_expire_at_or_before(state.session_ttl)).await?;
		if expired > 0 {
			tracing::debug!(expired, "Expired sessions removed");
		}

		let token = Uuid::new_v4().to_string();
		state.repository.create_session(&token, user.id).await?;
		Ok(Session { token, user })
	}
}
