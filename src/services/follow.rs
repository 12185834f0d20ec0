use crate::{
	bootstrap::AppState,
	domain::user::User,
	services::{feed::user_by_username, response::ServiceError},
};

pub struct FollowToggle;
impl FollowToggle {
	/// Idempotent. Following yourself is silently ignored.
	/// Returns true if a new edge was created.
	pub async fn follow(
		state: &AppState,
		user: &User,
		author: &User,
	) -> Result<bool, ServiceError> {
		if user.id == author.id {
			tracing::debug!(user = %user.username, "Ignoring self-follow");
			return Ok(false);
		}
		let created = state.repository.insert_follow(user.id, author.id).await?;
		if created {
			tracing::info!(user = %user.username, author = %author.username, "Follow created");
			state.cache.invalidate_all().await;
		}
		Ok(created)
	}

	/// Idempotent. Returns true if an edge was removed.
	pub async fn unfollow(
		state: &AppState,
		user: &User,
		author: &User,
	) -> Result<bool, ServiceError> {
		let removed = state.repository.delete_follow(user.id, author.id).await?;
		if removed {
			tracing::info!(user = %user.username, author = %author.username, "Follow removed");
			state.cache.invalidate_all().await;
		}
		Ok(removed)
	}

	pub async fn follow_username(
		state: &AppState,
		user: &User,
		username: &str,
	) -> Result<bool, ServiceError> {
		let author = user_by_username(&state.repository, username).await?;
		Self::follow(state, user, &author).await
	}

	pub async fn unfollow_username(
		state: &AppState,
		user: &User,
		username: &str,
	) -> Result<bool, ServiceError> {
		let author = user_by_username(&state.repository, username).await?;
		Self::unfollow(state, user, &author).await
	}

	/// Anonymous viewers follow nobody.
	pub async fn is_following(
		state: &AppState,
		viewer: Option<&User>,
		author: &User,
	) -> Result<bool, ServiceError> {
		match viewer {
			Some(viewer) => state.repository.follow_exists(viewer.id, author.id).await,
			None => Ok(false),
		}
	}
}
