use axum::{
	extract::{Path, State},
	response::Response,
};

use super::FOLLOW_INDEX_URL;
use crate::{
	bootstrap::AppState,
	common::middleware_session::LoginRequired,
	services::{
		follow::FollowToggle,
		response::{found, ServiceError},
	},
};

pub async fn profile_follow(
	State(state): State<AppState>,
	LoginRequired(user): LoginRequired,
	Path(username): Path<String>,
) -> Result<Response, ServiceError> {
	FollowToggle::follow_username(&state, &user, &username).await?;
	Ok(found(FOLLOW_INDEX_URL.to_string()))
}

pub async fn profile_unfollow(
	State(state): State<AppState>,
	LoginRequired(user): LoginRequired,
	Path(username): Path<String>,
) -> Result<Response, ServiceError> {
	FollowToggle::unfollow_username(&state, &user, &username).await?;
	Ok(found(FOLLOW_INDEX_URL.to_string()))
}
