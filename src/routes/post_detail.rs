use axum::{
	extract::{Path, State},
	response::Response,
	Json,
};

use super::{parse_post_id, post_detail_url};
use crate::{
	bootstrap::AppState,
	common::middleware_session::LoginRequired,
	domain::post::CommentForm,
	services::{
		handlers::{PostDetail, PostHandler},
		response::{found, ServiceError},
	},
};

pub async fn post_detail(
	State(state): State<AppState>,
	Path(post_id): Path<String>,
) -> Result<Json<PostDetail>, ServiceError> {
	let detail = PostHandler::detail(&state, parse_post_id(&post_id)?).await?;
	Ok(Json(detail))
}

pub async fn add_comment(
	State(state): State<AppState>,
	LoginRequired(user): LoginRequired,
	Path(post_id): Path<String>,
	Json(form): Json<CommentForm>,
) -> Result<Response, ServiceError> {
	let post_id = parse_post_id(&post_id)?;
	PostHandler::add_comment(&state, post_id, &user, &form.text).await?;
	Ok(found(post_detail_url(post_id)))
}
