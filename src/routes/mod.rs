mod auth;
mod create_post;
mod feeds;
mod follow;
mod post_detail;

use axum::{
	middleware,
	routing::{get, post},
	Router,
};
use serde::Deserialize;

use crate::{bootstrap::AppState, common::middleware_session::resolve_viewer, services::response::ServiceError};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
	pub page: Option<String>,
}

/// Non-numeric ids name no post.
pub(crate) fn parse_post_id(raw: &str) -> Result<i64, ServiceError> {
	raw.parse::<i64>().map_err(|_| ServiceError::NotFound(format!("post `{}`", raw)))
}

pub(crate) fn post_detail_url(post_id: i64) -> String {
	format!("/posts/{}/", post_id)
}

pub(crate) fn profile_url(username: &str) -> String {
	format!("/profile/{}/", urlencoding::encode(username))
}

pub const FOLLOW_INDEX_URL: &str = "/follow/";

async fn health() -> &'static str {
	"OK"
}

pub fn create_routes(state: AppState) -> Router {
	Router::new()
		.route("/", get(feeds::index))
		.route("/group/:slug/", get(feeds::group_posts))
		.route("/profile/:username/", get(feeds::profile))
		.route("/profile/:username/follow/", get(follow::profile_follow))
		.route("/profile/:username/unfollow/", get(follow::profile_unfollow))
		.route("/follow/", get(feeds::follow_index))
		.route("/posts/:post_id/", get(post_detail::post_detail))
		.route("/posts/:post_id/comment/", post(post_detail::add_comment))
		.route("/posts/:post_id/edit/", get(create_post::edit_form).post(create_post::post_edit))
		.route("/create/", get(create_post::create_form).post(create_post::post_create))
		.route("/auth/login/", get(auth::login_form).post(auth::login))
		.route("/auth/logout/", post(auth::logout))
		.route("/auth/signup/", post(auth::signup))
		.route("/health", get(health))
		.layer(middleware::from_fn_with_state(state.clone(), resolve_viewer))
		.with_state(state)
}
