use axum::{
	extract::{Path, Query, State},
	response::Response,
	Json,
};
use serde::Serialize;

use super::PageQuery;
use crate::{
	bootstrap::AppState,
	common::middleware_session::{LoginRequired, Viewer},
	domain::{
		feed::Scope,
		post::{Group, Post},
		user::User,
	},
	services::{
		cache::CacheKey,
		feed::FeedSelector,
		follow::FollowToggle,
		paginator::{parse_page_number, Page},
		response::{json_bytes, render_bytes, ServiceError},
	},
};

#[derive(Serialize)]
pub struct IndexContext {
	pub page_obj: Page<Post>,
}

#[derive(Serialize)]
pub struct GroupContext {
	pub group: Group,
	pub page_obj: Page<Post>,
}

#[derive(Serialize)]
pub struct ProfileContext {
	pub author: User,
	pub post_num: usize,
	pub page_obj: Page<Post>,
	pub following: bool,
}

/// All posts. Rendered pages are served from the page cache.
pub async fn index(
	State(state): State<AppState>,
	Query(query): Query<PageQuery>,
) -> Result<Response, ServiceError> {
	let number = parse_page_number(query.page.as_deref());
	let key = CacheKey::new(Scope::All, number);
	if let Some(body) = state.cache.get(&key).await {
		return Ok(json_bytes(body));
	}

	let feed = FeedSelector::select(&state.repository, &Scope::All, None).await?;
	let page_obj = feed.page(&state.paginator, number).await?;
	let body = render_bytes(&IndexContext { page_obj })?;
	state.cache.insert(key, body.clone()).await;

	Ok(json_bytes(body))
}

pub async fn group_posts(
	State(state): State<AppState>,
	Path(slug): Path<String>,
	Query(query): Query<PageQuery>,
) -> Result<Json<GroupContext>, ServiceError> {
	let feed = FeedSelector::select(&state.repository, &Scope::Group(slug.clone()), None).await?;
	let group = feed.group().cloned().ok_or_else(|| ServiceError::NotFound(format!("group `{}`", slug)))?;
	let page_obj = feed.page(&state.paginator, parse_page_number(query.page.as_deref())).await?;

	Ok(Json(GroupContext { group, page_obj }))
}

pub async fn profile(
	State(state): State<AppState>,
	viewer: Viewer,
	Path(username): Path<String>,
	Query(query): Query<PageQuery>,
) -> Result<Json<ProfileContext>, ServiceError> {
	let feed = FeedSelector::select(&state.repository, &Scope::Author(username.clone()), viewer.user()).await?;
	let author = feed.author().cloned().ok_or_else(|| ServiceError::NotFound(format!("user `{}`", username)))?;
	let page_obj = feed.page(&state.paginator, parse_page_number(query.page.as_deref())).await?;
	let following = FollowToggle::is_following(&state, viewer.user(), &author).await?;

	Ok(Json(ProfileContext {
		post_num: page_obj.count,
		author,
		page_obj,
		following,
	}))
}

/// Posts by the authors the viewer follows.
pub async fn follow_index(
	State(state): State<AppState>,
	LoginRequired(user): LoginRequired,
	Query(query): Query<PageQuery>,
) -> Result<Json<IndexContext>, ServiceError> {
	let feed = FeedSelector::select(&state.repository, &Scope::Followed, Some(&user)).await?;
	let page_obj = feed.page(&state.paginator, parse_page_number(query.page.as_deref())).await?;

	Ok(Json(IndexContext { page_obj }))
}
