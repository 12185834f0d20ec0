use axum::{
	extract::{Path, State},
	response::{IntoResponse, Response},
	Json,
};
use serde::Serialize;

use super::{parse_post_id, post_detail_url, profile_url};
use crate::{
	bootstrap::AppState,
	common::middleware_session::LoginRequired,
	domain::post::PostForm,
	services::{
		handlers::{EditOutcome, PostHandler},
		response::{found, ServiceError, ValidationErrors},
	},
};

#[derive(Serialize)]
pub struct PostFormContext {
	pub form: PostForm,
	pub errors: ValidationErrors,
	pub is_edit: bool,
	pub post_id: Option<i64>,
}

impl PostFormContext {
	fn render(
		form: PostForm,
		errors: ValidationErrors,
		post_id: Option<i64>,
	) -> Response {
		Json(PostFormContext {
			form,
			errors,
			is_edit: post_id.is_some(),
			post_id,
		})
		.into_response()
	}
}

pub async fn create_form(LoginRequired(_user): LoginRequired) -> Response {
	PostFormContext::render(PostForm::default(), ValidationErrors::default(), None)
}

pub async fn post_create(
	State(state): State<AppState>,
	LoginRequired(user): LoginRequired,
	Json(form): Json<PostForm>,
) -> Result<Response, ServiceError> {
	match PostHandler::create(&state, &user, &form).await {
		Ok(_) => Ok(found(profile_url(&user.username))),
		Err(ServiceError::Validation(errors)) => Ok(PostFormContext::render(form, errors, None)),
		Err(err) => Err(err),
	}
}

pub async fn edit_form(
	State(state): State<AppState>,
	LoginRequired(user): LoginRequired,
	Path(post_id): Path<String>,
) -> Result<Response, ServiceError> {
	let post = PostHandler::get(&state, parse_post_id(&post_id)?).await?;
	if post.author_id != user.id {
		return Ok(found(post_detail_url(post.id)));
	}
	Ok(PostFormContext::render(PostForm::from_post(&post), ValidationErrors::default(), Some(post.id)))
}

pub async fn post_edit(
	State(state): State<AppState>,
	LoginRequired(user): LoginRequired,
	Path(post_id): Path<String>,
	Json(form): Json<PostForm>,
) -> Result<Response, ServiceError> {
	let post_id = parse_post_id(&post_id)?;
	match PostHandler::edit(&state, &user, post_id, &form).await {
		Ok(EditOutcome::Updated(post)) | Ok(EditOutcome::NotAuthor(post)) => Ok(found(post_detail_url(post.id))),
		Err(ServiceError::Validation(errors)) => Ok(PostFormContext::render(form, errors, Some(post_id))),
		Err(err) => Err(err),
	}
}
