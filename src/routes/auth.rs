use axum::{
	extract::{Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
	bootstrap::AppState,
	common::middleware_session::SessionToken,
	domain::user::AccountForm,
	services::{
		accounts::AccountHandler,
		response::{ServiceError, ValidationErrors},
	},
};

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
	pub next: Option<String>,
}

#[derive(Serialize)]
pub struct AccountFormContext {
	pub username: String,
	pub errors: ValidationErrors,
	pub next: Option<String>,
}

fn render_form(
	form: &AccountForm,
	errors: ValidationErrors,
	next: Option<String>,
) -> Response {
	Json(AccountFormContext {
		username: form.username.clone(),
		errors,
		next,
	})
	.into_response()
}

pub async fn login_form(Query(query): Query<NextQuery>) -> Response {
	render_form(&AccountForm::default(), ValidationErrors::default(), query.next)
}

pub async fn login(
	State(state): State<AppState>,
	Query(query): Query<NextQuery>,
	Json(form): Json<AccountForm>,
) -> Result<Response, ServiceError> {
	match AccountHandler::login(&state, &form).await {
		Ok(session) => Ok(Json(json!({
			"token": session.token,
			"user": session.user,
			"next": query.next.unwrap_or_else(|| "/".to_string()),
		}))
		.into_response()),
		Err(ServiceError::Validation(errors)) => Ok(render_form(&form, errors, query.next)),
		Err(err) => Err(err),
	}
}

pub async fn signup(
	State(state): State<AppState>,
	Json(form): Json<AccountForm>,
) -> Result<Response, ServiceError> {
	match AccountHandler::signup(&state, &form).await {
		Ok(session) => Ok((StatusCode::CREATED, Json(session)).into_response()),
		Err(ServiceError::Validation(errors)) => Ok(render_form(&form, errors, None)),
		Err(err) => Err(err),
	}
}

/// Ends the presented session. Calling it without one is fine.
pub async fn logout(
	State(state): State<AppState>,
	token: Option<SessionToken>,
) -> Result<Response, ServiceError> {
	if let Some(SessionToken(token)) = token {
		AccountHandler::logout(&state, &token).await?;
	}
	Ok(Json(json!({ "logged_out": true })).into_response())
}
