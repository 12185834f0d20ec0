use std::convert::Infallible;

use axum::{
	async_trait,
	extract::{FromRequestParts, Request, State},
	http::{header, request::Parts, HeaderMap, StatusCode},
	middleware::Next,
	response::Response,
};

use crate::{
	bootstrap::AppState,
	domain::user::User,
	services::{
		accounts::AccountHandler,
		response::{login_redirect, ServiceError},
	},
};

/// The user behind the current request, if any.
#[derive(Clone, Debug, Default)]
pub struct Viewer(pub Option<User>);

impl Viewer {
	pub fn user(&self) -> Option<&User> {
		self.0.as_ref()
	}
}

/// Bearer token presented with the request.
#[derive(Clone, Debug)]
pub struct SessionToken(pub String);

/// Extracts the authenticated user, otherwise redirects to the login page with `next` set.
#[derive(Clone, Debug)]
pub struct LoginRequired(pub User);

fn bearer_token(headers: &HeaderMap) -> Option<String> {
	headers
		.get(header::AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.strip_prefix("Bearer "))
		.map(str::trim)
		.filter(|token| !token.is_empty())
		.map(str::to_string)
}

pub async fn resolve_viewer(
	State(state): State<AppState>,
	mut request: Request,
	next: Next,
) -> Result<Response, ServiceError> {
	let token = bearer_token(request.headers());

	let viewer = match &token {
		Some(token) => AccountHandler::viewer(&state, token).await?,
		None => None,
	};
	if token.is_some() && viewer.is_none() {
		tracing::debug!("Unknown session token, treating request as anonymous");
	}

	let extensions = request.extensions_mut();
	if let Some(token) = token {
		extensions.insert(SessionToken(token));
	}
	extensions.insert(Viewer(viewer));

	Ok(next.run(request).await)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Viewer {
	type Rejection = Infallible;

	async fn from_request_parts(
		parts: &mut Parts,
		_state: &S,
	) -> Result<Self, Self::Rejection> {
		Ok(parts.extensions.get::<Viewer>().cloned().unwrap_or_default())
	}
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for LoginRequired {
	type Rejection = Response;

	async fn from_request_parts(
		parts: &mut Parts,
		_state: &S,
	) -> Result<Self, Self::Rejection> {
		match parts.extensions.get::<Viewer>() {
			Some(Viewer(Some(user))) => Ok(LoginRequired(user.clone())),
			_ => {
				let next = parts.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
				Err(login_redirect(next))
			}
		}
	}
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SessionToken {
	type Rejection = StatusCode;

	async fn from_request_parts(
		parts: &mut Parts,
		_state: &S,
	) -> Result<Self, Self::Rejection> {
		parts.extensions.get::<SessionToken>().cloned().ok_or(StatusCode::UNAUTHORIZED)
	}
}
