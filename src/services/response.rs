use std::collections::BTreeMap;
use std::fmt::Display;

use axum::{
	http::{header, StatusCode},
	response::{IntoResponse, Response},
	Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::json;

/// Entry point unauthenticated visitors are sent to.
pub const LOGIN_URL: &str = "/auth/login/";

/// Per-field messages attached to a re-rendered form.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
	pub fn add(
		&mut self,
		field: impl Into<String>,
		message: impl Into<String>,
	) {
		self.0.entry(field.into()).or_default().push(message.into());
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn field(
		&self,
		field: &str,
	) -> Option<&[String]> {
		self.0.get(field).map(Vec::as_slice)
	}

	pub fn into_result<T>(
		self,
		value: T,
	) -> Result<T, ValidationErrors> {
		if self.is_empty() {
			Ok(value)
		} else {
			Err(self)
		}
	}
}

/// Rules without a message fall back to their code.
impl From<validator::ValidationErrors> for ValidationErrors {
	fn from(value: validator::ValidationErrors) -> Self {
		let mut errors = ValidationErrors::default();
		for (field, field_errors) in value.field_errors() {
			for error in field_errors.iter() {
				let message = error.message.as_ref().unwrap_or(&error.code);
				errors.add(field.to_string(), message.to_string());
			}
		}
		errors
	}
}

impl Display for ValidationErrors {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		let fields: Vec<String> = self.0.iter().map(|(field, messages)| format!("{}: {}", field, messages.join(" "))).collect();
		write!(f, "{}", fields.join("; "))
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Authentication required")]
	Unauthorized,

	#[error("Validation failed: {0}")]
	Validation(ValidationErrors),

	#[error("Database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("Migration error: {0}")]
	Migration(#[from] sqlx::migrate::MigrateError),

	#[error("Password hashing error: {0}")]
	PasswordHash(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Configuration error: {0}")]
	Config(String),
}

impl From<ValidationErrors> for ServiceError {
	fn from(value: ValidationErrors) -> Self {
		ServiceError::Validation(value)
	}
}

impl IntoResponse for ServiceError {
	fn into_response(self) -> Response {
		let (status, code, message) = match &self {
			ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
			ServiceError::Unauthorized => return found(LOGIN_URL.to_string()),
			ServiceError::Validation(errors) => {
				let body = Json(json!({
					"error": {
						"code": "VALIDATION_ERROR",
						"message": self.to_string(),
						"fields": errors,
					}
				}));
				return (StatusCode::BAD_REQUEST, body).into_response();
			}
			_ => {
				tracing::error!("Request failed: {:?}", self);
				(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal server error".to_string())
			}
		};

		let body = Json(json!({
			"error": {
				"code": code,
				"message": message,
			}
		}));

		(status, body).into_response()
	}
}

/// `302 Found` to `location`.
pub fn found(location: String) -> Response {
	(StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Sends the visitor to the login page, remembering where they were heading.
pub fn login_redirect(next: &str) -> Response {
	found(format!("{}?next={}", LOGIN_URL, urlencoding::encode(next).replace("%2F", "/")))
}

pub fn render_bytes<T: Serialize>(context: &T) -> Result<Bytes, ServiceError> {
	Ok(Bytes::from(serde_json::to_vec(context)?))
}

pub fn json_bytes(body: Bytes) -> Response {
	([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_login_redirect_keeps_path_readable() {
		let response = login_redirect("/posts/1/comment/");
		assert_eq!(response.status(), StatusCode::FOUND);
		assert_eq!(response.headers()[header::LOCATION], "/auth/login/?next=/posts/1/comment/");

		let response = login_redirect("/follow/?page=2");
		assert_eq!(response.headers()[header::LOCATION], "/auth/login/?next=/follow/%3Fpage%3D2");
	}

	#[test]
	fn test_error_status_codes() {
		assert_eq!(ServiceError::NotFound("group".into()).into_response().status(), StatusCode::NOT_FOUND);
		assert_eq!(ServiceError::Unauthorized.into_response().status(), StatusCode::FOUND);
		assert_eq!(
			ServiceError::Validation(ValidationErrors::default()).into_response().status(),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			ServiceError::Config("missing".into()).into_response().status(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}

	#[test]
	fn test_validation_errors_collect_per_field() {
		let mut errors = ValidationErrors::default();
		assert!(errors.clone().into_result(()).is_ok());
		errors.add("text", "Enter the post text.");
		errors.add("text", "Second");
		assert_eq!(errors.field("text").unwrap().len(), 2);
		assert_eq!(serde_json::to_value(&errors).unwrap(), json!({"text": ["Enter the post text.", "Second"]}));
	}

	#[test]
	fn test_validator_errors_keep_message_or_code() {
		let mut source = validator::ValidationErrors::new();
		let mut with_message = validator::ValidationError::new("blank");
		with_message.message = Some("Enter the post text.".into());
		source.add("text", with_message);
		source.add("username", validator::ValidationError::new("length"));

		let errors = ValidationErrors::from(source);
		assert_eq!(errors.field("text"), Some(&["Enter the post text.".to_string()][..]));
		assert_eq!(errors.field("username"), Some(&["length".to_string()][..]));
	}
}
