use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::response::ValidationErrors;

#[derive(Clone, PartialEq, Eq, Debug, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
	pub id: i64,
	pub username: String,
	pub created_at: DateTime<Utc>,
}

/// A directed subscription of `user_id` to the posts of `author_id`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Follow {
	pub user_id: i64,
	pub author_id: i64,
}

/// ASCII letters, digits and `@.+-_`. Emptiness is reported by the length rule.
static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9@.+_-]*$").expect("username pattern is valid"));

/// Credentials submitted to the signup and login forms.
#[derive(Clone, PartialEq, Eq, Default, Deserialize, Validate)]
pub struct AccountForm {
	#[serde(default)]
	#[validate(
		length(min = 1, max = 150, message = "Enter a username of 1 to 150 characters."),
		regex(
			path = *USERNAME_REGEX,
			message = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
		)
	)]
	pub username: String,
	#[serde(default)]
	#[validate(length(min = 1, message = "This field is required."))]
	pub password: String,
}

impl std::fmt::Debug for AccountForm {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		f.debug_struct("AccountForm").field("username", &self.username).finish_non_exhaustive()
	}
}

impl AccountForm {
	/// Validates the form with the username trimmed, returning that username.
	pub fn clean(&self) -> Result<String, ValidationErrors> {
		let trimmed = AccountForm {
			username: self.username.trim().to_string(),
			password: self.password.clone(),
		};
		trimmed.validate()?;
		Ok(trimmed.username)
	}
}
