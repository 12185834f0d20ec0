pub mod entity;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub use self::entity::{Comment, Group, NewGroup, Post};
use crate::services::response::ValidationErrors;

fn validate_post_text(text: &str) -> Result<(), ValidationError> {
	if text.trim().is_empty() {
		let mut error = ValidationError::new("blank");
		error.message = Some(Cow::Borrowed("Enter the post text."));
		return Err(error);
	}
	Ok(())
}

/// Raw post fields as submitted by the create and edit forms.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize, Validate)]
pub struct PostForm {
	#[serde(default)]
	#[validate(custom(function = "validate_post_text"))]
	pub text: String,
	#[serde(default)]
	pub group: Option<i64>,
	#[serde(default)]
	pub image: Option<String>,
}

/// Post fields that passed validation and can be written to the store.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CleanPost {
	pub text: String,
	pub group_id: Option<i64>,
	pub image: Option<String>,
}

impl PostForm {
	pub fn from_post(post: &Post) -> Self {
		Self {
			text: post.text.clone(),
			group: post.group_id,
			image: post.image.clone(),
		}
	}

	pub fn clean_image(&self) -> Option<String> {
		self.image.as_deref().map(str::trim).filter(|image| !image.is_empty()).map(str::to_string)
	}

	/// `group` is what the submitted group id resolved to in the store.
	pub fn clean(
		&self,
		group: Option<&Group>,
	) -> Result<CleanPost, ValidationErrors> {
		let mut errors = match self.validate() {
			Ok(()) => ValidationErrors::default(),
			Err(errors) => ValidationErrors::from(errors),
		};

		let group_id = match (self.group, group) {
			(Some(requested), Some(found)) if found.id == requested => Some(requested),
			(Some(_), _) => {
				errors.add("group", "Select a valid choice. That choice is not one of the available choices.");
				None
			}
			(None, _) => None,
		};

		errors.into_result(CleanPost {
			text: self.text.trim().to_string(),
			group_id,
			image: self.clean_image(),
		})
	}
}

/// Comment text is accepted as submitted, empty included.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct CommentForm {
	#[serde(default)]
	pub text: String,
}
