use serde::Serialize;

use crate::{
	bootstrap::AppState,
	domain::{
		feed::PostFilter,
		post::{CleanPost, Comment, CommentForm, Post, PostForm},
		user::User,
	},
	services::response::ServiceError,
};

/// What a post detail page shows.
#[derive(Debug, Serialize)]
pub struct PostDetail {
	pub post: Post,
	/// How many posts the author has written.
	pub post_num: usize,
	pub comments: Vec<Comment>,
	pub form: CommentForm,
}

#[derive(Debug)]
pub enum EditOutcome {
	Updated(Post),
	/// The editor does not own the post; nothing was written.
	NotAuthor(Post),
}

pub struct PostHandler;
impl PostHandler {
	pub async fn get(
		state: &AppState,
		post_id: i64,
	) -> Result<Post, ServiceError> {
		state
			.repository
			.post_by_id(post_id)
			.await?
			.ok_or_else(|| ServiceError::NotFound(format!("post {}", post_id)))
	}

	/// Validates a submitted form, resolving its group against the store.
	pub async fn clean(
		state: &AppState,
		form: &PostForm,
	) -> Result<CleanPost, ServiceError> {
		let group = match form.group {
			Some(group_id) => state.repository.group_by_id(group_id).await?,
			None => None,
		};
		Ok(form.clean(group.as_ref())?)
	}

	pub async fn create(
		state: &AppState,
		author: &User,
		form: &PostForm,
	) -> Result<Post, ServiceError> {
		let clean = Self::clean(state, form).await?;
		let post = state.repository.insert_post(author.id, &clean).await?;
		state.cache.invalidate_all().await;

		tracing::info!(post_id = post.id, author = %author.username, "Post created");
		Ok(post)
	}

	/// Only the author may edit. Validation runs after the ownership check.
	pub async fn edit(
		state: &AppState,
		editor: &User,
		post_id: i64,
		form: &PostForm,
	) -> Result<EditOutcome, ServiceError> {
		let post = Self::get(state, post_id).await?;
		if post.author_id != editor.id {
			tracing::warn!(post_id, editor = %editor.username, "Edit attempt by non-author");
			return Ok(EditOutcome::NotAuthor(post));
		}

		let clean = Self::clean(state, form).await?;
		let post = state.repository.update_post(post_id, &clean).await?;
		state.cache.invalidate_all().await;

		tracing::info!(post_id, "Post edited");
		Ok(EditOutcome::Updated(post))
	}

	pub async fn detail(
		state: &AppState,
		post_id: i64,
	) -> Result<PostDetail, ServiceError> {
		let post = Self::get(state, post_id).await?;
		let post_num = state.repository.count_posts(PostFilter::Author(post.author_id)).await?;
		let comments = state.repository.comments_for_post(post.id).await?;

		Ok(PostDetail {
			post,
			post_num,
			comments,
			form: CommentForm::default(),
		})
	}

	/// Comment text is stored as given; an empty comment is accepted.
	pub async fn add_comment(
		state: &AppState,
		post_id: i64,
		author: &User,
		text: &str,
	) -> Result<Comment, ServiceError> {
		let post = Self::get(state, post_id).await?;
		let comment = state.repository.insert_comment(post.id, author.id, text).await?;
		state.cache.invalidate_all().await;

		tracing::info!(post_id, comment_id = comment.id, author = %author.username, "Comment added");
		Ok(comment)
	}
}
