pub(crate) mod memory;
pub(crate) mod post_repository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use self::memory::InMemoryRepository;
pub use self::post_repository::PgRepository;
use crate::{
	domain::{
		feed::PostFilter,
		post::{CleanPost, Comment, Group, NewGroup, Post},
		user::User,
	},
	services::response::ServiceError,
};

/// Entity store for users, sessions, groups, posts, comments and follows.
///
/// Feeds are always returned newest first, ties broken by the higher id.
/// Implementations must make `insert_follow` an atomic create-if-absent.
#[async_trait]
pub trait Repository: Send + Sync {
	/// Returns `None` when the username is already taken.
	async fn create_user(
		&self,
		username: &str,
		password_hash: &str,
	) -> Result<Option<User>, ServiceError>;
	async fn user_by_username(
		&self,
		username: &str,
	) -> Result<Option<User>, ServiceError>;
	async fn password_hash(
		&self,
		username: &str,
	) -> Result<Option<(User, String)>, ServiceError>;

	async fn create_session(
		&self,
		token: &str,
		user_id: i64,
	) -> Result<(), ServiceError>;
	/// Sessions opened at or before `issued_after` count as expired.
	async fn session_user(
		&self,
		token: &str,
		issued_after: DateTime<Utc>,
	) -> Result<Option<User>, ServiceError>;
	async fn delete_session(
		&self,
		token: &str,
	) -> Result<(), ServiceError>;
	/// Returns how many expired sessions were removed.
	async fn delete_sessions_before(
		&self,
		issued_before: DateTime<Utc>,
	) -> Result<u64, ServiceError>;

	async fn create_group(
		&self,
		group: NewGroup,
	) -> Result<Group, ServiceError>;
	async fn group_by_slug(
		&self,
		slug: &str,
	) -> Result<Option<Group>, ServiceError>;
	async fn group_by_id(
		&self,
		id: i64,
	) -> Result<Option<Group>, ServiceError>;

	async fn insert_post(
		&self,
		author_id: i64,
		post: &CleanPost,
	) -> Result<Post, ServiceError>;
	async fn update_post(
		&self,
		id: i64,
		post: &CleanPost,
	) -> Result<Post, ServiceError>;
	async fn post_by_id(
		&self,
		id: i64,
	) -> Result<Option<Post>, ServiceError>;
	async fn count_posts(
		&self,
		filter: PostFilter,
	) -> Result<usize, ServiceError>;
	async fn list_posts(
		&self,
		filter: PostFilter,
		offset: usize,
		limit: usize,
	) -> Result<Vec<Post>, ServiceError>;

	async fn insert_comment(
		&self,
		post_id: i64,
		author_id: i64,
		text: &str,
	) -> Result<Comment, ServiceError>;
	/// Oldest first.
	async fn comments_for_post(
		&self,
		post_id: i64,
	) -> Result<Vec<Comment>, ServiceError>;

	/// Returns true if a new edge was created.
	async fn insert_follow(
		&self,
		user_id: i64,
		author_id: i64,
	) -> Result<bool, ServiceError>;
	/// Returns true if an edge was removed.
	async fn delete_follow(
		&self,
		user_id: i64,
		author_id: i64,
	) -> Result<bool, ServiceError>;
	async fn follow_exists(
		&self,
		user_id: i64,
		author_id: i64,
	) -> Result<bool, ServiceError>;
}
