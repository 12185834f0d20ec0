use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::Repository;
use crate::{
	domain::{
		feed::PostFilter,
		post::{CleanPost, Comment, Group, NewGroup, Post},
		user::User,
	},
	services::response::ServiceError,
};

const SELECT_POSTS: &str = r#"
	SELECT p.id, p.text, p.created_at, p.author_id, u.username AS author,
	       p.group_id, g.slug AS group_slug, p.image
	FROM posts p
	JOIN users u ON u.id = p.author_id
	LEFT JOIN post_groups g ON g.id = p.group_id
"#;

const SELECT_COMMENTS: &str = r#"
	SELECT c.id, c.post_id, c.author_id, u.username AS author, c.text, c.created_at
	FROM comments c
	JOIN users u ON u.id = c.author_id
"#;

#[derive(sqlx::FromRow)]
struct UserRow {
	id: i64,
	username: String,
	created_at: DateTime<Utc>,
	password_hash: String,
}

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgRepository {
	pool: PgPool,
}

impl PgRepository {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	fn push_filter(
		builder: &mut QueryBuilder<'_, Postgres>,
		filter: PostFilter,
	) {
		match filter {
			PostFilter::All => {}
			PostFilter::Group(group_id) => {
				builder.push(" WHERE p.group_id = ").push_bind(group_id);
			}
			PostFilter::Author(author_id) => {
				builder.push(" WHERE p.author_id = ").push_bind(author_id);
			}
			PostFilter::FollowedBy(user_id) => {
				builder
					.push(" WHERE p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = ")
					.push_bind(user_id)
					.push(")");
			}
		}
	}

	async fn post_or_missing(
		&self,
		id: i64,
	) -> Result<Post, ServiceError> {
		self.post_by_id(id).await?.ok_or_else(|| ServiceError::NotFound(format!("post {}", id)))
	}
}

#[async_trait]
impl Repository for PgRepository {
	async fn create_user(
		&self,
		username: &str,
		password_hash: &str,
	) -> Result<Option<User>, ServiceError> {
		let user = sqlx::query_as::<_, User>(
			r#"
			INSERT INTO users (username, password_hash)
			VALUES ($1, $2)
			ON CONFLICT (username) DO NOTHING
			RETURNING id, username, created_at
			"#,
		)
		.bind(username)
		.bind(password_hash)
		.fetch_optional(&self.pool)
		.await?;

		Ok(user)
	}

	async fn user_by_username(
		&self,
		username: &str,
	) -> Result<Option<User>, ServiceError> {
		let user = sqlx::query_as::<_, User>("SELECT id, username, created_at FROM users WHERE username = $1")
			.bind(username)
			.fetch_optional(&self.pool)
			.await?;
		Ok(user)
	}

	async fn password_hash(
		&self,
		username: &str,
	) -> Result<Option<(User, String)>, ServiceError> {
		let row = sqlx::query_as::<_, UserRow>("SELECT id, username, created_at, password_hash FROM users WHERE username = $1")
			.bind(username)
			.fetch_optional(&self.pool)
			.await?;

		Ok(row.map(|row| {
			(
				User {
					id: row.id,
					username: row.username,
					created_at: row.created_at,
				},
				row.password_hash,
			)
		}))
	}

	async fn create_session(
		&self,
		token: &str,
		user_id: i64,
	) -> Result<(), ServiceError> {
		sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2)")
			.bind(token)
			.bind(user_id)
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	async fn session_user(
		&self,
		token: &str,
		issued_after: DateTime<Utc>,
	) -> Result<Option<User>, ServiceError> {
		let user = sqlx::query_as::<_, User>(
			r#"
			SELECT u.id, u.username, u.created_at
			FROM sessions s
			JOIN users u ON u.id = s.user_id
			WHERE s.token = $1 AND s.created_at > $2
			"#,
		)
		.bind(token)
		.bind(issued_after)
		.fetch_optional(&self.pool)
		.await?;
		Ok(user)
	}

	async fn delete_session(
		&self,
		token: &str,
	) -> Result<(), ServiceError> {
		sqlx::query("DELETE FROM sessions WHERE token = $1").bind(token).execute(&self.pool).await?;
		Ok(())
	}

	async fn delete_sessions_before(
		&self,
		issued_before: DateTime<Utc>,
	) -> Result<u64, ServiceError> {
		let removed = sqlx::query("DELETE FROM sessions WHERE created_at <= $1")
			.bind(issued_before)
			.execute(&self.pool)
			.await?
			.rows_affected();
		Ok(removed)
	}

	async fn create_group(
		&self,
		group: NewGroup,
	) -> Result<Group, ServiceError> {
		let group = sqlx::query_as::<_, Group>(
			r#"
			INSERT INTO post_groups (title, slug, description)
			VALUES ($1, $2, $3)
			RETURNING id, title, slug, description
			"#,
		)
		.bind(group.title)
		.bind(group.slug)
		.bind(group.description)
		.fetch_one(&self.pool)
		.await?;
		Ok(group)
	}

	async fn group_by_slug(
		&self,
		slug: &str,
	) -> Result<Option<Group>, ServiceError> {
		let group = sqlx::query_as::<_, Group>("SELECT id, title, slug, description FROM post_groups WHERE slug = $1")
			.bind(slug)
			.fetch_optional(&self.pool)
			.await?;
		Ok(group)
	}

	async fn group_by_id(
		&self,
		id: i64,
	) -> Result<Option<Group>, ServiceError> {
		let group = sqlx::query_as::<_, Group>("SELECT id, title, slug, description FROM post_groups WHERE id = $1")
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;
		Ok(group)
	}

	async fn insert_post(
		&self,
		author_id: i64,
		post: &CleanPost,
	) -> Result<Post, ServiceError> {
		let id: i64 = sqlx::query_scalar(
			r#"
			INSERT INTO posts (text, author_id, group_id, image)
			VALUES ($1, $2, $3, $4)
			RETURNING id
			"#,
		)
		.bind(&post.text)
		.bind(author_id)
		.bind(post.group_id)
		.bind(&post.image)
		.fetch_one(&self.pool)
		.await?;

		self.post_or_missing(id).await
	}

	async fn update_post(
		&self,
		id: i64,
		post: &CleanPost,
	) -> Result<Post, ServiceError> {
		let affected = sqlx::query("UPDATE posts SET text = $2, group_id = $3, image = $4 WHERE id = $1")
			.bind(id)
			.bind(&post.text)
			.bind(post.group_id)
			.bind(&post.image)
			.execute(&self.pool)
			.await?
			.rows_affected();
		if affected == 0 {
			return Err(ServiceError::NotFound(format!("post {}", id)));
		}

		self.post_or_missing(id).await
	}

	async fn post_by_id(
		&self,
		id: i64,
	) -> Result<Option<Post>, ServiceError> {
		let mut builder = QueryBuilder::<Postgres>::new(SELECT_POSTS);
		builder.push(" WHERE p.id = ").push_bind(id);
		let post = builder.build_query_as::<Post>().fetch_optional(&self.pool).await?;
		Ok(post)
	}

	async fn count_posts(
		&self,
		filter: PostFilter,
	) -> Result<usize, ServiceError> {
		let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts p");
		Self::push_filter(&mut builder, filter);
		let count: i64 = builder.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
		Ok(count.max(0) as usize)
	}

	async fn list_posts(
		&self,
		filter: PostFilter,
		offset: usize,
		limit: usize,
	) -> Result<Vec<Post>, ServiceError> {
		let mut builder = QueryBuilder::<Postgres>::new(SELECT_POSTS);
		Self::push_filter(&mut builder, filter);
		builder
			.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
			.push_bind(limit as i64)
			.push(" OFFSET ")
			.push_bind(offset as i64);

		let posts = builder.build_query_as::<Post>().fetch_all(&self.pool).await?;
		Ok(posts)
	}

	async fn insert_comment(
		&self,
		post_id: i64,
		author_id: i64,
		text: &str,
	) -> Result<Comment, ServiceError> {
		let comment = sqlx::query_as::<_, Comment>(
			r#"
			WITH c AS (
				INSERT INTO comments (post_id, author_id, text)
				VALUES ($1, $2, $3)
				RETURNING id, post_id, author_id, text, created_at
			)
			SELECT c.id, c.post_id, c.author_id, u.username AS author, c.text, c.created_at
			FROM c
			JOIN users u ON u.id = c.author_id
			"#,
		)
		.bind(post_id)
		.bind(author_id)
		.bind(text)
		.fetch_one(&self.pool)
		.await?;
		Ok(comment)
	}

	async fn comments_for_post(
		&self,
		post_id: i64,
	) -> Result<Vec<Comment>, ServiceError> {
		let mut builder = QueryBuilder::<Postgres>::new(SELECT_COMMENTS);
		builder.push(" WHERE c.post_id = ").push_bind(post_id).push(" ORDER BY c.created_at, c.id");
		let comments = builder.build_query_as::<Comment>().fetch_all(&self.pool).await?;
		Ok(comments)
	}

	async fn insert_follow(
		&self,
		user_id: i64,
		author_id: i64,
	) -> Result<bool, ServiceError> {
		let inserted = sqlx::query_scalar::<_, i64>(
			r#"
			INSERT INTO follows (user_id, author_id)
			VALUES ($1, $2)
			ON CONFLICT (user_id, author_id) DO NOTHING
			RETURNING id
			"#,
		)
		.bind(user_id)
		.bind(author_id)
		.fetch_optional(&self.pool)
		.await?;

		Ok(inserted.is_some())
	}

	async fn delete_follow(
		&self,
		user_id: i64,
		author_id: i64,
	) -> Result<bool, ServiceError> {
		let affected = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
			.bind(user_id)
			.bind(author_id)
			.execute(&self.pool)
			.await?
			.rows_affected();
		Ok(affected > 0)
	}

	async fn follow_exists(
		&self,
		user_id: i64,
		author_id: i64,
	) -> Result<bool, ServiceError> {
		let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)")
			.bind(user_id)
			.bind(author_id)
			.fetch_one(&self.pool)
			.await?;
		Ok(exists)
	}
}
