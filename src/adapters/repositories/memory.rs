use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::Repository;
use crate::{
	domain::{
		feed::PostFilter,
		post::{CleanPost, Comment, Group, NewGroup, Post},
		user::{Follow, User},
	},
	services::response::ServiceError,
};

struct UserRecord {
	user: User,
	password_hash: String,
}

struct PostRecord {
	id: i64,
	text: String,
	created_at: DateTime<Utc>,
	author_id: i64,
	group_id: Option<i64>,
	image: Option<String>,
}

struct SessionRecord {
	user_id: i64,
	created_at: DateTime<Utc>,
}

struct CommentRecord {
	id: i64,
	post_id: i64,
	author_id: i64,
	text: String,
	created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
	users: Vec<UserRecord>,
	sessions: HashMap<String, SessionRecord>,
	groups: Vec<Group>,
	posts: Vec<PostRecord>,
	comments: Vec<CommentRecord>,
	follows: BTreeSet<Follow>,
}

impl Tables {
	fn username(
		&self,
		user_id: i64,
	) -> String {
		self.users
			.iter()
			.find(|record| record.user.id == user_id)
			.map(|record| record.user.username.clone())
			.unwrap_or_default()
	}

	fn hydrate(
		&self,
		record: &PostRecord,
	) -> Post {
		Post {
			id: record.id,
			text: record.text.clone(),
			created_at: record.created_at,
			author_id: record.author_id,
			author: self.username(record.author_id),
			group_id: record.group_id,
			group_slug: record
				.group_id
				.and_then(|id| self.groups.iter().find(|group| group.id == id))
				.map(|group| group.slug.clone()),
			image: record.image.clone(),
		}
	}

	fn matches(
		&self,
		record: &PostRecord,
		filter: PostFilter,
	) -> bool {
		match filter {
			PostFilter::All => true,
			PostFilter::Group(group_id) => record.group_id == Some(group_id),
			PostFilter::Author(author_id) => record.author_id == author_id,
			PostFilter::FollowedBy(user_id) => self.follows.contains(&Follow {
				user_id,
				author_id: record.author_id,
			}),
		}
	}

	/// Newest first, higher id first on equal timestamps.
	fn feed(
		&self,
		filter: PostFilter,
	) -> Vec<&PostRecord> {
		let mut records: Vec<&PostRecord> = self.posts.iter().filter(|record| self.matches(record, filter)).collect();
		records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
		records
	}
}

/// Process-local store. Every method takes the table lock once, so each call is atomic.
#[derive(Default)]
pub struct InMemoryRepository {
	tables: RwLock<Tables>,
}

impl InMemoryRepository {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl Repository for InMemoryRepository {
	async fn create_user(
		&self,
		username: &str,
		password_hash: &str,
	) -> Result<Option<User>, ServiceError> {
		let mut tables = self.tables.write().await;
		if tables.users.iter().any(|record| record.user.username == username) {
			return Ok(None);
		}
		let user = User {
			id: tables.users.len() as i64 + 1,
			username: username.to_string(),
			created_at: Utc::now(),
		};
		tables.users.push(UserRecord {
			user: user.clone(),
			password_hash: password_hash.to_string(),
		});
		Ok(Some(user))
	}

	async fn user_by_username(
		&self,
		username: &str,
	) -> Result<Option<User>, ServiceError> {
		let tables = self.tables.read().await;
		Ok(tables.users.iter().find(|record| record.user.username == username).map(|record| record.user.clone()))
	}

	async fn password_hash(
		&self,
		username: &str,
	) -> Result<Option<(User, String)>, ServiceError> {
		let tables = self.tables.read().await;
		Ok(tables
			.users
			.iter()
			.find(|record| record.user.username == username)
			.map(|record| (record.user.clone(), record.password_hash.clone())))
	}

	async fn create_session(
		&self,
		token: &str,
		user_id: i64,
	) -> Result<(), ServiceError> {
		self.tables.write().await.sessions.insert(
			token.to_string(),
			SessionRecord {
				user_id,
				created_at: Utc::now(),
			},
		);
		Ok(())
	}

	async fn session_user(
		&self,
		token: &str,
		issued_after: DateTime<Utc>,
	) -> Result<Option<User>, ServiceError> {
		let tables = self.tables.read().await;
		let Some(session) = tables.sessions.get(token).filter(|session| session.created_at > issued_after) else {
			return Ok(None);
		};
		Ok(tables.users.iter().find(|record| record.user.id == session.user_id).map(|record| record.user.clone()))
	}

	async fn delete_session(
		&self,
		token: &str,
	) -> Result<(), ServiceError> {
		self.tables.write().await.sessions.remove(token);
		Ok(())
	}

	async fn delete_sessions_before(
		&self,
		issued_before: DateTime<Utc>,
	) -> Result<u64, ServiceError> {
		let mut tables = self.tables.write().await;
		let before = tables.sessions.len();
		tables.sessions.retain(|_, session| session.created_at > issued_before);
		Ok((before - tables.sessions.len()) as u64)
	}

	async fn create_group(
		&self,
		group: NewGroup,
	) -> Result<Group, ServiceError> {
		let mut tables = self.tables.write().await;
		let group = Group {
			id: tables.groups.len() as i64 + 1,
			title: group.title,
			slug: group.slug,
			description: group.description,
		};
		tables.groups.push(group.clone());
		Ok(group)
	}

	async fn group_by_slug(
		&self,
		slug: &str,
	) -> Result<Option<Group>, ServiceError> {
		let tables = self.tables.read().await;
		Ok(tables.groups.iter().find(|group| group.slug == slug).cloned())
	}

	async fn group_by_id(
		&self,
		id: i64,
	) -> Result<Option<Group>, ServiceError> {
		let tables = self.tables.read().await;
		Ok(tables.groups.iter().find(|group| group.id == id).cloned())
	}

	async fn insert_post(
		&self,
		author_id: i64,
		post: &CleanPost,
	) -> Result<Post, ServiceError> {
		let mut tables = self.tables.write().await;
		let record = PostRecord {
			id: tables.posts.len() as i64 + 1,
			text: post.text.clone(),
			created_at: Utc::now(),
			author_id,
			group_id: post.group_id,
			image: post.image.clone(),
		};
		let post = tables.hydrate(&record);
		tables.posts.push(record);
		Ok(post)
	}

	async fn update_post(
		&self,
		id: i64,
		post: &CleanPost,
	) -> Result<Post, ServiceError> {
		let mut tables = self.tables.write().await;
		let Some(record) = tables.posts.iter_mut().find(|record| record.id == id) else {
			return Err(ServiceError::NotFound(format!("post {}", id)));
		};
		record.text = post.text.clone();
		record.group_id = post.group_id;
		record.image = post.image.clone();

		let tables = &*tables;
		let record = tables.posts.iter().find(|record| record.id == id);
		record.map(|record| tables.hydrate(record)).ok_or_else(|| ServiceError::NotFound(format!("post {}", id)))
	}

	async fn post_by_id(
		&self,
		id: i64,
	) -> Result<Option<Post>, ServiceError> {
		let tables = self.tables.read().await;
		Ok(tables.posts.iter().find(|record| record.id == id).map(|record| tables.hydrate(record)))
	}

	async fn count_posts(
		&self,
		filter: PostFilter,
	) -> Result<usize, ServiceError> {
		let tables = self.tables.read().await;
		Ok(tables.posts.iter().filter(|record| tables.matches(record, filter)).count())
	}

	async fn list_posts(
		&self,
		filter: PostFilter,
		offset: usize,
		limit: usize,
	) -> Result<Vec<Post>, ServiceError> {
		let tables = self.tables.read().await;
		Ok(tables.feed(filter).into_iter().skip(offset).take(limit).map(|record| tables.hydrate(record)).collect())
	}

	async fn insert_comment(
		&self,
		post_id: i64,
		author_id: i64,
		text: &str,
	) -> Result<Comment, ServiceError> {
		let mut tables = self.tables.write().await;
		if !tables.posts.iter().any(|record| record.id == post_id) {
			return Err(ServiceError::NotFound(format!("post {}", post_id)));
		}
		let record = CommentRecord {
			id: tables.comments.len() as i64 + 1,
			post_id,
			author_id,
			text: text.to_string(),
			created_at: Utc::now(),
		};
		let comment = Comment {
			id: record.id,
			post_id,
			author_id,
			author: tables.username(author_id),
			text: record.text.clone(),
			created_at: record.created_at,
		};
		tables.comments.push(record);
		Ok(comment)
	}

	async fn comments_for_post(
		&self,
		post_id: i64,
	) -> Result<Vec<Comment>, ServiceError> {
		let tables = self.tables.read().await;
		let mut comments: Vec<Comment> = tables
			.comments
			.iter()
			.filter(|record| record.post_id == post_id)
			.map(|record| Comment {
				id: record.id,
				post_id: record.post_id,
				author_id: record.author_id,
				author: tables.username(record.author_id),
				text: record.text.clone(),
				created_at: record.created_at,
			})
			.collect();
		comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
		Ok(comments)
	}

	async fn insert_follow(
		&self,
		user_id: i64,
		author_id: i64,
	) -> Result<bool, ServiceError> {
		if user_id == author_id {
			return Ok(false);
		}
		Ok(self.tables.write().await.follows.insert(Follow { user_id, author_id }))
	}

	async fn delete_follow(
		&self,
		user_id: i64,
		author_id: i64,
	) -> Result<bool, ServiceError> {
		Ok(self.tables.write().await.follows.remove(&Follow { user_id, author_id }))
	}

	async fn follow_exists(
		&self,
		user_id: i64,
		author_id: i64,
	) -> Result<bool, ServiceError> {
		Ok(self.tables.read().await.follows.contains(&Follow { user_id, author_id }))
	}
}
