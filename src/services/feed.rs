use std::sync::Arc;

use crate::{
	adapters::repositories::Repository,
	domain::{
		feed::{PostFilter, Scope},
		post::{Group, Post},
		user::User,
	},
	services::{
		paginator::{Page, Paginator},
		response::ServiceError,
	},
};

/// The group or author a scoped feed was resolved to.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FeedSubject {
	Everyone,
	Group(Group),
	Author(User),
	FollowedBy(User),
}

/// An ordered, lazily read post sequence bound to a store.
#[derive(Clone)]
pub struct Feed {
	repository: Arc<dyn Repository>,
	filter: PostFilter,
	subject: FeedSubject,
}

impl Feed {
	pub fn filter(&self) -> PostFilter {
		self.filter
	}

	pub fn subject(&self) -> &FeedSubject {
		&self.subject
	}

	pub fn group(&self) -> Option<&Group> {
		match &self.subject {
			FeedSubject::Group(group) => Some(group),
			_ => None,
		}
	}

	pub fn author(&self) -> Option<&User> {
		match &self.subject {
			FeedSubject::Author(author) => Some(author),
			_ => None,
		}
	}

	pub async fn count(&self) -> Result<usize, ServiceError> {
		self.repository.count_posts(self.filter).await
	}

	pub async fn slice(
		&self,
		offset: usize,
		limit: usize,
	) -> Result<Vec<Post>, ServiceError> {
		if limit == 0 {
			return Ok(Vec::new());
		}
		self.repository.list_posts(self.filter, offset, limit).await
	}

	/// The whole sequence, newest first.
	pub async fn posts(&self) -> Result<Vec<Post>, ServiceError> {
		let count = self.count().await?;
		self.slice(0, count).await
	}

	pub async fn page(
		&self,
		paginator: &Paginator,
		number: usize,
	) -> Result<Page<Post>, ServiceError> {
		let window = paginator.window(self.count().await?, number);
		let items = self.slice(window.offset, window.limit).await?;
		Ok(Page::new(items, window))
	}
}

pub(crate) async fn user_by_username(
	repository: &Arc<dyn Repository>,
	username: &str,
) -> Result<User, ServiceError> {
	repository
		.user_by_username(username)
		.await?
		.ok_or_else(|| ServiceError::NotFound(format!("user `{}`", username)))
}

pub struct FeedSelector;
impl FeedSelector {
	pub async fn select(
		repository: &Arc<dyn Repository>,
		scope: &Scope,
		viewer: Option<&User>,
	) -> Result<Feed, ServiceError> {
		let (filter, subject) = match scope {
			Scope::All => (PostFilter::All, FeedSubject::Everyone),
			Scope::Group(slug) => {
				let group = repository
					.group_by_slug(slug)
					.await?
					.ok_or_else(|| ServiceError::NotFound(format!("group `{}`", slug)))?;
				(PostFilter::Group(group.id), FeedSubject::Group(group))
			}
			Scope::Author(username) => {
				let author = user_by_username(repository, username).await?;
				(PostFilter::Author(author.id), FeedSubject::Author(author))
			}
			Scope::Followed => {
				let viewer = viewer.ok_or(ServiceError::Unauthorized)?;
				(PostFilter::FollowedBy(viewer.id), FeedSubject::FollowedBy(viewer.clone()))
			}
		};

		Ok(Feed {
			repository: repository.clone(),
			filter,
			subject,
		})
	}
}
