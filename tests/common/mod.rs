#![allow(dead_code)]

use std::time::Duration;

use axum::{
	body::{to_bytes, Body},
	http::{header, Method, Request},
	response::Response,
	Router,
};
use serde_json::Value;
use tower::ServiceExt;
use yatube::{
	create_routes,
	domain::{
		post::{CleanPost, Group, NewGroup, Post},
		user::User,
	},
	AppState,
};

pub const AUTHOR_TOKEN: &str = "author-token";
pub const USER_TOKEN: &str = "user-token";

/// An app over a fresh in-memory store with an author, a second user, one group and one post.
pub struct TestApp {
	pub state: AppState,
	pub author: User,
	pub user: User,
	pub group: Group,
	pub post: Post,
}

impl TestApp {
	pub async fn new() -> Self {
		Self::with_cache_ttl(Duration::from_secs(20)).await
	}

	pub async fn with_cache_ttl(ttl: Duration) -> Self {
		let state = AppState::in_memory(10, ttl);
		let repository = &state.repository;

		let author = repository.create_user("author", "unusable").await.unwrap().unwrap();
		let user = repository.create_user("user", "unusable").await.unwrap().unwrap();
		repository.create_session(AUTHOR_TOKEN, author.id).await.unwrap();
		repository.create_session(USER_TOKEN, user.id).await.unwrap();

		let group = repository
			.create_group(NewGroup {
				title: "Test group".to_string(),
				slug: "group_slug".to_string(),
				description: "Test description".to_string(),
			})
			.await
			.unwrap();

		let post = repository
			.insert_post(
				author.id,
				&CleanPost {
					text: "Test post".to_string(),
					group_id: Some(group.id),
					image: None,
				},
			)
			.await
			.unwrap();

		Self {
			state,
			author,
			user,
			group,
			post,
		}
	}

	pub fn router(&self) -> Router {
		create_routes(self.state.clone())
	}

	/// Writes straight to the store, bypassing the page cache hooks.
	pub async fn insert_post(
		&self,
		author: &User,
		text: &str,
		group_id: Option<i64>,
		image: Option<&str>,
	) -> Post {
		self.state
			.repository
			.insert_post(
				author.id,
				&CleanPost {
					text: text.to_string(),
					group_id,
					image: image.map(str::to_string),
				},
			)
			.await
			.unwrap()
	}

	pub async fn create_group(
		&self,
		slug: &str,
	) -> Group {
		self.state
			.repository
			.create_group(NewGroup {
				title: format!("Group {}", slug),
				slug: slug.to_string(),
				description: String::new(),
			})
			.await
			.unwrap()
	}

	pub async fn post_count(&self) -> usize {
		self.state.repository.count_posts(yatube::domain::feed::PostFilter::All).await.unwrap()
	}

	pub async fn send(
		&self,
		method: Method,
		uri: &str,
		token: Option<&str>,
		body: Option<Value>,
	) -> Response {
		let mut builder = Request::builder().method(method).uri(uri);
		if let Some(token) = token {
			builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
		}
		let request = match body {
			Some(body) => builder
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from(serde_json::to_vec(&body).unwrap()))
				.unwrap(),
			None => builder.body(Body::empty()).unwrap(),
		};
		self.router().oneshot(request).await.unwrap()
	}

	pub async fn get(
		&self,
		uri: &str,
		token: Option<&str>,
	) -> Response {
		self.send(Method::GET, uri, token, None).await
	}

	pub async fn post_json(
		&self,
		uri: &str,
		token: Option<&str>,
		body: Value,
	) -> Response {
		self.send(Method::POST, uri, token, Some(body)).await
	}

	pub async fn get_json(
		&self,
		uri: &str,
		token: Option<&str>,
	) -> Value {
		let response = self.get(uri, token).await;
		assert!(response.status().is_success(), "GET {} returned {}", uri, response.status());
		json(response).await
	}
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
	to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn json(response: Response) -> Value {
	serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn location(response: &Response) -> &str {
	response.headers()[header::LOCATION].to_str().unwrap()
}

pub fn item_ids(page: &Value) -> Vec<i64> {
	page["page_obj"]["items"].as_array().unwrap().iter().map(|item| item["id"].as_i64().unwrap()).collect()
}
