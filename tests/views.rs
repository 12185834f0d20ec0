mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_bytes, item_ids, location, TestApp, AUTHOR_TOKEN, USER_TOKEN};
use serde_json::json;

const FEED_PAGES: [&str; 3] = ["/", "/group/group_slug/", "/profile/author/"];

#[tokio::test]
async fn test_first_page_holds_ten_posts_and_second_the_rest() {
	let app = TestApp::new().await;
	for i in 0..10 {
		app.insert_post(&app.author, &format!("Post {}", i), Some(app.group.id), None).await;
	}

	for uri in FEED_PAGES {
		let first = app.get_json(uri, None).await;
		assert_eq!(first["page_obj"]["items"].as_array().unwrap().len(), 10, "{}", uri);
		assert_eq!(first["page_obj"]["count"], 11);
		assert_eq!(first["page_obj"]["has_next"], true);

		let second = app.get_json(&format!("{}?page=2", uri), None).await;
		assert_eq!(second["page_obj"]["items"].as_array().unwrap().len(), 1, "{}", uri);
		assert_eq!(second["page_obj"]["has_previous"], true);
		assert_eq!(second["page_obj"]["has_next"], false);
	}
}

#[tokio::test]
async fn test_page_number_out_of_range_or_invalid() {
	let app = TestApp::new().await;
	for i in 0..10 {
		app.insert_post(&app.author, &format!("Post {}", i), None, None).await;
	}

	let beyond = app.get_json("/profile/author/?page=99", None).await;
	assert_eq!(beyond["page_obj"]["number"], 2);
	assert_eq!(beyond["page_obj"]["items"].as_array().unwrap().len(), 1);

	let overflowing = app.get_json("/profile/author/?page=100000000000000000000000", None).await;
	assert_eq!(overflowing["page_obj"]["number"], 2);

	for raw in ["abc", "0", "-3"] {
		let page = app.get_json(&format!("/profile/author/?page={}", raw), None).await;
		assert_eq!(page["page_obj"]["number"], 1, "{}", raw);
	}
}

#[tokio::test]
async fn test_feeds_are_newest_first() {
	let app = TestApp::new().await;
	let newer = app.insert_post(&app.author, "Newer post", Some(app.group.id), None).await;

	for uri in FEED_PAGES {
		let page = app.get_json(uri, None).await;
		assert_eq!(item_ids(&page), vec![newer.id, app.post.id], "{}", uri);
	}
}

#[tokio::test]
async fn test_post_with_group_shows_in_its_feeds_only() {
	let app = TestApp::new().await;
	let other = app.create_group("other_slug").await;

	'_given: {
		let response = app
			.post_json("/create/", Some(AUTHOR_TOKEN), json!({ "text": "Grouped post", "group": app.group.id }))
			.await;
		assert_eq!(response.status(), StatusCode::FOUND);

		'_then: {
			for uri in FEED_PAGES {
				let page = app.get_json(uri, None).await;
				assert_eq!(page["page_obj"]["items"][0]["text"], "Grouped post", "{}", uri);
			}

			let other_page = app.get_json(&format!("/group/{}/", other.slug), None).await;
			assert!(other_page["page_obj"]["items"].as_array().unwrap().is_empty());
			assert_eq!(other_page["group"]["slug"], "other_slug");
		}
	}
}

#[tokio::test]
async fn test_image_is_passed_to_every_view() {
	let app = TestApp::new().await;
	let post = app.insert_post(&app.author, "With image", Some(app.group.id), Some("posts/small.gif")).await;

	for uri in FEED_PAGES {
		let page = app.get_json(uri, None).await;
		assert_eq!(page["page_obj"]["items"][0]["image"], "posts/small.gif", "{}", uri);
	}

	let detail = app.get_json(&format!("/posts/{}/", post.id), None).await;
	assert_eq!(detail["post"]["image"], "posts/small.gif");
}

#[tokio::test]
async fn test_group_page_context() {
	let app = TestApp::new().await;

	let page = app.get_json("/group/group_slug/", None).await;

	assert_eq!(page["group"]["title"], "Test group");
	assert_eq!(page["group"]["description"], "Test description");
	assert_eq!(page["page_obj"]["items"][0]["group_slug"], "group_slug");
}

#[tokio::test]
async fn test_profile_context() {
	let app = TestApp::new().await;
	app.insert_post(&app.author, "Second", None, None).await;
	app.insert_post(&app.user, "Not counted", None, None).await;

	let page = app.get_json("/profile/author/", None).await;

	assert_eq!(page["author"]["username"], "author");
	assert_eq!(page["post_num"], 2);
	assert_eq!(page["following"], false);
	assert_eq!(page["page_obj"]["items"][0]["author"], "author");
}

#[tokio::test]
async fn test_post_detail_context() {
	let app = TestApp::new().await;
	app.insert_post(&app.author, "Second", None, None).await;

	let detail = app.get_json(&format!("/posts/{}/", app.post.id), None).await;

	assert_eq!(detail["post"]["id"], app.post.id);
	assert_eq!(detail["post"]["text"], "Test post");
	assert_eq!(detail["post_num"], 2);
	assert!(detail["comments"].as_array().unwrap().is_empty());
	assert_eq!(detail["form"]["text"], "");
}

#[tokio::test]
async fn test_index_is_cached_until_invalidated() {
	let app = TestApp::new().await;
	let before = body_bytes(app.get("/", None).await).await;

	'_given: {
		app.insert_post(&app.author, "Behind the cache", None, None).await;

		'_when: {
			let cached = body_bytes(app.get("/", None).await).await;

			'_then: {
				assert_eq!(cached, before);
			}
		}
	}

	'_given: {
		app.state.cache.invalidate_all().await;

		'_when: {
			let fresh = body_bytes(app.get("/", None).await).await;

			'_then: {
				assert_ne!(fresh, before);
				let page: serde_json::Value = serde_json::from_slice(&fresh).unwrap();
				assert_eq!(page["page_obj"]["items"][0]["text"], "Behind the cache");
			}
		}
	}
}

#[tokio::test]
async fn test_index_cache_expires() {
	let app = TestApp::with_cache_ttl(Duration::from_millis(500)).await;
	let before = body_bytes(app.get("/", None).await).await;
	app.insert_post(&app.author, "Behind the cache", None, None).await;

	assert_eq!(body_bytes(app.get("/", None).await).await, before);

	tokio::time::sleep(Duration::from_millis(1_000)).await;
	assert_ne!(body_bytes(app.get("/", None).await).await, before);
}

#[tokio::test]
async fn test_writes_through_views_refresh_index() {
	let app = TestApp::new().await;
	app.get("/", None).await;

	app.post_json("/create/", Some(AUTHOR_TOKEN), json!({ "text": "Fresh post" })).await;
	let page = app.get_json("/", None).await;
	assert_eq!(page["page_obj"]["items"][0]["text"], "Fresh post");

	let fresh_id = page["page_obj"]["items"][0]["id"].as_i64().unwrap();
	app.post_json(&format!("/posts/{}/edit/", fresh_id), Some(AUTHOR_TOKEN), json!({ "text": "Edited post" }))
		.await;
	let page = app.get_json("/", None).await;
	assert_eq!(page["page_obj"]["items"][0]["text"], "Edited post");
}

#[tokio::test]
async fn test_cache_disabled_with_zero_ttl() {
	let app = TestApp::with_cache_ttl(Duration::ZERO).await;
	app.get("/", None).await;
	app.insert_post(&app.author, "Visible at once", None, None).await;

	let page = app.get_json("/", None).await;
	assert_eq!(page["page_obj"]["items"][0]["text"], "Visible at once");
}

#[tokio::test]
async fn test_follow_and_unfollow() {
	let app = TestApp::new().await;

	'_given: {
		let follow = app.get("/profile/author/follow/", Some(USER_TOKEN)).await;
		assert_eq!(follow.status(), StatusCode::FOUND);
		assert_eq!(location(&follow), "/follow/");

		'_then: {
			let feed = app.get_json("/follow/", Some(USER_TOKEN)).await;
			assert_eq!(item_ids(&feed), vec![app.post.id]);

			let profile = app.get_json("/profile/author/", Some(USER_TOKEN)).await;
			assert_eq!(profile["following"], true);
		}
	}

	'_given: {
		let unfollow = app.get("/profile/author/unfollow/", Some(USER_TOKEN)).await;
		assert_eq!(location(&unfollow), "/follow/");

		'_then: {
			let feed = app.get_json("/follow/", Some(USER_TOKEN)).await;
			assert!(item_ids(&feed).is_empty());

			let profile = app.get_json("/profile/author/", Some(USER_TOKEN)).await;
			assert_eq!(profile["following"], false);
		}
	}
}

#[tokio::test]
async fn test_follow_twice_keeps_one_relation() {
	let app = TestApp::new().await;

	app.get("/profile/author/follow/", Some(USER_TOKEN)).await;
	app.get("/profile/author/follow/", Some(USER_TOKEN)).await;
	let feed = app.get_json("/follow/", Some(USER_TOKEN)).await;
	assert_eq!(item_ids(&feed), vec![app.post.id]);

	app.get("/profile/author/unfollow/", Some(USER_TOKEN)).await;
	let response = app.get("/profile/author/unfollow/", Some(USER_TOKEN)).await;
	assert_eq!(response.status(), StatusCode::FOUND);
	assert!(item_ids(&app.get_json("/follow/", Some(USER_TOKEN)).await).is_empty());
}

#[tokio::test]
async fn test_new_post_shows_only_for_followers() {
	let app = TestApp::new().await;
	app.get("/profile/author/follow/", Some(USER_TOKEN)).await;

	let post = app.insert_post(&app.author, "For followers", None, None).await;

	let follower_feed = app.get_json("/follow/", Some(USER_TOKEN)).await;
	assert_eq!(item_ids(&follower_feed)[0], post.id);

	let author_feed = app.get_json("/follow/", Some(AUTHOR_TOKEN)).await;
	assert!(item_ids(&author_feed).is_empty());
}

#[tokio::test]
async fn test_self_follow_is_ignored() {
	let app = TestApp::new().await;

	let response = app.get("/profile/author/follow/", Some(AUTHOR_TOKEN)).await;

	assert_eq!(response.status(), StatusCode::FOUND);
	assert!(item_ids(&app.get_json("/follow/", Some(AUTHOR_TOKEN)).await).is_empty());
	assert_eq!(app.get_json("/profile/author/", Some(AUTHOR_TOKEN)).await["following"], false);
}

#[tokio::test]
async fn test_follow_unknown_author_is_not_found() {
	let app = TestApp::new().await;

	let response = app.get("/profile/nobody/follow/", Some(USER_TOKEN)).await;

	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
