use reqwest::StatusCode;
use serde_json::{json, Value};

use super::TestServer;
use crate::database::User;
use crate::global::ApiState;
use crate::tests::global::{create_token, create_user};

struct Fixture {
	server: TestServer,
	kevin: User,
	tom: User,
	token: String,
}

async fn setup() -> Fixture {
	let server = TestServer::start().await;

	let kevin = create_user(&server.global, "Kevin", None).await;
	let tom = create_user(&server.global, "Tom", None).await;
	create_user(&server.global, "Bob", None).await;

	server
		.global
		.store()
		.insert_follow(kevin.id, tom.id)
		.await
		.expect("failed to insert follow");

	let token = create_token(&server.global, &kevin).await;

	Fixture {
		server,
		kevin,
		tom,
		token,
	}
}

impl Fixture {
	async fn send(&self, method: reqwest::Method, username: &str) -> reqwest::Response {
		self.server
			.client
			.request(method, self.server.url(&format!("/v1/follow/{username}/")))
			.bearer_auth(&self.token)
			.send()
			.await
			.expect("failed to send request")
	}

	async fn follows(&self) -> i64 {
		self.server.global.store().count_follows().await.unwrap()
	}
}

#[tokio::test]
async fn test_data_exists() {
	let fixture = setup().await;

	assert_eq!(fixture.server.global.store().count_users().await.unwrap(), 3);
	assert_eq!(fixture.follows().await, 1);

	fixture.server.shutdown().await;
}

#[tokio::test]
async fn test_new_follow() {
	let fixture = setup().await;

	let resp = fixture.send(reqwest::Method::POST, "Bob").await;
	assert_eq!(resp.status(), StatusCode::CREATED);
	assert_eq!(
		resp.json::<Value>().await.unwrap(),
		json!({ "follower": "Kevin", "follows": "Bob", "created": true })
	);

	let bob = fixture.server.global.store().user_by_username("Bob").await.unwrap().unwrap();
	assert!(fixture.server.global.store().is_following(fixture.kevin.id, bob.id).await.unwrap());
	assert_eq!(fixture.follows().await, 2);

	fixture.server.shutdown().await;
}

#[tokio::test]
async fn test_follow_duplicate() {
	let fixture = setup().await;

	for _ in 0..2 {
		let resp = fixture.send(reqwest::Method::POST, "Tom").await;
		assert_eq!(resp.status(), StatusCode::CREATED);
		assert_eq!(resp.json::<Value>().await.unwrap()["created"], false);
		assert_eq!(fixture.follows().await, 1);
	}

	fixture.server.shutdown().await;
}

#[tokio::test]
async fn test_unfollow() {
	let fixture = setup().await;

	let resp = fixture.send(reqwest::Method::DELETE, "Tom").await;
	assert_eq!(resp.status(), StatusCode::NO_CONTENT);
	assert!(resp.bytes().await.unwrap().is_empty());
	assert_eq!(fixture.follows().await, 0);
	assert!(!fixture
		.server
		.global
		.store()
		.is_following(fixture.kevin.id, fixture.tom.id)
		.await
		.unwrap());

	fixture.server.shutdown().await;
}

#[tokio::test]
async fn test_follow_yourself() {
	let fixture = setup().await;

	let resp = fixture.send(reqwest::Method::POST, "Kevin").await;
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

	let body = resp.json::<Value>().await.unwrap();
	assert_eq!(body["error"], "self_follow");
	assert_eq!(body["success"], false);
	assert_eq!(fixture.follows().await, 1);

	fixture.server.shutdown().await;
}

#[tokio::test]
async fn test_unfollow_not_following() {
	let fixture = setup().await;

	let resp = fixture.send(reqwest::Method::DELETE, "Kevin").await;
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	assert_eq!(resp.json::<Value>().await.unwrap()["error"], "not_following");

	let resp = fixture.send(reqwest::Method::DELETE, "Bob").await;
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	assert_eq!(resp.json::<Value>().await.unwrap()["error"], "not_following");

	assert_eq!(fixture.follows().await, 1);

	fixture.server.shutdown().await;
}

#[tokio::test]
async fn test_follow_unknown_user() {
	let fixture = setup().await;

	let resp = fixture.send(reqwest::Method::DELETE, "abracadabra").await;
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	assert_eq!(resp.json::<Value>().await.unwrap()["error"], "invalid_target");

	let resp = fixture.send(reqwest::Method::POST, "abracadabra").await;
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	assert_eq!(resp.json::<Value>().await.unwrap()["error"], "invalid_target");

	assert_eq!(fixture.follows().await, 1);

	fixture.server.shutdown().await;
}

#[tokio::test]
async fn test_follow_requires_auth() {
	let fixture = setup().await;

	let resp = fixture
		.server
		.client
		.post(fixture.server.url("/v1/follow/Bob/"))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
	assert!(resp.headers().get("x-auth-token-check-status").is_none());

	let resp = fixture
		.server
		.client
		.delete(fixture.server.url("/v1/follow/Tom/"))
		.bearer_auth("not-a-token")
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(resp.headers()["x-auth-token-check-status"], "failed");

	assert_eq!(fixture.follows().await, 1);

	fixture.server.shutdown().await;
}
