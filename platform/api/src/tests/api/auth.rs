use chrono::{Duration, Utc};
use common::global::GlobalConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::TestServer;
use crate::api::jwt::{AuthJwtPayload, JwtState};
use crate::config::{AppConfig, JwtConfig};
use crate::database::Ulid;
use crate::global::ApiState;
use crate::tests::global::{create_token, create_user};

async fn login(server: &TestServer, username: &str, password: &str) -> reqwest::Response {
	server
		.client
		.post(server.url("/v1/auth/login"))
		.json(&json!({ "username": username, "password": password }))
		.send()
		.await
		.expect("failed to send request")
}

#[tokio::test]
async fn test_login_and_follow() {
	let server = TestServer::start().await;

	create_user(&server.global, "kevin", Some("hunter2")).await;
	create_user(&server.global, "tom", None).await;

	let resp = login(&server, "kevin", "hunter2").await;
	assert_eq!(resp.status(), StatusCode::OK);

	let body = resp.json::<Value>().await.unwrap();
	let token = body["token"].as_str().expect("missing token").to_string();
	assert!(body["session_id"].is_string());
	assert!(body["expires_at"].is_string());

	let resp = server
		.client
		.post(server.url("/v1/follow/tom/"))
		.bearer_auth(&token)
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::CREATED);
	assert!(resp.headers().get("x-auth-token-check-status").is_none());

	server.shutdown().await;
}

#[tokio::test]
async fn test_login_invalid_credentials() {
	let server = TestServer::start().await;

	create_user(&server.global, "kevin", Some("hunter2")).await;
	create_user(&server.global, "nopassword", None).await;

	for (username, password) in [("kevin", "wrong"), ("nobody", "hunter2"), ("nopassword", "")] {
		let resp = login(&server, username, password).await;
		assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(
			resp.json::<Value>().await.unwrap(),
			json!({ "message": "invalid username or password", "success": false })
		);
	}

	let resp = server
		.client
		.post(server.url("/v1/auth/login"))
		.body("not json")
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

	server.shutdown().await;
}

#[tokio::test]
async fn test_login_session_ttl_out_of_range() {
	let server = TestServer::start_with(AppConfig {
		jwt: JwtConfig {
			session_ttl_secs: u64::MAX / 2,
			..Default::default()
		},
		..Default::default()
	})
	.await;

	create_user(&server.global, "kevin", Some("hunter2")).await;

	let resp = login(&server, "kevin", "hunter2").await;
	assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(
		resp.json::<Value>().await.unwrap(),
		json!({ "message": "invalid session ttl", "success": false })
	);

	server.shutdown().await;
}

#[tokio::test]
async fn test_logout_revokes_token() {
	let server = TestServer::start().await;

	let kevin = create_user(&server.global, "kevin", None).await;
	create_user(&server.global, "tom", None).await;
	let token = create_token(&server.global, &kevin).await;

	let resp = server
		.client
		.post(server.url("/v1/auth/logout"))
		.bearer_auth(&token)
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::NO_CONTENT);

	let resp = server
		.client
		.post(server.url("/v1/follow/tom/"))
		.bearer_auth(&token)
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(resp.headers()["x-auth-token-check-status"], "failed");
	assert_eq!(server.global.store().count_follows().await.unwrap(), 0);

	let resp = server.client.post(server.url("/v1/auth/logout")).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

	server.shutdown().await;
}

#[tokio::test]
async fn test_token_checks() {
	let server = TestServer::start().await;

	let kevin = create_user(&server.global, "kevin", None).await;
	create_user(&server.global, "tom", None).await;

	let expired = server
		.global
		.store()
		.create_session(kevin.id, Utc::now() - Duration::seconds(5))
		.await
		.unwrap();

	let jwt = server.global.config::<JwtConfig>();

	let wrong_secret = AuthJwtPayload::from(&expired)
		.serialize(&JwtConfig {
			secret: "other".to_string(),
			..jwt.clone()
		})
		.unwrap();

	let unknown_session = AuthJwtPayload {
		user_id: kevin.id.0,
		session_id: Ulid::new().0,
		expiration: None,
		issued_at: Utc::now() - Duration::seconds(1),
		not_before: None,
		audience: None,
	}
	.serialize(jwt)
	.unwrap();

	let tokens = [
		AuthJwtPayload::from(&expired).serialize(jwt).unwrap(),
		wrong_secret,
		unknown_session,
		"garbage".to_string(),
	];

	for token in tokens {
		let resp = server
			.client
			.post(server.url("/v1/follow/tom/"))
			.bearer_auth(&token)
			.send()
			.await
			.unwrap();
		assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(resp.headers()["x-auth-token-check-status"], "failed");
	}

	// Anonymous routes still work with a bad token
	let resp = server
		.client
		.get(server.url("/v1/users/"))
		.header(reqwest::header::AUTHORIZATION, "Basic abc")
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::OK);
	assert_eq!(resp.headers()["x-auth-token-check-status"], "failed");

	server.shutdown().await;
}

#[test]
fn test_jwt_roundtrip() {
	let config = AppConfig::default().jwt;

	let payload = AuthJwtPayload {
		user_id: ulid::Ulid::new(),
		session_id: ulid::Ulid::new(),
		expiration: Some(Utc::now() + Duration::hours(1)),
		issued_at: Utc::now() - Duration::seconds(1),
		not_before: None,
		audience: None,
	};

	let token = payload.serialize(&config).unwrap();
	let verified = AuthJwtPayload::verify(&config, &token).unwrap();
	assert_eq!(verified.user_id, payload.user_id);
	assert_eq!(verified.session_id, payload.session_id);

	let other_issuer = JwtConfig {
		issuer: "someone-else".to_string(),
		..config.clone()
	};
	assert!(AuthJwtPayload::verify(&other_issuer, &token).is_none());
}
