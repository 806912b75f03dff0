use reqwest::StatusCode;
use serde_json::{json, Value};

use super::TestServer;
use crate::config::{ApiConfig, AppConfig};
use crate::tests::global::create_user;

#[tokio::test]
async fn test_list_without_users() {
	let server = TestServer::start().await;

	let resp = server.client.get(server.url("/v1/users/")).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::OK);
	assert_eq!(
		resp.json::<Value>().await.unwrap(),
		json!({
			"count": 0,
			"next": null,
			"previous": null,
			"results": []
		})
	);

	server.shutdown().await;
}

#[tokio::test]
async fn test_list_users() {
	let server = TestServer::start().await;

	create_user(&server.global, "tommy", None).await;
	create_user(&server.global, "john", None).await;

	let resp = server.client.get(server.url("/v1/users/")).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::OK);

	let host = server.host();
	assert_eq!(
		resp.json::<Value>().await.unwrap(),
		json!({
			"count": 2,
			"next": null,
			"previous": null,
			"results": [
				{
					"email": "",
					"first_name": "",
					"last_name": "",
					"url": format!("http://{host}/v1/users/john/"),
					"username": "john"
				},
				{
					"email": "",
					"first_name": "",
					"last_name": "",
					"url": format!("http://{host}/v1/users/tommy/"),
					"username": "tommy"
				}
			]
		})
	);

	// The url follows the Host header the client used
	let resp = server
		.client
		.get(server.url("/v1/users"))
		.header(reqwest::header::HOST, "testserver")
		.send()
		.await
		.unwrap();
	let body = resp.json::<Value>().await.unwrap();
	assert_eq!(body["results"][0]["url"], "http://testserver/v1/users/john/");

	server.shutdown().await;
}

#[tokio::test]
async fn test_list_users_pagination() {
	let server = TestServer::start_with(AppConfig {
		api: ApiConfig {
			page_size: 2,
			..Default::default()
		},
		..Default::default()
	})
	.await;

	for username in ["e", "d", "c", "b", "a"] {
		create_user(&server.global, username, None).await;
	}

	let host = server.host();

	let body = server
		.client
		.get(server.url("/v1/users/"))
		.send()
		.await
		.unwrap()
		.json::<Value>()
		.await
		.unwrap();
	assert_eq!(body["count"], 5);
	assert_eq!(body["previous"], Value::Null);
	assert_eq!(body["next"], format!("http://{host}/v1/users/?page=2"));
	assert_eq!(body["results"][0]["username"], "a");
	assert_eq!(body["results"][1]["username"], "b");

	let body = server
		.client
		.get(server.url("/v1/users/?page=2"))
		.send()
		.await
		.unwrap()
		.json::<Value>()
		.await
		.unwrap();
	assert_eq!(body["previous"], format!("http://{host}/v1/users/"));
	assert_eq!(body["next"], format!("http://{host}/v1/users/?page=3"));
	assert_eq!(body["results"][0]["username"], "c");

	let body = server
		.client
		.get(server.url("/v1/users/?page=last"))
		.send()
		.await
		.unwrap()
		.json::<Value>()
		.await
		.unwrap();
	assert_eq!(body["previous"], format!("http://{host}/v1/users/?page=2"));
	assert_eq!(body["next"], Value::Null);
	assert_eq!(body["results"].as_array().unwrap().len(), 1);
	assert_eq!(body["results"][0]["username"], "e");

	for page in ["4", "0", "abc"] {
		let resp = server
			.client
			.get(server.url(&format!("/v1/users/?page={page}")))
			.send()
			.await
			.unwrap();
		assert_eq!(resp.status(), StatusCode::NOT_FOUND);
		assert_eq!(resp.json::<Value>().await.unwrap(), json!({ "detail": "Invalid page." }));
	}

	server.shutdown().await;
}

#[tokio::test]
async fn test_list_users_pagination_double_slash() {
	let server = TestServer::start_with(AppConfig {
		api: ApiConfig {
			page_size: 1,
			..Default::default()
		},
		..Default::default()
	})
	.await;

	for username in ["c", "b", "a"] {
		create_user(&server.global, username, None).await;
	}

	let host = server.host();

	let resp = server
		.client
		.get(server.url("//v1/users/?page=2"))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::OK);

	let body = resp.json::<Value>().await.unwrap();
	assert_eq!(body["results"][0]["username"], "b");
	assert_eq!(body["next"], format!("http://{host}//v1/users/?page=3"));
	assert_eq!(body["previous"], format!("http://{host}//v1/users/"));
	assert_eq!(body["results"][0]["url"], format!("http://{host}/v1/users/b/"));

	server.shutdown().await;
}

#[tokio::test]
async fn test_user_detail() {
	let server = TestServer::start().await;

	create_user(&server.global, "john", None).await;

	let resp = server.client.get(server.url("/v1/users/john/")).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::OK);
	assert_eq!(
		resp.json::<Value>().await.unwrap(),
		json!({
			"email": "",
			"first_name": "",
			"last_name": "",
			"url": format!("http://{}/v1/users/john/", server.host()),
			"username": "john"
		})
	);

	let resp = server.client.get(server.url("/v1/users/nobody/")).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::NOT_FOUND);

	server.shutdown().await;
}
