use reqwest::StatusCode;
use serde_json::{json, Value};

use super::TestServer;

#[tokio::test]
async fn test_health() {
	let server = TestServer::start().await;

	let resp = server.client.get(server.url("/v1/health")).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::OK);
	assert_eq!(resp.json::<Value>().await.unwrap(), json!({ "status": "ok" }));

	let resp = server.client.get(server.url("/v1/health/")).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::OK);

	server.shutdown().await;
}

#[tokio::test]
async fn test_unknown_url() {
	let server = TestServer::start().await;

	let resp = server.client.get(server.url("/incorrect")).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::NOT_FOUND);
	assert_eq!(resp.json::<Value>().await.unwrap(), json!({ "error": "not_found" }));

	// Known path, unknown method
	let resp = server.client.put(server.url("/v1/users/")).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::NOT_FOUND);

	server.shutdown().await;
}
