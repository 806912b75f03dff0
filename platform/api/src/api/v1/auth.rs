use std::sync::Arc;

use chrono::Utc;
use common::http::ext::ResultExt;
use common::http::router::builder::RouterBuilder;
use common::http::router::Router;
use common::http::{empty_response, Body, RouteError};
use common::make_response;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde_json::json;

use crate::api::auth::AuthError;
use crate::api::error::{ApiError, Result};
use crate::api::ext::RequestExt as _;
use crate::api::jwt::{AuthJwtPayload, JwtState};
use crate::config::JwtConfig;
use crate::global::ApiGlobal;

#[derive(Debug, serde::Deserialize)]
struct LoginRequest {
	username: String,
	password: String,
}

/// `POST /v1/auth/login`. Exchanges a username and password for a session token.
async fn login<G: ApiGlobal>(req: Request<Incoming>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;

	let body = req
		.into_body()
		.collect()
		.await
		.map_err_route((StatusCode::BAD_REQUEST, "failed to read request body"))?
		.to_bytes();

	let request: LoginRequest =
		serde_json::from_slice(&body).map_err_route((StatusCode::BAD_REQUEST, "invalid request body"))?;

	let user = global
		.store()
		.user_by_username(&request.username)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch user"))?;

	let Some(user) = user.filter(|user| user.verify_password(&request.password)) else {
		return Err(AuthError::InvalidCredentials.into());
	};

	let config = global.config::<JwtConfig>();
	let expires_at = config
		.session_expiry(Utc::now())
		.ok_or((StatusCode::INTERNAL_SERVER_ERROR, "invalid session ttl"))?;

	let session = global
		.store()
		.create_session(user.id, expires_at)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to create session"))?;

	let token = AuthJwtPayload::from(&session)
		.serialize(config)
		.ok_or((StatusCode::INTERNAL_SERVER_ERROR, "failed to serialize token"))?;

	tracing::debug!(user = %user.username, session_id = %session.id, "user logged in");

	Ok(make_response!(
		StatusCode::OK,
		json!({
			"token": token,
			"session_id": session.id,
			"expires_at": session.expires_at,
		})
	))
}

/// `POST /v1/auth/logout`. Invalidates the session the request authenticated with.
async fn logout<G: ApiGlobal>(req: Request<Incoming>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let context = req.request_context()?;

	let auth = context.require_auth().await?;

	global
		.store()
		.invalidate_session(auth.session.id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to invalidate session"))?;

	context.reset_auth().await;

	Ok(empty_response(StatusCode::NO_CONTENT))
}

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> RouterBuilder<Incoming, Body, RouteError<ApiError>> {
	Router::builder().post("/login", login::<G>).post("/logout", logout::<G>)
}
