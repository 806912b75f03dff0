use std::sync::Arc;

use common::http::router::ext::RequestExt as _;
use common::http::router::middleware::Middleware;
use common::http::{Body, RouteError};
use hyper::header::{self, HeaderValue};

use super::response_headers::RequestExt as _;
use crate::api::auth::{AuthData, AuthError};
use crate::api::error::ApiError;
use crate::api::ext::RequestExt as _;
use crate::api::jwt::{AuthJwtPayload, JwtState};
use crate::api::request_context::RequestContext;
use crate::config::JwtConfig;
use crate::global::ApiGlobal;

pub const X_AUTH_TOKEN_CHECK_STATUS: &str = "x-auth-token-check-status";

/// Resolves the bearer token into the acting user. A missing or bad token
/// leaves the request anonymous; only store failures fail the request.
pub fn auth_middleware<G: ApiGlobal>(_: &Arc<G>) -> Middleware<Body, RouteError<ApiError>> {
	Middleware::pre(|mut req| async move {
		let context = RequestContext::default();
		req.provide(context.clone());

		let Some(token) = req.headers().get(header::AUTHORIZATION) else {
			// No Authorization header
			return Ok(req);
		};

		let global = req.get_global::<G>()?;

		match authenticate(&global, token).await {
			Ok(data) => context.set_auth(data).await,
			Err(err) if err.is_internal() => return Err(err.into()),
			Err(err) => {
				tracing::debug!(error = %err, "token check failed");
				req.set_response_header(X_AUTH_TOKEN_CHECK_STATUS, HeaderValue::from_static("failed"));
			}
		}

		Ok(req)
	})
}

async fn authenticate<G: ApiGlobal>(global: &Arc<G>, token: &HeaderValue) -> Result<AuthData, AuthError> {
	let token = token
		.to_str()
		.map_err(|_| AuthError::HeaderToStr)?
		// Tokens will start with "Bearer " so we need to remove that
		.strip_prefix("Bearer ")
		.ok_or(AuthError::NotBearerToken)?;

	let jwt = AuthJwtPayload::verify(global.config::<JwtConfig>(), token).ok_or(AuthError::InvalidToken)?;

	let data = AuthData::from_session_id(global.store(), jwt.session_id.into()).await?;

	if data.user.id.0 != jwt.user_id {
		return Err(AuthError::InvalidToken);
	}

	Ok(data)
}
