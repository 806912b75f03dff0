use common::http::RouteError;
use common::make_response;
use hyper::StatusCode;
use serde_json::json;

use super::auth::AuthError;
use crate::database::StoreError;
use crate::graph::FollowError;

pub type Result<T, E = RouteError<ApiError>> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
	#[error("auth error: {0}")]
	Auth(#[from] AuthError),
	#[error("follow error: {0}")]
	Follow(#[from] FollowError),
	#[error("store error: {0}")]
	Store(#[from] StoreError),
	#[error("failed to read http body: {0}")]
	ReadBody(#[from] hyper::Error),
	#[error("failed to parse json body: {0}")]
	Json(#[from] serde_json::Error),
}

impl From<FollowError> for RouteError<ApiError> {
	#[track_caller]
	fn from(value: FollowError) -> Self {
		let status = match &value {
			FollowError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
			_ => StatusCode::BAD_REQUEST,
		};

		let message = match &value {
			FollowError::Store(_) => "failed to update follow".to_string(),
			err => err.to_string(),
		};

		RouteError::from(make_response!(
			status,
			json!({
				"error": value.code(),
				"message": message,
				"success": false,
			})
		))
		.with_source(Some(ApiError::Follow(value)))
	}
}
