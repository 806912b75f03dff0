use common::http::RouteError;
use hyper::StatusCode;

use super::error::ApiError;
use crate::database::{Session, Store, Ulid, User};

#[derive(thiserror::Error, Debug, Clone)]
pub enum AuthError {
	#[error("not logged in")]
	NotLoggedIn,
	#[error("token must be an ascii string")]
	HeaderToStr,
	#[error("token must be a bearer token")]
	NotBearerToken,
	#[error("invalid token")]
	InvalidToken,
	#[error("session expired")]
	SessionExpired,
	#[error("invalid username or password")]
	InvalidCredentials,
	#[error("failed to fetch user")]
	FetchUser,
	#[error("failed to fetch session")]
	FetchSession,
	#[error("user not found")]
	UserNotFound,
}

impl AuthError {
	/// Errors caused by the store rather than the token.
	pub fn is_internal(&self) -> bool {
		matches!(self, AuthError::FetchUser | AuthError::FetchSession)
	}
}

impl From<AuthError> for RouteError<ApiError> {
	#[track_caller]
	fn from(value: AuthError) -> Self {
		RouteError::from(match &value {
			AuthError::NotLoggedIn => (StatusCode::UNAUTHORIZED, "not logged in"),
			AuthError::HeaderToStr | AuthError::NotBearerToken | AuthError::InvalidToken => {
				(StatusCode::UNAUTHORIZED, "invalid token")
			}
			AuthError::SessionExpired => (StatusCode::UNAUTHORIZED, "session expired"),
			AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid username or password"),
			AuthError::FetchUser => (StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch user"),
			AuthError::FetchSession => (StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch session"),
			AuthError::UserNotFound => (StatusCode::UNAUTHORIZED, "user not found"),
		})
		.with_source(Some(ApiError::Auth(value)))
	}
}

/// The acting user of a request and the session it authenticated with.
#[derive(Debug, Clone)]
pub struct AuthData {
	pub session: Session,
	pub user: User,
}

impl AuthData {
	pub async fn from_session(store: &dyn Store, session: Session) -> Result<Self, AuthError> {
		let user = store
			.user_by_id(session.user_id)
			.await
			.map_err(|err| {
				tracing::error!(error = %err, "failed to fetch user");
				AuthError::FetchUser
			})?
			.ok_or(AuthError::UserNotFound)?;

		Ok(Self { session, user })
	}

	pub async fn from_session_id(store: &dyn Store, session_id: Ulid) -> Result<Self, AuthError> {
		let session = store
			.session_by_id(session_id)
			.await
			.map_err(|err| {
				tracing::error!(error = %err, "failed to fetch session");
				AuthError::FetchSession
			})?
			.ok_or(AuthError::InvalidToken)?;

		if !session.is_valid() {
			return Err(AuthError::SessionExpired);
		}

		Self::from_session(store, session).await
	}
}
