use std::sync::Arc;

use tokio::sync::RwLock;

use super::auth::{AuthData, AuthError};

#[derive(Default, Clone)]
pub struct ContextData {
	pub auth: Option<AuthData>,
}

/// Per request state shared between the middlewares and the handler.
#[derive(Default, Clone)]
pub struct RequestContext(Arc<RwLock<ContextData>>);

impl RequestContext {
	pub async fn set_auth(&self, data: AuthData) {
		let mut guard = self.0.write().await;
		guard.auth = Some(data);
	}

	pub async fn reset_auth(&self) {
		let mut guard = self.0.write().await;
		guard.auth = None;
	}

	pub async fn auth(&self) -> Result<Option<AuthData>, AuthError> {
		let auth = self.0.read().await.auth.clone();
		match auth {
			Some(auth) if !auth.session.is_valid() => Err(AuthError::SessionExpired),
			auth => Ok(auth),
		}
	}

	/// Like [`RequestContext::auth`] but anonymous requests are an error.
	pub async fn require_auth(&self) -> Result<AuthData, AuthError> {
		self.auth().await?.ok_or(AuthError::NotLoggedIn)
	}
}
