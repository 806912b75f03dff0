use std::fmt::{Debug, Display};
use std::panic::Location;

use bytes::Bytes;
use http_body_util::Full;
use hyper::StatusCode;
use serde_json::json;

pub mod router;

/// The response body used by every handler.
pub type Body = Full<Bytes>;

#[macro_export]
macro_rules! make_response {
	($status:expr, $body:expr) => {
		hyper::Response::builder()
			.status($status)
			.header("Content-Type", "application/json")
			.body($crate::http::Body::from($body.to_string()))
			.expect("failed to build response")
	};
}

/// A response without a body, e.g. `204 No Content`.
pub fn empty_response(status: StatusCode) -> hyper::Response<Body> {
	let mut res = hyper::Response::new(Body::default());
	*res.status_mut() = status;
	res
}

pub async fn error_handler<E: std::error::Error + 'static>(req: hyper::Request<()>, err: RouteError<E>) -> hyper::Response<Body> {
	let location = err.location();

	err.span().in_scope(|| match err.should_log() {
		ShouldLog::Yes => {
			tracing::error!(path = %req.uri(), method = %req.method(), location = location.to_string(), error = ?err, "http error")
		}
		ShouldLog::Debug => {
			tracing::debug!(path = %req.uri(), method = %req.method(), location = location.to_string(), error = ?err, "http error")
		}
		ShouldLog::No => (),
	});

	err.response()
}

pub struct RouteError<E> {
	source: Option<E>,
	location: &'static Location<'static>,
	span: tracing::Span,
	response: hyper::Response<Body>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShouldLog {
	Yes,
	Debug,
	No,
}

impl<E> RouteError<E> {
	pub fn span(&self) -> &tracing::Span {
		&self.span
	}

	pub fn location(&self) -> &'static Location<'static> {
		self.location
	}

	pub fn response(self) -> hyper::Response<Body> {
		self.response
	}

	pub fn status(&self) -> StatusCode {
		self.response.status()
	}

	pub fn source_ref(&self) -> Option<&E> {
		self.source.as_ref()
	}

	pub fn should_log(&self) -> ShouldLog {
		match self.response.status().is_server_error() {
			true => ShouldLog::Yes,
			false => match self.source.is_some() {
				true => ShouldLog::Debug,
				false => ShouldLog::No,
			},
		}
	}

	pub fn with_source(mut self, source: Option<E>) -> Self {
		self.source = source;
		self
	}

	pub fn with_location(mut self, location: &'static Location<'static>) -> Self {
		self.location = location;
		self
	}
}

impl<E> From<hyper::Response<Body>> for RouteError<E> {
	#[track_caller]
	fn from(res: hyper::Response<Body>) -> Self {
		Self {
			source: None,
			span: tracing::Span::current(),
			location: Location::caller(),
			response: res,
		}
	}
}

impl<E, S: AsRef<str>> From<(StatusCode, S)> for RouteError<E> {
	#[track_caller]
	fn from(status: (StatusCode, S)) -> Self {
		Self {
			source: None,
			span: tracing::Span::current(),
			location: Location::caller(),
			response: make_response!(status.0, json!({ "message": status.1.as_ref(), "success": false })),
		}
	}
}

impl<E, S: AsRef<str>, T> From<(StatusCode, S, T)> for RouteError<E>
where
	T: Into<E>,
{
	#[track_caller]
	fn from(status: (StatusCode, S, T)) -> Self {
		Self {
			source: Some(status.2.into()),
			span: tracing::Span::current(),
			location: Location::caller(),
			response: make_response!(status.0, json!({ "message": status.1.as_ref(), "success": false })),
		}
	}
}

impl<E> From<&'_ str> for RouteError<E> {
	#[track_caller]
	fn from(message: &'_ str) -> Self {
		Self {
			source: None,
			span: tracing::Span::current(),
			location: Location::caller(),
			response: make_response!(
				StatusCode::INTERNAL_SERVER_ERROR,
				json!({ "message": message, "success": false })
			),
		}
	}
}

impl<E: Debug> Debug for RouteError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.source {
			Some(err) => write!(f, "RouteError: {:?}", err),
			None => write!(f, "RouteError: Unknown Source"),
		}
	}
}

impl<E: Display> Display for RouteError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.source {
			Some(err) => write!(f, "RouteError: {}", err),
			None => write!(f, "RouteError: Unknown Source"),
		}
	}
}

impl<E: std::error::Error + 'static> std::error::Error for RouteError<E> {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match &self.source {
			Some(err) => Some(err),
			None => None,
		}
	}
}

pub mod ext {
	use std::panic::Location;
	use std::sync::{Arc, Weak};

	use hyper::StatusCode;

	use super::router::ext::RequestExt;
	use super::RouteError;

	pub trait ResultExt<T, E, E2>: Sized {
		fn map_err_route<C>(self, ctx: C) -> std::result::Result<T, RouteError<E2>>
		where
			RouteError<E2>: From<C>,
			E2: From<E>;
	}

	impl<T, E, E2> ResultExt<T, E, E2> for std::result::Result<T, E> {
		#[track_caller]
		fn map_err_route<C>(self, ctx: C) -> std::result::Result<T, RouteError<E2>>
		where
			RouteError<E2>: From<C>,
			E2: From<E>,
		{
			match self {
				Ok(val) => Ok(val),
				Err(err) => Err(RouteError::from(ctx)
					.with_source(Some(err.into()))
					.with_location(Location::caller())),
			}
		}
	}

	pub trait OptionExt<T, E>: Sized {
		fn map_err_route<C>(self, ctx: C) -> std::result::Result<T, RouteError<E>>
		where
			RouteError<E>: From<C>;
	}

	impl<T, E> OptionExt<T, E> for std::option::Option<T> {
		#[track_caller]
		fn map_err_route<C>(self, ctx: C) -> std::result::Result<T, RouteError<E>>
		where
			RouteError<E>: From<C>,
		{
			match self {
				Some(val) => Ok(val),
				None => Err(RouteError::from(ctx).with_location(Location::caller())),
			}
		}
	}

	pub trait RequestGlobalExt<E> {
		fn get_global<G: Sync + Send + 'static>(&self) -> std::result::Result<Arc<G>, RouteError<E>>;
	}

	impl<E, B> RequestGlobalExt<E> for hyper::Request<B> {
		#[track_caller]
		fn get_global<G: Sync + Send + 'static>(&self) -> std::result::Result<Arc<G>, RouteError<E>> {
			self.data::<Weak<G>>()
				.and_then(Weak::upgrade)
				.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to upgrade global state"))
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use http_body_util::BodyExt;
	use hyper::StatusCode;

	use super::ext::{OptionExt, RequestGlobalExt, ResultExt};
	use super::router::ext::RequestExt;
	use super::{error_handler, RouteError, ShouldLog};

	#[derive(thiserror::Error, Debug)]
	#[error("test error")]
	struct TestError;

	async fn body_json(res: hyper::Response<super::Body>) -> serde_json::Value {
		let bytes = res.into_body().collect().await.expect("failed to read body").to_bytes();
		serde_json::from_slice(&bytes).expect("failed to parse body")
	}

	#[tokio::test]
	async fn test_route_error_response() {
		let err: RouteError<TestError> = (StatusCode::BAD_REQUEST, "bad").into();
		assert_eq!(err.status(), StatusCode::BAD_REQUEST);
		assert_eq!(err.should_log(), ShouldLog::No);

		let res = error_handler(hyper::Request::new(()), err).await;
		assert_eq!(res.status(), StatusCode::BAD_REQUEST);
		assert_eq!(
			body_json(res).await,
			serde_json::json!({ "message": "bad", "success": false })
		);
	}

	#[test]
	fn test_should_log() {
		let err: RouteError<TestError> = "internal".into();
		assert_eq!(err.should_log(), ShouldLog::Yes);

		let err: Result<(), RouteError<TestError>> = Err(TestError).map_err_route((StatusCode::BAD_REQUEST, "bad"));
		let err = err.unwrap_err();
		assert_eq!(err.should_log(), ShouldLog::Debug);
		assert!(err.source_ref().is_some());

		let err: Result<(), RouteError<TestError>> = None::<()>.map_err_route((StatusCode::NOT_FOUND, "missing"));
		assert_eq!(err.unwrap_err().status(), StatusCode::NOT_FOUND);
	}

	#[test]
	fn test_get_global() {
		let global = Arc::new(42_u32);

		let mut req = hyper::Request::new(());
		req.provide(Arc::downgrade(&global));

		let found: Result<Arc<u32>, RouteError<TestError>> = req.get_global();
		assert_eq!(*found.unwrap(), 42);

		drop(global);
		let gone: Result<Arc<u32>, RouteError<TestError>> = req.get_global();
		assert_eq!(gone.unwrap_err().status(), StatusCode::INTERNAL_SERVER_ERROR);

		let empty = hyper::Request::new(());
		let missing: Result<Arc<u32>, RouteError<TestError>> = empty.get_global();
		assert!(missing.is_err());
	}
}
