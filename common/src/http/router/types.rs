use std::future::Future;
use std::pin::Pin;

use super::route::RouteHandler;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub type BoxFunction<I, O> = Box<dyn Fn(I) -> O + Send + Sync>;

#[allow(clippy::type_complexity)]
pub struct ErrorHandler<O, E>(pub(crate) BoxFunction<(hyper::Request<()>, E), BoxFuture<hyper::Response<O>>>);

impl<O, E> std::fmt::Debug for ErrorHandler<O, E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "ErrorHandler(..)")
	}
}

/// Where a matched path points to inside the router tables.
#[derive(Debug, Clone)]
pub(crate) struct RouteInfo {
	pub route: usize,
	pub pre_middleware: Vec<usize>,
	pub post_middleware: Vec<usize>,
	pub error_handler: Option<usize>,
}

/// The fallback used when no route matches the request.
pub(crate) struct NotFound<I, O, E> {
	pub handler: RouteHandler<I, O, E>,
	pub pre_middleware: Vec<usize>,
	pub post_middleware: Vec<usize>,
	pub error_handler: Option<usize>,
}

/// Path parameters captured by the matched route, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RouteParams(pub Vec<(String, String)>);
