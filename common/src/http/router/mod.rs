use std::fmt::{Debug, Formatter};

use error::RouterError;
use route::RouteHandler;

use self::builder::RouterBuilder;
use self::middleware::{PostMiddlewareHandler, PreMiddlewareHandler};
use self::types::{ErrorHandler, NotFound, RouteInfo, RouteParams};

pub mod builder;
pub mod error;
pub mod ext;
pub mod middleware;
pub mod route;
pub mod types;


/// A method + path router over hyper requests.
///
/// Routes are stored in a single path tree keyed by `/{METHOD}/{path}` so a
/// lookup resolves both at once. Trailing slashes are ignored on both sides.
pub struct Router<I, O, E> {
	routes: Vec<RouteHandler<I, O, E>>,
	pre_middlewares: Vec<PreMiddlewareHandler<E>>,
	post_middlewares: Vec<PostMiddlewareHandler<O, E>>,
	error_handlers: Vec<ErrorHandler<O, E>>,
	not_found: Option<NotFound<I, O, E>>,
	tree: path_tree::PathTree<RouteInfo>,
}

/// Percent-decodes a captured path segment. Segments that do not decode to
/// valid UTF-8 are kept as they were sent.
fn decode_param(raw: &str) -> String {
	percent_encoding::percent_decode_str(raw)
		.decode_utf8()
		.map(|v| v.into_owned())
		.unwrap_or_else(|_| raw.to_owned())
}

impl<I: 'static, O: 'static, E: 'static> Router<I, O, E> {
	pub fn builder() -> RouterBuilder<I, O, E> {
		RouterBuilder::new()
	}

	pub(crate) fn tree_key(method: &hyper::Method, path: &str) -> String {
		let path = path.trim_matches('/');
		if path.is_empty() {
			format!("/{}", method.as_str())
		} else {
			format!("/{}/{}", method.as_str(), path)
		}
	}

	pub async fn handle(&self, mut req: hyper::Request<I>) -> Result<hyper::Response<O>, RouterError<E>> {
		let key = Self::tree_key(req.method(), req.uri().path());

		let (handler, pre_middleware, post_middleware, error_handler) = match self.tree.find(&key) {
			Some((info, path)) => {
				req.extensions_mut().insert(RouteParams(
					path.params_iter()
						.map(|(k, v)| (k.to_owned(), decode_param(v)))
						.collect(),
				));

				(
					&self.routes[info.route],
					info.pre_middleware.as_slice(),
					info.post_middleware.as_slice(),
					info.error_handler,
				)
			}
			None => {
				let not_found = self.not_found.as_ref().ok_or(RouterError::NotFound)?;
				req.extensions_mut().insert(RouteParams::default());

				(
					&not_found.handler,
					not_found.pre_middleware.as_slice(),
					not_found.post_middleware.as_slice(),
					not_found.error_handler,
				)
			}
		};

		let error_handler = error_handler.map(|idx| self.error_handlers[idx].0.as_ref());

		for idx in pre_middleware.iter().copied() {
			let (parts, body) = req.into_parts();
			req = match self.pre_middlewares[idx].0(hyper::Request::from_parts(parts.clone(), ())).await {
				Ok(req) => {
					let (parts, _) = req.into_parts();
					hyper::Request::from_parts(parts, body)
				}
				Err(err) => {
					if let Some(error_handler) = error_handler {
						return Ok(error_handler((hyper::Request::from_parts(parts, ()), err)).await);
					} else {
						return Err(RouterError::Unhandled(err));
					}
				}
			};
		}

		let (parts, body) = req.into_parts();

		let req = hyper::Request::from_parts(parts.clone(), ());

		let mut res = match handler.0(hyper::Request::from_parts(parts, body)).await {
			Ok(res) => res,
			Err(err) => {
				if let Some(error_handler) = error_handler {
					error_handler((req.clone(), err)).await
				} else {
					return Err(RouterError::Unhandled(err));
				}
			}
		};

		for idx in post_middleware.iter().copied() {
			res = match self.post_middlewares[idx].0((res, req.clone())).await {
				Ok(res) => res,
				Err(err) => {
					if let Some(error_handler) = error_handler {
						return Ok(error_handler((req, err)).await);
					} else {
						return Err(RouterError::Unhandled(err));
					}
				}
			};
		}

		Ok(res)
	}
}

impl<I, O, E> Debug for Router<I, O, E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Router")
			.field("routes", &self.routes)
			.field("pre_middlewares", &self.pre_middlewares)
			.field("post_middlewares", &self.post_middlewares)
			.field("error_handlers", &self.error_handlers)
			.field("tree", &self.tree)
			.finish()
	}
}
