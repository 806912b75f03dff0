use std::fmt::{Debug, Formatter};

use super::middleware::{Middleware, PostMiddlewareHandler, PreMiddlewareHandler};
use super::route::{Route, RouteHandler, RouterItem};
use super::types::{ErrorHandler, NotFound, RouteInfo};
use super::Router;

pub struct RouterBuilder<I, O, E> {
	tree: Vec<(&'static str, RouterItem<I, O, E>)>,
	pre_middleware: Vec<PreMiddlewareHandler<E>>,
	post_middleware: Vec<PostMiddlewareHandler<O, E>>,
	error_handler: Option<ErrorHandler<O, E>>,
	not_found: Option<RouteHandler<I, O, E>>,
}

impl<I, O, E> Debug for RouterBuilder<I, O, E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouterBuilder")
			.field("tree", &self.tree)
			.field("pre_middleware", &self.pre_middleware)
			.field("post_middleware", &self.post_middleware)
			.field("error_handler", &self.error_handler)
			.field("not_found", &self.not_found)
			.finish()
	}
}

impl<I: 'static, O: 'static, E: 'static> Default for RouterBuilder<I, O, E> {
	fn default() -> Self {
		Self::new()
	}
}

/// Joins a scope prefix and a route path into the form stored in the tree.
/// Leading and trailing slashes are not significant.
fn join_path(parent_path: &str, path: &str) -> String {
	let parent_path = parent_path.trim_matches('/');
	let path = path.trim_matches('/');

	match (parent_path.is_empty(), path.is_empty()) {
		(true, true) => String::new(),
		(true, false) => path.to_string(),
		(false, true) => parent_path.to_string(),
		(false, false) => format!("{parent_path}/{path}"),
	}
}

impl<I: 'static, O: 'static, E: 'static> RouterBuilder<I, O, E> {
	pub fn new() -> Self {
		Self {
			tree: Vec::new(),
			post_middleware: Vec::new(),
			pre_middleware: Vec::new(),
			error_handler: None,
			not_found: None,
		}
	}

	pub fn middleware(mut self, middleware: Middleware<O, E>) -> Self {
		match middleware {
			Middleware::Pre(handler) => self.pre_middleware.push(handler),
			Middleware::Post(handler) => self.post_middleware.push(handler),
		}

		self
	}

	/// Makes `data` available to every handler below this scope through the request extensions.
	pub fn data<T: Clone + Send + Sync + 'static>(self, data: T) -> Self {
		self.middleware(Middleware::pre(move |mut req| {
			req.extensions_mut().insert(data.clone());
			async move { Ok(req) }
		}))
	}

	pub fn error_handler<F: std::future::Future<Output = hyper::Response<O>> + Send + 'static>(
		mut self,
		handler: impl Fn(hyper::Request<()>, E) -> F + Send + Sync + 'static,
	) -> Self {
		self.error_handler = Some(ErrorHandler(Box::new(move |(req, err)| Box::pin(handler(req, err)))));
		self
	}

	pub fn get<F: std::future::Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		self,
		path: &'static str,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.add_route(hyper::Method::GET, path, handler)
	}

	pub fn post<F: std::future::Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		self,
		path: &'static str,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.add_route(hyper::Method::POST, path, handler)
	}

	pub fn put<F: std::future::Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		self,
		path: &'static str,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.add_route(hyper::Method::PUT, path, handler)
	}

	pub fn delete<F: std::future::Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		self,
		path: &'static str,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.add_route(hyper::Method::DELETE, path, handler)
	}

	pub fn patch<F: std::future::Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		self,
		path: &'static str,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.add_route(hyper::Method::PATCH, path, handler)
	}

	pub fn add_route<F: std::future::Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		mut self,
		method: hyper::Method,
		path: &'static str,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.tree.push((
			path,
			RouterItem::Route(Route {
				method,
				handler: RouteHandler::new(handler),
			}),
		));
		self
	}

	pub fn scope(mut self, path: &'static str, router: RouterBuilder<I, O, E>) -> Self {
		self.tree.push((path, RouterItem::Router(router)));
		self
	}

	/// The handler used when nothing in the tree matches. Only the one set on
	/// the root builder is used.
	pub fn not_found<F: std::future::Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		mut self,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.not_found = Some(RouteHandler::new(handler));
		self
	}

	fn build_scoped(
		mut self,
		parent_path: &str,
		target: &mut Router<I, O, E>,
		pre_middlewares: &[usize],
		post_middlewares: &[usize],
		error_handler: Option<usize>,
	) -> (Vec<usize>, Vec<usize>, Option<usize>) {
		let error_handler = if let Some(error_handler) = self.error_handler.take() {
			target.error_handlers.push(error_handler);
			Some(target.error_handlers.len() - 1)
		} else {
			error_handler
		};

		let pre_middleware_idxs = pre_middlewares
			.iter()
			.copied()
			.chain(self.pre_middleware.into_iter().map(|handler| {
				target.pre_middlewares.push(handler);
				target.pre_middlewares.len() - 1
			}))
			.collect::<Vec<_>>();

		let post_middleware_idxs = post_middlewares
			.iter()
			.copied()
			.chain(self.post_middleware.into_iter().map(|handler| {
				target.post_middlewares.push(handler);
				target.post_middlewares.len() - 1
			}))
			.collect::<Vec<_>>();

		for (path, item) in self.tree.drain(..) {
			match item {
				RouterItem::Route(route) => {
					target.routes.push(route.handler);

					let info = RouteInfo {
						route: target.routes.len() - 1,
						pre_middleware: pre_middleware_idxs.clone(),
						post_middleware: post_middleware_idxs.clone(),
						error_handler,
					};

					let full_path = Router::<I, O, E>::tree_key(&route.method, &join_path(parent_path, path));

					tracing::debug!(parent_path, path, full_path, "adding route");

					let _ = target.tree.insert(&full_path, info);
				}
				RouterItem::Router(router) => {
					router.build_scoped(
						&join_path(parent_path, path),
						target,
						&pre_middleware_idxs,
						&post_middleware_idxs,
						error_handler,
					);
				}
			}
		}

		(pre_middleware_idxs, post_middleware_idxs, error_handler)
	}

	pub fn build(mut self) -> Router<I, O, E> {
		let not_found = self.not_found.take();

		let mut router = Router {
			routes: Vec::new(),
			pre_middlewares: Vec::new(),
			post_middlewares: Vec::new(),
			error_handlers: Vec::new(),
			not_found: None,
			tree: path_tree::PathTree::new(),
		};

		let (pre_middleware, post_middleware, error_handler) = self.build_scoped("", &mut router, &[], &[], None);

		router.not_found = not_found.map(|handler| NotFound {
			handler,
			pre_middleware,
			post_middleware,
			error_handler,
		});

		router
	}
}
