use std::sync::Arc;

use common::http::ext::{OptionExt, RequestGlobalExt};
use common::http::router::ext::RequestExt as _;
use hyper::{header, StatusCode};
use url::Url;

use super::error::{ApiError, Result};
use super::request_context::RequestContext;
use crate::config::ApiConfig;
use crate::global::ApiGlobal;

pub trait RequestExt {
	fn get_global<G: ApiGlobal>(&self) -> Result<Arc<G>>;

	/// The context set up by the auth middleware.
	fn request_context(&self) -> Result<RequestContext>;

	/// `{scheme}://{host}/` as seen by the client.
	fn base_url(&self, config: &ApiConfig) -> Result<Url>;

	/// The absolute url of this request, query string included.
	fn absolute_url(&self, config: &ApiConfig) -> Result<Url>;
}

impl<B> RequestExt for hyper::Request<B> {
	#[track_caller]
	fn get_global<G: ApiGlobal>(&self) -> Result<Arc<G>> {
		<Self as RequestGlobalExt<ApiError>>::get_global::<G>(self)
	}

	#[track_caller]
	fn request_context(&self) -> Result<RequestContext> {
		self.data::<RequestContext>()
			.cloned()
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "missing request context"))
	}

	fn base_url(&self, config: &ApiConfig) -> Result<Url> {
		let scheme = match config.tls.is_some() {
			true => "https",
			false => "http",
		};

		let host = self
			.headers()
			.get(header::HOST)
			.and_then(|h| h.to_str().ok())
			.map(str::to_string)
			.or_else(|| self.uri().authority().map(|a| a.to_string()))
			.or_else(|| config.public_host.clone())
			.unwrap_or_else(|| config.bind_address.to_string());

		Url::parse(&format!("{scheme}://{host}/")).map_err(|_| (StatusCode::BAD_REQUEST, "invalid host header").into())
	}

	fn absolute_url(&self, config: &ApiConfig) -> Result<Url> {
		let mut url = self.base_url(config)?;

		// The request path may start with `//`, which `Url::join` would read as a host.
		url.set_path(self.uri().path());
		url.set_query(self.uri().query());

		Ok(url)
	}
}
