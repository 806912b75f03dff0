use std::sync::Arc;

use common::http::ext::{OptionExt, ResultExt};
use common::http::router::builder::RouterBuilder;
use common::http::router::ext::RequestExt as _;
use common::http::router::Router;
use common::http::{Body, RouteError};
use common::make_response;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde_json::json;
use url::Url;

use crate::api::error::{ApiError, Result};
use crate::api::ext::RequestExt as _;
use crate::api::pagination::{PageWindow, PAGE_QUERY_PARAM};
use crate::config::ApiConfig;
use crate::database::User;
use crate::global::ApiGlobal;

/// The public view of an account.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UserSummary {
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	pub url: String,
	pub username: String,
}

impl UserSummary {
	pub fn new(user: User, base_url: &Url) -> Self {
		Self {
			url: user_url(base_url, &user.username),
			email: user.email,
			first_name: user.first_name,
			last_name: user.last_name,
			username: user.username,
		}
	}
}

/// `{base}v1/users/{username}/`, with the username percent-encoded as a path segment.
pub fn user_url(base_url: &Url, username: &str) -> String {
	let mut url = base_url.clone();
	url.set_query(None);

	if let Ok(mut segments) = url.path_segments_mut() {
		segments.clear().extend(["v1", "users", username, ""]);
	}

	url.to_string()
}

async fn list<G: ApiGlobal>(req: Request<Incoming>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let config = global.config::<ApiConfig>();

	let base_url = req.base_url(config)?;
	let request_url = req.absolute_url(config)?;
	let page = req.query_param(PAGE_QUERY_PARAM);

	let store = global.store();

	let count = store
		.count_users()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to count users"))?;

	let window = PageWindow::new(page.as_deref(), count, config.page_size)?;

	let users = store
		.list_users(window.offset(), window.limit())
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to list users"))?;

	let results = users.into_iter().map(|user| UserSummary::new(user, &base_url)).collect();

	Ok(make_response!(StatusCode::OK, json!(window.into_page(&request_url, results))))
}

async fn detail<G: ApiGlobal>(req: Request<Incoming>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let base_url = req.base_url(global.config::<ApiConfig>())?;
	let username = req
		.param("username")
		.map(str::to_string)
		.map_err_route((StatusCode::BAD_REQUEST, "missing username"))?;

	let user = global
		.store()
		.user_by_username(&username)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch user"))?;

	match user {
		Some(user) => Ok(make_response!(StatusCode::OK, json!(UserSummary::new(user, &base_url)))),
		None => Ok(make_response!(StatusCode::NOT_FOUND, json!({ "detail": "Not found." }))),
	}
}

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> RouterBuilder<Incoming, Body, RouteError<ApiError>> {
	Router::builder().get("/", list::<G>).get("/:username", detail::<G>)
}
