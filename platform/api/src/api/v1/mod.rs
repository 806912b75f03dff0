use std::sync::Arc;

use common::http::router::builder::RouterBuilder;
use common::http::router::Router;
use common::http::{Body, RouteError};
use hyper::body::Incoming;

use super::error::ApiError;
use crate::global::ApiGlobal;

pub mod auth;
pub mod follow;
pub mod health;
pub mod users;

pub fn routes<G: ApiGlobal>(global: &Arc<G>) -> RouterBuilder<Incoming, Body, RouteError<ApiError>> {
	Router::builder()
		.scope("/health", health::routes(global))
		.scope("/users", users::routes(global))
		.scope("/follow", follow::routes(global))
		.scope("/auth", auth::routes(global))
}
