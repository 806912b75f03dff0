use std::sync::Arc;

use common::http::ext::OptionExt;
use common::http::router::builder::RouterBuilder;
use common::http::router::ext::RequestExt as _;
use common::http::router::Router;
use common::http::{empty_response, Body, RouteError};
use common::make_response;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde_json::json;

use crate::api::error::{ApiError, Result};
use crate::api::ext::RequestExt as _;
use crate::global::ApiGlobal;
use crate::graph::{self, FollowOutcome};

fn target(req: &Request<Incoming>) -> Result<String> {
	req.param("username")
		.map(str::to_string)
		.map_err_route((StatusCode::BAD_REQUEST, "missing username"))
}

/// `POST /v1/follow/{username}/`. Following someone twice is not an error.
async fn follow<G: ApiGlobal>(req: Request<Incoming>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let context = req.request_context()?;
	let username = target(&req)?;

	let auth = context.require_auth().await?;

	match graph::follow(global.store(), &auth.user, &username).await {
		Ok(outcome) => Ok(make_response!(
			StatusCode::CREATED,
			json!({
				"follower": auth.user.username,
				"follows": username,
				"created": outcome == FollowOutcome::Followed,
			})
		)),
		Err(err) => Err(err.into()),
	}
}

/// `DELETE /v1/follow/{username}/`.
async fn unfollow<G: ApiGlobal>(req: Request<Incoming>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let context = req.request_context()?;
	let username = target(&req)?;

	let auth = context.require_auth().await?;

	match graph::unfollow(global.store(), &auth.user, &username).await {
		Ok(()) => Ok(empty_response(StatusCode::NO_CONTENT)),
		Err(err) => Err(err.into()),
	}
}

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> RouterBuilder<Incoming, Body, RouteError<ApiError>> {
	Router::builder()
		.post("/:username", follow::<G>)
		.delete("/:username", unfollow::<G>)
}
