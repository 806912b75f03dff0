use std::convert::Infallible;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use common::http::router::Router;
use common::http::{Body, RouteError};
use common::make_response;
use common::prelude::FutureTimeout;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::net::TcpSocket;
use tokio::select;

use self::error::ApiError;
use crate::config::ApiConfig;
use crate::global::ApiGlobal;

pub mod auth;
pub mod error;
pub mod ext;
pub mod jwt;
pub mod middleware;
pub mod pagination;
pub mod request_context;
pub mod v1;

pub fn routes<G: ApiGlobal>(global: &Arc<G>) -> Router<Incoming, Body, RouteError<ApiError>> {
	let weak = Arc::downgrade(global);
	Router::builder()
		.data(weak)
		// These response header middlewares lets us add headers to the response from the request
		// handlers
		.middleware(middleware::response_headers::pre_flight_middleware(global))
		.middleware(middleware::response_headers::post_flight_middleware(global))
		// The auth middleware checks the Authorization header, and if it's valid, it adds the user
		// to the request context. It does not fail the request if the token is invalid or not present.
		.middleware(middleware::auth::auth_middleware(global))
		.scope("/v1", v1::routes(global))
		.error_handler(common::http::error_handler::<ApiError>)
		.not_found(|_| async move {
			Ok(make_response!(
				hyper::StatusCode::NOT_FOUND,
				json!({
					"error": "not_found",
				})
			))
		})
		.build()
}

fn build_tls_acceptor(cert: Vec<u8>, key: Vec<u8>) -> anyhow::Result<tokio_rustls::TlsAcceptor> {
	let key = rustls_pemfile::private_key(&mut io::BufReader::new(io::Cursor::new(key)))?
		.ok_or_else(|| anyhow::anyhow!("failed to find private key in api private key file"))?;

	let certs = rustls_pemfile::certs(&mut io::BufReader::new(io::Cursor::new(cert))).collect::<Result<Vec<_>, _>>()?;

	Ok(tokio_rustls::TlsAcceptor::from(Arc::new(
		rustls::ServerConfig::builder()
			.with_no_client_auth()
			.with_single_cert(certs, key)?,
	)))
}

pub async fn run<G: ApiGlobal>(global: Arc<G>) -> anyhow::Result<()> {
	let config = global.config::<ApiConfig>();

	tracing::info!("Listening on {}", config.bind_address);
	let socket = if config.bind_address.is_ipv6() {
		TcpSocket::new_v6()?
	} else {
		TcpSocket::new_v4()?
	};

	socket.set_reuseaddr(true)?;
	socket.bind(config.bind_address)?;
	let listener = socket.listen(1024)?;

	let tls_acceptor = if let Some(tls) = &config.tls {
		tracing::info!("TLS enabled");
		let cert = tokio::fs::read(&tls.cert).await.context("failed to read api ssl cert")?;
		let key = tokio::fs::read(&tls.key).await.context("failed to read api ssl private key")?;

		Some(build_tls_acceptor(cert, key)?)
	} else {
		None
	};

	// Handlers only hold a Weak reference to the global state so that an idle
	// keep-alive connection does not keep it alive during shutdown.
	let router = Arc::new(routes(&global));

	loop {
		select! {
			_ = global.ctx().done() => {
				return Ok(());
			},
			r = listener.accept() => {
				let (socket, addr) = r?;

				let router = router.clone();
				let tls_acceptor = tls_acceptor.clone();
				let ctx = global.ctx().clone();

				tracing::debug!("Accepted connection from {}", addr);

				tokio::spawn(async move {
					let service = service_fn(move |req| {
						let router = router.clone();
						async move {
							Ok::<_, Infallible>(match router.handle(req).await {
								Ok(res) => res,
								Err(err) => {
									tracing::error!(error = %err, "unhandled router error");
									make_response!(
										hyper::StatusCode::INTERNAL_SERVER_ERROR,
										json!({ "message": "internal server error", "success": false })
									)
								}
							})
						}
					});

					let http = http1::Builder::new();

					if let Some(tls_acceptor) = tls_acceptor {
						let Ok(Ok(socket)) = tls_acceptor.accept(socket).timeout(Duration::from_secs(5)).await else {
							tracing::debug!("TLS handshake failed with {}", addr);
							return;
						};
						tracing::debug!("TLS handshake complete");

						let conn = http.serve_connection(TokioIo::new(socket), service);
						tokio::pin!(conn);

						select! {
							r = conn.as_mut() => {
								if let Err(err) = r {
									tracing::debug!(error = %err, "connection error");
								}
							},
							_ = ctx.done() => {
								conn.as_mut().graceful_shutdown();
								conn.await.ok();
							},
						}
					} else {
						let conn = http.serve_connection(TokioIo::new(socket), service);
						tokio::pin!(conn);

						select! {
							r = conn.as_mut() => {
								if let Err(err) = r {
									tracing::debug!(error = %err, "connection error");
								}
							},
							_ = ctx.done() => {
								conn.as_mut().graceful_shutdown();
								conn.await.ok();
							},
						}
					}
				});
			},
		}
	}
}
