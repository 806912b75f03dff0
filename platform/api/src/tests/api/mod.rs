use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use common::context::Handler;
use common::prelude::FutureTimeout;
use tokio::task::JoinHandle;

use crate::api;
use crate::config::{ApiConfig, AppConfig};
use crate::global::GlobalState;
use crate::tests::global::mock_global_state;

mod auth;
mod follow;
mod health;
mod users;

/// The real server bound to a free local port, backed by the memory store.
pub struct TestServer {
	pub global: Arc<GlobalState>,
	pub client: reqwest::Client,
	addr: SocketAddr,
	handler: Handler,
	handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
	pub async fn start() -> Self {
		Self::start_with(AppConfig::default()).await
	}

	pub async fn start_with(mut config: AppConfig) -> Self {
		let port = portpicker::pick_unused_port().expect("failed to pick port");
		let addr = SocketAddr::from(([127, 0, 0, 1], port));

		config.api = ApiConfig {
			bind_address: addr,
			..config.api
		};

		let (global, handler) = mock_global_state(config).await;

		let handle = tokio::spawn(api::run(global.clone()));

		// Wait for the listener to come up
		async {
			while tokio::net::TcpStream::connect(addr).await.is_err() {
				tokio::time::sleep(Duration::from_millis(10)).await;
			}
		}
		.timeout(Duration::from_secs(5))
		.await
		.expect("server did not start");

		Self {
			global,
			client: reqwest::Client::new(),
			addr,
			handler,
			handle,
		}
	}

	pub fn url(&self, path: &str) -> String {
		format!("http://{}{}", self.addr, path)
	}

	pub fn host(&self) -> String {
		self.addr.to_string()
	}

	pub async fn shutdown(self) {
		// The client uses Keep-Alive, so we need to drop it to release the global context
		drop(self.global);
		drop(self.client);

		self.handler
			.cancel()
			.timeout(Duration::from_secs(1))
			.await
			.expect("failed to cancel context");

		self.handle
			.timeout(Duration::from_secs(1))
			.await
			.expect("api did not stop")
			.expect("api panicked")
			.expect("api failed");
	}
}
