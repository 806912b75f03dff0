use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use common::context::Context;
use common::{logging, signal};
use tokio::signal::unix::SignalKind;
use tokio::{select, time};

use crate::config::{AppConfig, StoreBackend};
use crate::database::{MemoryStore, PgStore, Store, StoreError};

mod api;
mod config;
mod database;
mod global;
mod graph;

#[cfg(test)]
mod tests;

async fn setup_store(config: &AppConfig) -> Result<Arc<dyn Store>> {
	let store: Arc<dyn Store> = match config.database.backend {
		StoreBackend::Memory => {
			tracing::info!("using in-memory store");
			Arc::new(MemoryStore::new())
		}
		StoreBackend::Postgres => {
			let store = PgStore::connect(&config.database.uri)
				.await
				.context("failed to connect to database")?;

			if config.database.run_migrations {
				tracing::info!("running migrations");
				store.migrate().await.context("failed to run migrations")?;
			}

			Arc::new(store)
		}
	};

	seed_users(store.as_ref(), config).await?;

	tracing::info!(
		users = store.count_users().await?,
		follows = store.count_follows().await?,
		"store ready"
	);

	Ok(store)
}

async fn seed_users(store: &dyn Store, config: &AppConfig) -> Result<()> {
	for user in &config.database.seed_users {
		match store.create_user(user.clone()).await {
			Ok(user) => tracing::info!(username = %user.username, "seeded user"),
			Err(StoreError::DuplicateUsername(username)) => {
				tracing::debug!(username = %username, "seed user already exists")
			}
			Err(err) => return Err(err).context("failed to seed users"),
		}
	}

	Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
	let config = AppConfig::parse()?;

	logging::init(&config.logging.level, config.logging.mode)?;

	if let Some(file) = &config.config_file {
		tracing::info!(file = file, "loaded config from file");
	}

	tracing::debug!("config: {:#?}", config);

	let store = setup_store(&config).await?;

	let (ctx, handler) = Context::new();

	let global = Arc::new(global::GlobalState::new(config, ctx, store));

	let api_future = tokio::spawn(api::run(global.clone()));

	// Listen on both sigint and sigterm and cancel the context when either is received
	let mut signal_handler = signal::SignalHandler::new()
		.with_signal(SignalKind::interrupt())?
		.with_signal(SignalKind::terminate())?;

	select! {
		r = api_future => tracing::error!("api stopped unexpectedly: {:?}", r),
		_ = signal_handler.recv() => tracing::info!("shutting down"),
	}

	// We cannot have a context in scope when we cancel the handler, otherwise it will deadlock.
	drop(global);

	// Cancel the context
	tracing::info!("waiting for tasks to finish");

	select! {
		_ = time::sleep(Duration::from_secs(60)) => tracing::warn!("force shutting down"),
		_ = signal_handler.recv() => tracing::warn!("force shutting down"),
		_ = handler.cancel() => tracing::info!("shutting down"),
	}

	Ok(())
}
