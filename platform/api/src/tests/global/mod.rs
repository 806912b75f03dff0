use std::sync::Arc;

use chrono::Utc;
use common::context::{Context, Handler};
use common::global::GlobalConfig;
use common::logging;

use crate::api::jwt::{AuthJwtPayload, JwtState};
use crate::config::{AppConfig, JwtConfig};
use crate::database::{MemoryStore, NewUser, Store, User};
use crate::global::{ApiState, GlobalState};

pub async fn mock_global_state(config: AppConfig) -> (Arc<GlobalState>, Handler) {
	mock_global_state_with_store(config, Arc::new(MemoryStore::new())).await
}

pub async fn mock_global_state_with_store(config: AppConfig, store: Arc<dyn Store>) -> (Arc<GlobalState>, Handler) {
	let (ctx, handler) = Context::new();

	logging::init(&config.logging.level, config.logging.mode).expect("failed to initialize logging");

	let global = Arc::new(GlobalState::new(config, ctx, store));

	(global, handler)
}

pub async fn create_user(global: &Arc<GlobalState>, username: &str, password: Option<&str>) -> User {
	let mut user = NewUser::new(username);
	user.password = password.map(str::to_string);

	global.store().create_user(user).await.expect("failed to create user")
}

/// Opens a session for `user` and returns a bearer token for it.
pub async fn create_token(global: &Arc<GlobalState>, user: &User) -> String {
	let config = global.config::<JwtConfig>();

	let session = global
		.store()
		.create_session(
			user.id,
			config.session_expiry(Utc::now()).expect("session ttl out of range"),
		)
		.await
		.expect("failed to create session");

	AuthJwtPayload::from(&session)
		.serialize(config)
		.expect("failed to create token")
}
