use std::sync::Arc;

use common::context::Context;

use crate::config::{ApiConfig, AppConfig, JwtConfig};
use crate::database::Store;

pub trait ApiState {
	fn store(&self) -> &dyn Store;
}

pub trait ApiGlobal:
	common::global::GlobalCtx
	+ common::global::GlobalConfigProvider<ApiConfig>
	+ common::global::GlobalConfigProvider<JwtConfig>
	+ common::global::GlobalConfig
	+ ApiState
	+ Send
	+ Sync
	+ 'static
{
}

impl<T> ApiGlobal for T where
	T: common::global::GlobalCtx
		+ common::global::GlobalConfigProvider<ApiConfig>
		+ common::global::GlobalConfigProvider<JwtConfig>
		+ common::global::GlobalConfig
		+ ApiState
		+ Send
		+ Sync
		+ 'static
{
}

pub struct GlobalState {
	config: AppConfig,
	ctx: Context,
	store: Arc<dyn Store>,
}

impl GlobalState {
	pub fn new(config: AppConfig, ctx: Context, store: Arc<dyn Store>) -> Self {
		Self { config, ctx, store }
	}
}

impl common::global::GlobalCtx for GlobalState {
	fn ctx(&self) -> &Context {
		&self.ctx
	}
}

impl common::global::GlobalConfigProvider<AppConfig> for GlobalState {
	fn provide_config(&self) -> &AppConfig {
		&self.config
	}
}

impl common::global::GlobalConfigProvider<ApiConfig> for GlobalState {
	fn provide_config(&self) -> &ApiConfig {
		&self.config.api
	}
}

impl common::global::GlobalConfigProvider<JwtConfig> for GlobalState {
	fn provide_config(&self) -> &JwtConfig {
		&self.config.jwt
	}
}

impl common::global::GlobalConfig for GlobalState {}

impl ApiState for GlobalState {
	fn store(&self) -> &dyn Store {
		self.store.as_ref()
	}
}
