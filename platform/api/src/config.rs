use std::net::SocketAddr;

use anyhow::Result;
use chrono::{DateTime, Utc};
use common::config::{lenient_option_string, lenient_string, LoggingConfig, TlsConfig};

use crate::database::NewUser;

/// The social graph API server
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// The path to the config file
	#[serde(deserialize_with = "lenient_option_string")]
	pub config_file: Option<String>,

	/// Name of this instance
	#[serde(deserialize_with = "lenient_string")]
	pub name: String,

	/// The logging config
	pub logging: LoggingConfig,

	/// API Config
	pub api: ApiConfig,

	/// Database Config
	pub database: DatabaseConfig,

	/// JWT Config
	pub jwt: JwtConfig,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ApiConfig {
	/// Bind address for the API
	pub bind_address: SocketAddr,

	/// If we should use TLS for the API server
	pub tls: Option<TlsConfig>,

	/// Host used in absolute links when the request has no Host header
	#[serde(deserialize_with = "lenient_option_string")]
	pub public_host: Option<String>,

	/// Number of users per page in listings
	pub page_size: u32,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			bind_address: SocketAddr::from(([0, 0, 0, 0], 4000)),
			tls: None,
			public_host: None,
			page_size: 10,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
	#[default]
	Memory,
	Postgres,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
	/// Which store to use
	pub backend: StoreBackend,

	/// The database URL to use, only used by the postgres backend
	#[serde(deserialize_with = "lenient_string")]
	pub uri: String,

	/// Run the bundled migrations on startup
	pub run_migrations: bool,

	/// Accounts created on startup if their username is not taken yet
	pub seed_users: Vec<NewUser>,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			backend: StoreBackend::Memory,
			uri: "postgres://root@localhost:5432/social_dev".to_string(),
			run_migrations: true,
			seed_users: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct JwtConfig {
	/// JWT secret
	#[serde(deserialize_with = "lenient_string")]
	pub secret: String,

	/// JWT issuer
	#[serde(deserialize_with = "lenient_string")]
	pub issuer: String,

	/// How long a login session stays valid, in seconds
	pub session_ttl_secs: u64,
}

impl JwtConfig {
	/// When a session opened at `now` expires, or `None` if the TTL overflows a timestamp.
	pub fn session_expiry(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
		let ttl = i64::try_from(self.session_ttl_secs)
			.ok()
			.and_then(chrono::Duration::try_seconds)?;

		now.checked_add_signed(ttl)
	}
}

impl Default for JwtConfig {
	fn default() -> Self {
		Self {
			issuer: "social".to_string(),
			secret: "social".to_string(),
			session_ttl_secs: 60 * 60 * 24 * 7,
		}
	}
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			config_file: Some("config.toml".to_string()),
			name: "social-api".to_string(),
			logging: LoggingConfig::default(),
			api: ApiConfig::default(),
			database: DatabaseConfig::default(),
			jwt: JwtConfig::default(),
		}
	}
}

impl AppConfig {
	pub fn parse() -> Result<Self> {
		let (mut config, config_file) = common::config::parse::<Self>(!cfg!(test), Self::default().config_file)?;

		config.config_file = config_file;

		anyhow::ensure!(
			config.jwt.session_expiry(Utc::now()).is_some(),
			"jwt.session_ttl_secs is too large: {}",
			config.jwt.session_ttl_secs
		);

		Ok(config)
	}
}
