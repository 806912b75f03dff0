use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::Value;
use figment::Figment;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::logging;

/// Prefix for environment variable overrides, e.g. `SOCIAL_API__BIND_ADDRESS`.
pub const ENV_PREFIX: &str = "SOCIAL_";

/// Separates nested keys in environment variable names.
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct TlsConfig {
	/// The path to the TLS certificate
	#[serde(deserialize_with = "lenient_string")]
	pub cert: String,

	/// The path to the TLS private key
	#[serde(deserialize_with = "lenient_string")]
	pub key: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// The log level to use, this is a tracing env filter
	#[serde(deserialize_with = "lenient_string")]
	pub level: String,

	/// What logging mode we should use
	pub mode: logging::Mode,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			mode: logging::Mode::Default,
		}
	}
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
	#[error("config file {0} does not exist")]
	MissingFile(String),
	#[error("invalid override {0}, expected key=value")]
	Override(String),
	#[error("invalid command line: {0}")]
	Cli(#[from] clap::Error),
	#[error("invalid config: {0}")]
	Figment(#[from] figment::Error),
}

/// Deserializes a string field that an environment or command line override
/// may have turned into a number or boolean, e.g. `SOCIAL_JWT__SECRET=123456`.
pub fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
	Lenient::deserialize(deserializer).map(Lenient::into_string)
}

/// [`lenient_string`] for optional fields.
pub fn lenient_option_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
	Option::<Lenient>::deserialize(deserializer).map(|value| value.map(Lenient::into_string))
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum Lenient {
	String(String),
	Signed(i64),
	Unsigned(u64),
	Float(f64),
	Bool(bool),
}

impl Lenient {
	fn into_string(self) -> String {
		match self {
			Self::String(s) => s,
			Self::Signed(n) => n.to_string(),
			Self::Unsigned(n) => n.to_string(),
			Self::Float(n) => n.to_string(),
			Self::Bool(b) => b.to_string(),
		}
	}
}

/// Turns `key.sub=value` overrides into a provider. Values are parsed the same
/// way figment parses environment variables.
pub fn overrides<'a>(items: impl IntoIterator<Item = &'a str>) -> Result<Figment, ConfigError> {
	items.into_iter().try_fold(Figment::new(), |figment, item| {
		let (key, raw) = item
			.split_once('=')
			.filter(|(key, _)| !key.is_empty())
			.ok_or_else(|| ConfigError::Override(item.to_string()))?;

		let value = match raw.parse::<Value>() {
			Ok(value) => value,
			Err(never) => match never {},
		};

		Ok(figment.merge(Serialized::default(key, value)))
	})
}

fn cli() -> clap::Command {
	let name = std::env::args()
		.next()
		.and_then(|arg| Path::new(&arg).file_name().map(|n| n.to_string_lossy().into_owned()))
		.unwrap_or_else(|| "app".to_string());

	clap::Command::new(name)
		.arg(
			clap::Arg::new("config-file")
				.long("config-file")
				.short('c')
				.help("Path to a TOML config file"),
		)
		.arg(
			clap::Arg::new("set")
				.long("set")
				.action(clap::ArgAction::Append)
				.value_name("KEY=VALUE")
				.help("Override a config value, e.g. --set api.page_size=20"),
		)
}

/// Loads a config from (highest priority first) the command line, the
/// environment, a TOML file and finally the type's defaults.
///
/// The file is taken from `--config-file`, then `SOCIAL_CONFIG_FILE`, then
/// `config_file`. A missing default file is skipped, a missing file that was
/// asked for explicitly is an error. Returns the config and the canonical path
/// of the file that was loaded, if any.
pub fn parse<C: DeserializeOwned>(enable_cli: bool, config_file: Option<String>) -> Result<(C, Option<String>), ConfigError> {
	let cli = if enable_cli {
		let matches = cli().try_get_matches()?;

		let mut cli = overrides(matches.get_many::<String>("set").into_iter().flatten().map(String::as_str))?;
		if let Some(file) = matches.get_one::<String>("config-file") {
			cli = cli.merge(Serialized::default("config_file", file));
		}

		cli
	} else {
		Figment::new()
	};

	load(cli, config_file)
}

pub(crate) fn load<C: DeserializeOwned>(cli: Figment, config_file: Option<String>) -> Result<(C, Option<String>), ConfigError> {
	let overrides = Figment::new()
		.merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
		.merge(cli);

	let explicit = overrides.find_value("config_file").ok().and_then(|value| value.into_string());
	let key_provided = explicit.is_some();

	let mut figment = Figment::new();
	let mut config_path = None;

	if let Some(path) = explicit.or(config_file) {
		if Path::new(&path).is_file() {
			figment = figment.merge(Toml::file(&path));
			config_path = Some(
				std::fs::canonicalize(&path)
					.map(|p| p.display().to_string())
					.unwrap_or(path),
			);
		} else if key_provided {
			return Err(ConfigError::MissingFile(path));
		} else {
			tracing::debug!(path = %path, "config file not found, skipping");
		}
	}

	let mut figment = figment.merge(overrides);
	if let Some(path) = &config_path {
		figment = figment.merge(Serialized::default("config_file", path));
	}

	Ok((figment.extract()?, config_path))
}
