//! Configuration loading.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, then `LINKHUB_*` environment variables (`LINKHUB_BASE_URL`,
//! `LINKHUB_TIMEOUT_MS`, ...).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use linkhub_domain::{ClientConfig, DomainError};

/// Prefix of the environment variables read by [`load_client_config`].
pub const ENV_PREFIX: &str = "LINKHUB";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The merged values are out of range.
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Loads and validates the client configuration.
///
/// # Errors
///
/// Returns an error if `file` is given but unreadable, if a value has the
/// wrong type, or if the result fails [`ClientConfig::validate`].
pub fn load_client_config(file: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    load_with_environment(file, None)
}

fn load_with_environment(
    file: Option<&Path>,
    environment: Option<HashMap<String, String>>,
) -> Result<ClientConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = file {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(environment),
    );

    let config: ClientConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Default location of the session file: `<local data dir>/linkhub/session.json`.
#[must_use]
pub fn default_session_file() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("linkhub").join("session.json"))
}
