//! Client configuration loaded from TOML.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::FileSessionStore;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or field types.
	#[error("TOML parse error in {path}: {error}")]
	Parse {
		/// Path to the offending file.
		path: PathBuf,
		/// The underlying parse error.
		error: toml::de::Error,
	},
}

/// Where and how the client talks to the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
	/// API origin, optionally with a path prefix.
	pub base_url: String,
	/// Per-request timeout in seconds.
	pub timeout_secs: u64,
	/// Login entry point announced when the server rejects the credential.
	pub login_path: String,
	/// Session file override. Defaults to `<config_dir>/jobline/session.json`.
	pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: "http://localhost:8000".to_string(),
			timeout_secs: 30,
			login_path: "/login".to_string(),
			session_file: None,
		}
	}
}

impl ClientConfig {
	/// Loads configuration from `path`. A missing file yields defaults.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let text = match fs::read_to_string(path) {
			Ok(text) => text,
			Err(error) if error.kind() == ErrorKind::NotFound => {
				tracing::debug!(path = %path.display(), "config.missing");
				return Ok(Self::default());
			}
			Err(error) => {
				return Err(ConfigError::Io {
					path: path.to_path_buf(),
					error,
				});
			}
		};
		Self::parse(&text).map_err(|error| ConfigError::Parse {
			path: path.to_path_buf(),
			error,
		})
	}

	/// Parses configuration from TOML text.
	pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(text)
	}

	/// `<config_dir>/jobline/config.toml`.
	pub fn default_path() -> Option<PathBuf> {
		Some(dirs::config_dir()?.join("jobline").join("config.toml"))
	}

	/// Request timeout.
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	/// Session store for this configuration, if a location can be resolved.
	pub fn session_store(&self) -> Option<FileSessionStore> {
		match &self.session_file {
			Some(path) => Some(FileSessionStore::new(path)),
			None => FileSessionStore::default_location(),
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn missing_file_yields_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let config = ClientConfig::load(&dir.path().join("config.toml")).unwrap();
		assert_eq!(config, ClientConfig::default());
		assert_eq!(config.timeout(), Duration::from_secs(30));
	}

	#[test]
	fn partial_file_overrides_fields() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		fs::write(
			&path,
			"base_url = \"https://jobs.example.com/api\"\nsession_file = \"/tmp/s.json\"\n",
		)
		.unwrap();

		let config = ClientConfig::load(&path).unwrap();
		assert_eq!(config.base_url, "https://jobs.example.com/api");
		assert_eq!(config.login_path, "/login");
		assert_eq!(config.session_store().unwrap().path(), Path::new("/tmp/s.json"));
	}

	#[test]
	fn rejects_unknown_keys_and_bad_types() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		fs::write(&path, "timeout_secs = \"soon\"\n").unwrap();
		assert!(matches!(ClientConfig::load(&path), Err(ConfigError::Parse { .. })));

		assert!(ClientConfig::parse("base_uri = \"x\"").is_err());
	}

	#[test]
	fn directory_path_is_io_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = ClientConfig::load(dir.path()).unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }));
		assert!(err.to_string().contains("I/O error"));
	}
}
