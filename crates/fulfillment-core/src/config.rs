//! Configuration module for the fulfillment core.
//!
//! Provides structures and utilities for managing fulfillment configuration.
//! Configuration is loaded from TOML files; every setting has a default so a
//! missing section falls back to production values rather than failing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the fulfillment core.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
	/// Configuration for the storage backend.
	#[serde(default)]
	pub storage: StorageConfig,
	/// Configuration for the SLA scheduler.
	#[serde(default)]
	pub scheduler: SchedulerSettings,
	/// Time-bound order policy.
	#[serde(default)]
	pub policy: PolicySettings,
}

/// Which storage backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
	/// Volatile in-memory store, for development and tests.
	Memory,
	/// One JSON file per record under `path`.
	File,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use.
	#[serde(default = "default_storage_backend")]
	pub backend: StorageBackendKind,
	/// Base directory for the file backend.
	#[serde(default = "default_storage_path")]
	pub path: PathBuf,
}

fn default_storage_backend() -> StorageBackendKind {
	StorageBackendKind::File
}

fn default_storage_path() -> PathBuf {
	PathBuf::from("./data/storage")
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			backend: default_storage_backend(),
			path: default_storage_path(),
		}
	}
}

/// Configuration for the SLA scheduler.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerSettings {
	/// Seconds between auto-cancel scans.
	#[serde(default = "default_tick_interval_seconds")]
	pub tick_interval_seconds: u64,
	/// Seconds between prunes of the scheduler's own run history.
	#[serde(default = "default_prune_interval_seconds")]
	pub prune_interval_seconds: u64,
	/// Seconds a scheduler run record is kept before pruning.
	#[serde(default = "default_run_history_max_age_seconds")]
	pub run_history_max_age_seconds: u64,
}

fn default_tick_interval_seconds() -> u64 {
	60
}

/// One week, matching the run-history retention.
fn default_prune_interval_seconds() -> u64 {
	604_800
}

fn default_run_history_max_age_seconds() -> u64 {
	604_800
}

impl Default for SchedulerSettings {
	fn default() -> Self {
		Self {
			tick_interval_seconds: default_tick_interval_seconds(),
			prune_interval_seconds: default_prune_interval_seconds(),
			run_history_max_age_seconds: default_run_history_max_age_seconds(),
		}
	}
}

impl SchedulerSettings {
	pub fn tick_interval(&self) -> Duration {
		Duration::from_secs(self.tick_interval_seconds)
	}

	pub fn prune_interval(&self) -> Duration {
		Duration::from_secs(self.prune_interval_seconds)
	}

	pub fn run_history_max_age(&self) -> Duration {
		Duration::from_secs(self.run_history_max_age_seconds)
	}
}

/// Time-bound order policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicySettings {
	/// Minutes a vendor has to confirm a pending order before the
	/// scheduler cancels it.
	#[serde(default = "default_confirmation_grace_minutes")]
	pub confirmation_grace_minutes: u64,
	/// Minutes after confirmation during which the customer may still
	/// cancel.
	#[serde(default = "default_cancellation_window_minutes")]
	pub cancellation_window_minutes: u64,
}

fn default_confirmation_grace_minutes() -> u64 {
	10
}

fn default_cancellation_window_minutes() -> u64 {
	10
}

impl Default for PolicySettings {
	fn default() -> Self {
		Self {
			confirmation_grace_minutes: default_confirmation_grace_minutes(),
			cancellation_window_minutes: default_cancellation_window_minutes(),
		}
	}
}

impl PolicySettings {
	pub fn confirmation_grace(&self) -> Duration {
		Duration::from_secs(self.confirmation_grace_minutes * 60)
	}

	pub fn cancellation_window(&self) -> Duration {
		Duration::from_secs(self.cancellation_window_minutes * 60)
	}
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path)?;
		Self::from_toml_str(&contents)
	}

	/// Parses and validates configuration from a TOML string.
	pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(contents)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks that all configured values are usable.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.scheduler.tick_interval_seconds == 0 {
			return Err(ConfigError::Validation(
				"scheduler.tick_interval_seconds must be positive".into(),
			));
		}
		if self.scheduler.prune_interval_seconds == 0 {
			return Err(ConfigError::Validation(
				"scheduler.prune_interval_seconds must be positive".into(),
			));
		}
		if self.policy.confirmation_grace_minutes == 0 {
			return Err(ConfigError::Validation(
				"policy.confirmation_grace_minutes must be positive".into(),
			));
		}
		if self.policy.cancellation_window_minutes == 0 {
			return Err(ConfigError::Validation(
				"policy.cancellation_window_minutes must be positive".into(),
			));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_the_service_levels() {
		let config = Config::default();
		assert_eq!(config.scheduler.tick_interval(), Duration::from_secs(60));
		assert_eq!(
			config.policy.confirmation_grace(),
			Duration::from_secs(600)
		);
		assert_eq!(
			config.policy.cancellation_window(),
			Duration::from_secs(600)
		);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn parses_partial_toml() {
		let config = Config::from_toml_str(
			r#"
			[storage]
			backend = "memory"

			[policy]
			confirmation_grace_minutes = 15
			"#,
		)
		.unwrap();

		assert_eq!(config.storage.backend, StorageBackendKind::Memory);
		assert_eq!(config.policy.confirmation_grace_minutes, 15);
		// Untouched sections keep their defaults.
		assert_eq!(config.policy.cancellation_window_minutes, 10);
		assert_eq!(config.scheduler.tick_interval_seconds, 60);
	}

	#[test]
	fn rejects_zero_intervals() {
		let result = Config::from_toml_str(
			r#"
			[scheduler]
			tick_interval_seconds = 0
			"#,
		);
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn rejects_unknown_backend() {
		let result = Config::from_toml_str(
			r#"
			[storage]
			backend = "postgres"
			"#,
		);
		assert!(matches!(result, Err(ConfigError::Parse(_))));
	}
}
