// Copyright 2019-2021 Parity Technologies (UK) Ltd.
// This file is part of dkv.

// dkv is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// dkv is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with dkv.  If not, see <http://www.gnu.org/licenses/>.

//! The top-level `dkv.yaml` schema: one section per component, each validated by its own
//! `Validate` impl and composed here with [`dkv_utils::config::validate_all`].
//!
//! `ring:` is its own top-level section rather than nested under `lifecycler:`, since `dkv-ring`
//! models `Ring` and `Lifecycler` as independent types with independent config. See DESIGN.md.

use dkv_ring::{LifecyclerConfig, MemberlistConfig, RingConfig};
use dkv_server::ServerConfig;
use dkv_utils::{
	config::{validate_all, Validate},
	error::Error,
	logging::LoggingConfig,
	Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// `store.db` config section: the embedded local store's on-disk location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct DbConfig {
	pub path: String,
}

impl Validate for DbConfig {
	fn validate(&self) -> Result<()> {
		if self.path.is_empty() {
			return Err(Error::Config("store.db.path required".into()));
		}
		Ok(())
	}
}

/// `store` config section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct StoreConfig {
	pub db: DbConfig,
}

impl Validate for StoreConfig {
	fn validate(&self) -> Result<()> {
		self.db.validate()
	}
}

/// `metrics` config section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct MetricsConfig {
	pub enabled: bool,
}

impl Default for MetricsConfig {
	fn default() -> Self {
		MetricsConfig { enabled: true }
	}
}

/// The full `dkv.yaml` schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
	pub store: StoreConfig,
	pub server: ServerConfig,
	pub lifecycler: LifecyclerConfig,
	pub ring: RingConfig,
	pub memberlist: MemberlistConfig,
	pub logging: LoggingConfig,
	pub metrics: MetricsConfig,
}

impl Config {
	/// Reads and parses the YAML config at `path`. Does not validate it; callers must call
	/// [`Validate::validate`] themselves before acting on the result.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let path_str = path.display().to_string();
		let contents = std::fs::read_to_string(path)
			.map_err(|source| Error::ReadConfig { path: path_str.clone(), source })?;
		serde_yaml::from_str(&contents).map_err(|source| Error::LoadConfig { path: path_str, source })
	}
}

impl Validate for Config {
	fn validate(&self) -> Result<()> {
		validate_all(&[
			("store", &|| self.store.validate()),
			("server", &|| self.server.validate()),
			("lifecycler", &|| self.lifecycler.validate()),
			("ring", &|| self.ring.validate()),
			("memberlist", &|| self.memberlist.validate()),
		])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_round_trips_through_yaml() {
		let config = Config::default();
		let yaml = serde_yaml::to_string(&config).unwrap();
		let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
		assert_eq!(parsed.ring.replication_factor, config.ring.replication_factor);
	}

	#[test]
	fn default_config_fails_validation_without_required_fields() {
		let config = Config::default();
		let err = config.validate().unwrap_err();
		assert!(matches!(err, Error::Config(_)));
	}

	#[test]
	fn load_surfaces_missing_file_as_read_config_error() {
		let err = Config::load("/no/such/dkv.yaml").unwrap_err();
		assert!(matches!(err, Error::ReadConfig { .. }));
	}
}
