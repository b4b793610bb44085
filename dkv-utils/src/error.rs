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

use thiserror::Error;

/// Result type used by crates that don't need a more specific error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the ambient stack: config validation, metrics exposition, logging setup.
#[derive(Error, Debug)]
pub enum Error {
	/// A config section failed its own `Validate` pass.
	#[error("invalid configuration: {0}")]
	Config(String),
	/// Prometheus error.
	#[error("{0}")]
	Prometheus(#[from] prometheus::Error),
	/// Failed to read or parse the YAML config file.
	#[error("failed to load config from {path}: {source}")]
	LoadConfig { path: String, #[source] source: serde_yaml::Error },
	/// Failed to read the config file from disk, before it is even parsed as YAML.
	#[error("failed to read config file {path}: {source}")]
	ReadConfig { path: String, #[source] source: std::io::Error },
}
