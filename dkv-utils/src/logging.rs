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

use serde::{Deserialize, Serialize};
use std::io::Write;

/// `logging` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// `error | warn | info | debug | trace`, or a `target=level,...` filter string.
	pub level: String,
	/// `plain` or `json`.
	pub format: LogFormat,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		LoggingConfig { level: "info".into(), format: LogFormat::Plain }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Plain,
	Json,
}

/// Initialise the global logger from config. Idempotent-ish: like `env_logger`, calling this more
/// than once will panic, so callers must only do it once at process start.
pub fn init_logger(config: &LoggingConfig) {
	let mut builder = env_logger::Builder::new();
	builder.parse_filters(&config.level);
	match config.format {
		LogFormat::Plain => {
			builder.format(|buf, record| {
				writeln!(
					buf,
					"{} {:>5} {}: {}",
					buf.timestamp_millis(),
					record.level(),
					record.target(),
					record.args(),
				)
			});
		},
		LogFormat::Json => {
			builder.format(|buf, record| {
				writeln!(
					buf,
					r#"{{"ts":"{}","level":"{}","target":"{}","msg":"{}"}}"#,
					buf.timestamp_millis(),
					record.level(),
					record.target(),
					record.args(),
				)
			});
		},
	}
	builder.init();
}
