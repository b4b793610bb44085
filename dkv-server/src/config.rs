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

use dkv_utils::{config::Validate, error::Error, Result};
use serde::{Deserialize, Serialize};

/// `server` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ServerConfig {
	pub bind_ip: String,
	pub http_listen_port: u16,
	pub request_deadline_millis: u64,
}

impl Default for ServerConfig {
	fn default() -> Self {
		ServerConfig { bind_ip: "0.0.0.0".into(), http_listen_port: 8080, request_deadline_millis: 2_000 }
	}
}

impl Validate for ServerConfig {
	fn validate(&self) -> Result<()> {
		if self.bind_ip.is_empty() {
			return Err(Error::Config("server.bind_ip required".into()));
		}
		if self.http_listen_port == 0 {
			return Err(Error::Config("server.http_listen_port required".into()));
		}
		Ok(())
	}
}

impl ServerConfig {
	pub fn bind_addr(&self) -> String {
		format!("{}:{}", self.bind_ip, self.http_listen_port)
	}
}
