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

/// `lifecycler` config section: this node's identity and the timing of its state transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct LifecyclerConfig {
	pub id: String,
	pub addr: String,
	pub zone: Option<String>,
	pub num_tokens: usize,
	pub tokens_file_path: Option<String>,
	pub observe_period_secs: u64,
	pub heartbeat_period_secs: u64,
	pub heartbeat_timeout_secs: u64,
	pub final_sleep_secs: u64,
	pub forget_period_secs: u64,
	pub unregister_on_shutdown: bool,
}

impl Default for LifecyclerConfig {
	fn default() -> Self {
		LifecyclerConfig {
			id: String::new(),
			addr: String::new(),
			zone: None,
			num_tokens: 128,
			tokens_file_path: None,
			observe_period_secs: 10,
			heartbeat_period_secs: 5,
			heartbeat_timeout_secs: 30,
			final_sleep_secs: 0,
			forget_period_secs: 60,
			unregister_on_shutdown: true,
		}
	}
}

impl Validate for LifecyclerConfig {
	fn validate(&self) -> Result<()> {
		if self.id.is_empty() {
			return Err(Error::Config("lifecycler.id required".into()));
		}
		if self.addr.is_empty() {
			return Err(Error::Config("lifecycler.addr required".into()));
		}
		if self.num_tokens == 0 {
			return Err(Error::Config("lifecycler.num_tokens must be > 0".into()));
		}
		Ok(())
	}
}

/// `memberlist` config section: the gossip transport's own timing knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct MemberlistConfig {
	pub bind_addr: String,
	pub bind_port: u16,
	pub join_members: Vec<String>,
	pub gossip_interval_millis: u64,
	pub gossip_nodes: usize,
	pub push_pull_interval_secs: u64,
	pub retransmit_mult: usize,
}

impl Default for MemberlistConfig {
	fn default() -> Self {
		MemberlistConfig {
			bind_addr: "0.0.0.0".into(),
			bind_port: 7946,
			join_members: Vec::new(),
			gossip_interval_millis: 200,
			gossip_nodes: 3,
			push_pull_interval_secs: 30,
			retransmit_mult: 4,
		}
	}
}

impl Validate for MemberlistConfig {
	fn validate(&self) -> Result<()> {
		if self.bind_port == 0 {
			return Err(Error::Config("memberlist.bind_port required".into()));
		}
		Ok(())
	}
}

/// `ring` config section: replication parameters shared by every operation against the ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct RingConfig {
	pub replication_factor: usize,
	pub max_unavailable: usize,
}

impl Default for RingConfig {
	fn default() -> Self {
		RingConfig { replication_factor: 3, max_unavailable: 1 }
	}
}

impl Validate for RingConfig {
	fn validate(&self) -> Result<()> {
		if self.replication_factor == 0 {
			return Err(Error::Config("ring.replication_factor must be > 0".into()));
		}
		if self.max_unavailable >= self.replication_factor {
			return Err(Error::Config("ring.max_unavailable must be less than replication_factor".into()));
		}
		Ok(())
	}
}
