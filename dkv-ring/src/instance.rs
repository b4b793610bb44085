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

/// A node's membership state. Ordered `Joining < Active < Leaving < Left`: when two gossiped
/// records of the same instance carry the same `timestamp`, the later state wins the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InstanceState {
	Joining,
	Active,
	Leaving,
	Left,
}

/// One cluster member as carried in the gossiped [`crate::descriptor::RingDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
	/// Stable identifier, typically the hostname.
	pub id: String,
	/// `host:port` at which peers reach this instance's internal API.
	pub addr: String,
	pub zone: Option<String>,
	pub state: InstanceState,
	pub tokens: Vec<u32>,
	/// Microseconds since the epoch; the clock the gossip merger compares on.
    pub timestamp_micros: i64,
}

impl Instance {
	pub fn is_healthy(&self, now_micros: i64, heartbeat_timeout_micros: i64) -> bool {
		self.state == InstanceState::Active && now_micros - self.timestamp_micros <= heartbeat_timeout_micros
	}
}
