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

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// The envelope actually stored on disk and exchanged between peers: a value plus the two
/// timestamps the distributor needs to reconcile diverging replicas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedValue {
	/// Milliseconds since the epoch, set once when the key is first written.
	pub created_at: i64,
	/// Milliseconds since the epoch, refreshed on every write that reaches this replica.
	pub updated_at: i64,
	#[serde(with = "base64_bytes")]
	pub value: Vec<u8>,
}

impl VersionedValue {
	pub fn new(now_ms: i64, value: Vec<u8>) -> Self {
		VersionedValue { created_at: now_ms, updated_at: now_ms, value }
	}

	pub fn marshal(&self) -> Result<Vec<u8>> {
		Ok(serde_json::to_vec(self)?)
	}

	pub fn unmarshal(bytes: &[u8]) -> Result<Self> {
		Ok(serde_json::from_slice(bytes)?)
	}

	/// Picks the winner between two replicas of the same key. Last-writer-wins on `updated_at`;
	/// ties break on the value bytes so reconciliation is deterministic across replicas.
	pub fn reconcile(self, other: Self) -> Self {
		match self.updated_at.cmp(&other.updated_at) {
			std::cmp::Ordering::Greater => self,
			std::cmp::Ordering::Less => other,
			std::cmp::Ordering::Equal =>
				if self.value <= other.value {
					self
				} else {
					other
				},
		}
	}
}

mod base64_bytes {
	use base64::Engine;
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
		let encoded = String::deserialize(deserializer)?;
		base64::engine::general_purpose::STANDARD
			.decode(encoded)
			.map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_through_json() {
		let value = VersionedValue::new(1_000, b"hello".to_vec());
		let bytes = value.marshal().unwrap();
		assert_eq!(VersionedValue::unmarshal(&bytes).unwrap(), value);
	}

	#[test]
	fn reconcile_prefers_newer_updated_at() {
		let older = VersionedValue { created_at: 0, updated_at: 10, value: b"a".to_vec() };
		let newer = VersionedValue { created_at: 0, updated_at: 20, value: b"b".to_vec() };
		assert_eq!(older.clone().reconcile(newer.clone()), newer);
		assert_eq!(newer.reconcile(older), VersionedValue { created_at: 0, updated_at: 20, value: b"b".to_vec() });
	}

	#[test]
	fn reconcile_breaks_ties_on_value_bytes() {
		let a = VersionedValue { created_at: 0, updated_at: 10, value: b"aaa".to_vec() };
		let b = VersionedValue { created_at: 0, updated_at: 10, value: b"zzz".to_vec() };
		assert_eq!(a.clone().reconcile(b.clone()), a);
	}
}
