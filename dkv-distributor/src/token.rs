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

/// Maps a `(bucket, key)` pair to a ring token. Every node in a cluster must agree on the same
/// strategy, since token placement is how replicas are chosen.
pub trait TokenStrategy: Send + Sync {
	fn token(&self, bucket: &str, key: &str) -> u32;
}

/// The default: an additive byte-sum checksum mod 2^32. Weak as a hash, but deterministic across
/// any implementation that walks the same bytes in order, and required for interoperability with
/// clusters whose nodes run different builds during a rolling upgrade.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdditiveChecksum;

impl TokenStrategy for AdditiveChecksum {
	fn token(&self, bucket: &str, key: &str) -> u32 {
		let sum: u32 = bucket.bytes().chain(key.bytes()).fold(0u32, |acc, b| acc.wrapping_add(b as u32));
		sum
	}
}

/// FNV-1a, offered as an opt-in stronger alternative for deployments that don't need
/// interoperability with the reference placement behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fnv1a;

impl TokenStrategy for Fnv1a {
	fn token(&self, bucket: &str, key: &str) -> u32 {
		const OFFSET_BASIS: u32 = 0x811c9dc5;
		const PRIME: u32 = 0x01000193;
		bucket.bytes().chain(key.bytes()).fold(OFFSET_BASIS, |hash, b| (hash ^ b as u32).wrapping_mul(PRIME))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn additive_checksum_matches_reference_fixtures() {
		let strategy = AdditiveChecksum;
		assert_eq!(strategy.token("", "hello world"), 1116);
		assert_eq!(strategy.token("", "\u{1}\u{2}\u{3}\u{4}\u{5}"), 15);
	}

	#[test]
	fn additive_checksum_includes_bucket_bytes() {
		let strategy = AdditiveChecksum;
		assert_ne!(strategy.token("bucket", "key"), strategy.token("", "key"));
	}
}
