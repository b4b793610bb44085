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

//! The storage layer: a `Store` trait with a local (embedded) and a remote (HTTP) implementation,
//! the versioned-value envelope they exchange, and the pool that keeps one `Store` handle per
//! ring member alive.

pub mod error;
pub mod local;
pub mod pool;
pub mod remote;
pub mod versioned;

pub use error::{Result, StoreError};
pub use local::LocalStore;
pub use pool::StorePool;
pub use remote::RemoteStore;
pub use versioned::VersionedValue;

use async_trait::async_trait;

/// A single replica's storage backend, local or remote. The distributor only ever talks to this
/// trait, never to `LocalStore`/`RemoteStore` directly, so it can fan out across a mix of both.
#[async_trait]
pub trait Store: Send + Sync {
	/// Fetches the raw envelope bytes for `key` in `bucket`. Returns `Ok(None)` if the bucket or
	/// key does not exist; never auto-creates state as a side effect of reading.
	async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>>;

	/// Writes the raw envelope bytes for `key` in `bucket`, creating the bucket if absent.
	async fn put(&self, bucket: &str, key: &str, value: Vec<u8>) -> Result<()>;
}
