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

use crate::{
	error::{Result, StoreError},
	Store,
};
use async_trait::async_trait;
use std::path::Path;

/// Embedded, single-node storage backed by a copy-on-write B+ tree on disk. Every call crosses
/// into a blocking task since `jammdb` transactions are synchronous.
///
/// Buckets are created lazily on write; a `get` against a bucket that was never written to simply
/// reports a miss rather than materialising an empty bucket, since the two are observably
/// identical and creating one would require promoting every read to a write transaction.
pub struct LocalStore {
	db: jammdb::DB,
}

impl LocalStore {
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let db = jammdb::DB::open(path.as_ref())?;
		Ok(LocalStore { db })
	}

	pub fn close(self) -> Result<()> {
		Ok(())
	}
}

#[async_trait]
impl Store for LocalStore {
	async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
		let db = self.db.clone();
		let bucket = bucket.to_owned();
		let key = key.to_owned();
		tokio::task::spawn_blocking(move || -> Result<Option<Vec<u8>>> {
			let tx = db.tx(false)?;
			let found = match tx.get_bucket(&bucket) {
				Ok(b) => b.get(&key).map(|data| data.kv().value().to_vec()),
				Err(jammdb::Error::BucketMissing) => None,
				Err(err) => return Err(StoreError::Engine(err)),
			};
			Ok(found)
		})
		.await
		.expect("blocking task panicked")
	}

	async fn put(&self, bucket: &str, key: &str, value: Vec<u8>) -> Result<()> {
		let db = self.db.clone();
		let bucket = bucket.to_owned();
		let key = key.to_owned();
		tokio::task::spawn_blocking(move || -> Result<()> {
			let tx = db.tx(true)?;
			let b = tx.get_or_create_bucket(bucket)?;
			b.put(key, value)?;
			tx.commit()?;
			Ok(())
		})
		.await
		.expect("blocking task panicked")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn missing_bucket_is_a_miss_not_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let store = LocalStore::open(dir.path().join("data.db")).unwrap();
		assert_eq!(store.get("nosuchbucket", "k").await.unwrap(), None);
	}

	#[tokio::test]
	async fn put_then_get_round_trips() {
		let dir = tempfile::tempdir().unwrap();
		let store = LocalStore::open(dir.path().join("data.db")).unwrap();
		store.put("b", "k", b"v".to_vec()).await.unwrap();
		assert_eq!(store.get("b", "k").await.unwrap(), Some(b"v".to_vec()));
	}
}
