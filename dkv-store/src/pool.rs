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

use crate::{remote::RemoteStore, Store};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::RwLock;

/// Address -> `Store` handle, kept in sync with ring membership by a background reconciler task.
///
/// Lookups never touch the network: `get` only reads the map. All writes to the map happen on
/// the reconciler task, so concurrent `get`s never block on I/O.
pub struct StorePool {
	self_address: String,
	local: Arc<dyn Store>,
	entries: RwLock<HashMap<String, Arc<dyn Store>>>,
}

impl StorePool {
	pub fn new(self_address: impl Into<String>, local: Arc<dyn Store>) -> Arc<Self> {
		Arc::new(StorePool { self_address: self_address.into(), local, entries: RwLock::new(HashMap::new()) })
	}

    pub async fn get(&self, addr: &str) -> Option<Arc<dyn Store>> {
		self.entries.read().await.get(addr).cloned()
	}

	pub async fn contains(&self, addr: &str) -> bool {
		self.entries.read().await.contains_key(addr)
	}

	async fn register(&self, addr: String, store: Arc<dyn Store>) {
		self.entries.write().await.insert(addr, store);
	}

	async fn unregister(&self, addr: &str) {
		self.entries.write().await.remove(addr);
	}

	/// Reconciles the pool's membership against `healthy_set` once. `self` always resolves to the
	/// local store regardless of what address `healthy_set` reports for it.
	async fn reconcile_once(self: &Arc<Self>, healthy_set: &[String]) {
		let wanted: std::collections::HashSet<&str> = healthy_set.iter().map(String::as_str).collect();

		let stale: Vec<String> = {
			let entries = self.entries.read().await;
			entries.keys().filter(|addr| !wanted.contains(addr.as_str())).cloned().collect()
		};
		for addr in stale {
			self.unregister(&addr).await;
		}

		for addr in healthy_set {
			if self.contains(addr).await {
				continue;
			}
			if *addr == self.self_address {
				self.register(addr.clone(), self.local.clone()).await;
			} else {
				match RemoteStore::new(addr.clone()) {
					Ok(remote) => self.register(addr.clone(), Arc::new(remote)).await,
					Err(err) => log::warn!("failed to build remote store for {addr}: {err}"),
				}
			}
		}
	}

	/// Spawns the background reconciler. `healthy_set` is called once per `period` and should
	/// return the current set of reachable addresses (self included) from the ring.
	pub fn spawn_reconciler<F>(self: &Arc<Self>, healthy_set: F, period: Duration) -> tokio::task::JoinHandle<()>
	where
		F: Fn() -> Vec<String> + Send + Sync + 'static,
	{
		let pool = self.clone();
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(period);
			loop {
				ticker.tick().await;
				pool.reconcile_once(&healthy_set()).await;
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Result;
	use async_trait::async_trait;

	struct NullStore;

	#[async_trait]
	impl Store for NullStore {
		async fn get(&self, _bucket: &str, _key: &str) -> Result<Option<Vec<u8>>> {
			Ok(None)
		}
		async fn put(&self, _bucket: &str, _key: &str, _value: Vec<u8>) -> Result<()> {
			Ok(())
		}
	}

	#[tokio::test]
	async fn reconcile_registers_self_and_peers_and_drops_stale() {
		let pool = StorePool::new("self:1", Arc::new(NullStore));
		pool.reconcile_once(&["self:1".into(), "peer:2".into()]).await;
		assert!(pool.contains("self:1").await);
		assert!(pool.contains("peer:2").await);

		pool.reconcile_once(&["self:1".into()]).await;
		assert!(!pool.contains("peer:2").await);
	}
}
