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

//! Wires a validated [`Config`] into a running node: opens the local store, builds the ring and
//! gossip transport, starts the lifecycler and store-pool reconciler, and serves the HTTP surface.

use crate::config::Config;
use anyhow::{Context, Result};
use dkv_distributor::Distributor;
use dkv_ring::{spawn_auto_forget, GossipTransport, Lifecycler, Purpose, Ring};
use dkv_server::AppState;
use dkv_store::{LocalStore, Store, StorePool};
use dkv_utils::metrics::{DistributorMetrics, GlobalMetrics, MetricsRegistry};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

/// How often the store pool reconciles its address -> `Store` map against the ring's healthy set.
const POOL_RECONCILE_PERIOD: Duration = Duration::from_secs(5);
/// How often the auto-forget sweeper checks for stale instances.
const FORGET_SWEEP_PERIOD: Duration = Duration::from_secs(5);

/// A fully wired node, ready to run. Everything it owns is started by [`Node::run`] and stopped
/// together when the caller's [`CancellationToken`] fires.
pub struct Node {
	config: Config,
	ring: Arc<Ring>,
	lifecycler: Arc<Lifecycler>,
	gossip: Arc<GossipTransport>,
	state: AppState,
}

impl Node {
	/// Builds every component from `config` without starting any background task. Fallible parts
	/// (opening the store, binding the gossip socket) happen here so `run` itself cannot fail.
	pub async fn bootstrap(config: Config) -> Result<Self> {
		dkv_utils::logging::init_logger(&config.logging);

		let local_store = LocalStore::open(&config.store.db.path)
			.with_context(|| format!("failed to open local store at {}", config.store.db.path))?;
		let local_store: Arc<dyn Store> = Arc::new(local_store);

		let heartbeat_timeout_micros = Duration::from_secs(config.lifecycler.heartbeat_timeout_secs).as_micros() as i64;
		let ring = Arc::new(Ring::new(config.ring.replication_factor, config.ring.max_unavailable, heartbeat_timeout_micros));

		let lifecycler = Lifecycler::new(config.lifecycler.clone(), ring.clone());
		let gossip = GossipTransport::bind(config.memberlist.clone(), ring.clone())
			.await
			.context("failed to bind gossip transport")?;

		let pool = StorePool::new(config.lifecycler.addr.clone(), local_store);
		{
			let ring = ring.clone();
			pool.spawn_reconciler(move || ring.healthy_set(Purpose::Serving, dkv_ring::now_micros()), POOL_RECONCILE_PERIOD);
		}

		let distributor_metrics = Arc::new(DistributorMetrics::new()?);
		let metrics = Arc::new(MetricsRegistry::new());
		if config.metrics.enabled {
			metrics.register(distributor_metrics.as_ref())?;
			let global = GlobalMetrics::new()?;
			metrics.register(&global)?;
			MetricsRegistry::spawn_standalone(global);
		}

		let distributor = Arc::new(Distributor::new(ring.clone(), pool.clone(), distributor_metrics));

		let state = AppState {
			distributor,
			pool,
			lifecycler: lifecycler.clone(),
			metrics,
			request_deadline: Duration::from_millis(config.server.request_deadline_millis),
			self_address: config.lifecycler.addr.clone(),
		};

		Ok(Node { config, ring, lifecycler, gossip, state })
	}

	/// Runs every background task (lifecycler, gossip, auto-forget) and serves the HTTP surface
	/// until `cancel` fires, then waits for the lifecycler to leave the ring before returning.
	pub async fn run(self, cancel: CancellationToken) -> Result<()> {
		let forget_period = Duration::from_secs(self.config.lifecycler.forget_period_secs);
		let forget_handle =
			spawn_auto_forget(self.ring.clone(), forget_period, FORGET_SWEEP_PERIOD, self.config.lifecycler.id.clone());
		let gossip_handles = self.gossip.clone().spawn(cancel.clone());
		let lifecycler_handle = tokio::spawn(self.lifecycler.clone().run(cancel.clone()));

		dkv_server::serve(&self.config.server, self.state.clone(), cancel.clone())
			.await
			.context("HTTP server failed")?;

		if let Err(err) = lifecycler_handle.await {
			log::warn!(target: "dkv", "lifecycler task did not shut down cleanly: {err}");
		}
		forget_handle.abort();
		for handle in gossip_handles {
			handle.abort();
		}
		Ok(())
	}

	/// This node's own `host:port`, as published to the ring.
	pub fn self_address(&self) -> &str {
		&self.config.lifecycler.addr
	}
}
