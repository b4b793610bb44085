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

use crate::{config::MemberlistConfig, descriptor::RingDescriptor, ring::Ring};
use rand::seq::SliceRandom;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

/// Datagram-based gossip transport: periodic fanout to a few random peers plus a slower full
/// state exchange, the minimum the ring descriptor's CRDT merge needs for convergence
/// (deterministic merge, bounded retransmit, anti-entropy via full state on the push-pull
/// interval). Not a wire-compatible reimplementation of any particular gossip protocol, just the
/// smallest transport that satisfies those three requirements over plain UDP datagrams.
pub struct GossipTransport {
	config: MemberlistConfig,
	ring: Arc<Ring>,
	socket: UdpSocket,
	known_peers: tokio::sync::Mutex<Vec<SocketAddr>>,
}

const MAX_DATAGRAM: usize = 64 * 1024;

impl GossipTransport {
	pub async fn bind(config: MemberlistConfig, ring: Arc<Ring>) -> std::io::Result<Arc<Self>> {
		let bind_addr = format!("{}:{}", config.bind_addr, config.bind_port);
		let socket = UdpSocket::bind(&bind_addr).await?;
		let known_peers = config
			.join_members
			.iter()
			.filter_map(|addr| addr.parse().ok())
			.collect::<Vec<SocketAddr>>();
		log::info!("gossip transport bound on {bind_addr}, seeded with {} peers", known_peers.len());
		Ok(Arc::new(GossipTransport { config, ring, socket, known_peers: tokio::sync::Mutex::new(known_peers) }))
	}

	/// Spawns the receive loop, the fast periodic gossip tick and the slower full push-pull tick.
	/// All three stop once `cancel` fires.
	pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> Vec<tokio::task::JoinHandle<()>> {
		vec![self.clone().spawn_recv_loop(cancel.clone()), self.clone().spawn_gossip_tick(cancel.clone()), self.spawn_push_pull_tick(cancel)]
	}

	fn spawn_recv_loop(self: Arc<Self>, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
		tokio::spawn(async move {
			let mut buf = vec![0u8; MAX_DATAGRAM];
			loop {
				tokio::select! {
					result = self.socket.recv_from(&mut buf) => {
						match result {
							Ok((len, from)) => self.handle_datagram(&buf[..len], from).await,
							Err(err) => log::warn!("gossip recv error: {err}"),
						}
					},
					_ = cancel.cancelled() => return,
				}
			}
		})
	}

	async fn handle_datagram(&self, bytes: &[u8], from: SocketAddr) {
		match serde_json::from_slice::<RingDescriptor>(bytes) {
			Ok(incoming) => self.ring.merge_and_publish(&incoming),
			Err(err) => log::debug!("dropping malformed gossip datagram from {from}: {err}"),
		}
		let mut peers = self.known_peers.lock().await;
		if !peers.contains(&from) {
			peers.push(from);
		}
	}

	fn spawn_gossip_tick(self: Arc<Self>, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(Duration::from_millis(self.config.gossip_interval_millis));
			loop {
				tokio::select! {
					_ = ticker.tick() => self.fanout(self.config.gossip_nodes).await,
					_ = cancel.cancelled() => return,
				}
			}
		})
	}

	fn spawn_push_pull_tick(self: Arc<Self>, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(Duration::from_secs(self.config.push_pull_interval_secs));
			loop {
				tokio::select! {
					_ = ticker.tick() => self.fanout(1).await,
					_ = cancel.cancelled() => return,
				}
			}
		})
	}

	async fn fanout(&self, count: usize) {
		let targets = {
			let peers = self.known_peers.lock().await;
			let mut rng = rand::thread_rng();
			peers.choose_multiple(&mut rng, count.min(peers.len())).copied().collect::<Vec<_>>()
		};
		if targets.is_empty() {
			return;
		}
		let payload = match serde_json::to_vec(&*self.ring.snapshot()) {
			Ok(bytes) => bytes,
			Err(err) => {
				log::warn!("failed to encode ring descriptor for gossip: {err}");
				return;
			},
		};
		for target in targets {
			if let Err(err) = self.socket.send_to(&payload, target).await {
				log::debug!("gossip send to {target} failed: {err}");
			}
		}
	}

	/// Retransmit multiplier reserved for a future fanout-with-retry scheme; currently only
	/// consulted by callers that want to size their own retry budget off it.
	pub fn retransmit_mult(&self) -> usize {
		self.config.retransmit_mult
	}
}
