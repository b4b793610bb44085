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
	descriptor::RingDescriptor,
	error::{Result, RingError},
	instance::InstanceState,
};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// What an operation needs from the replica set it is handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
	/// A read tolerates a replica whose heartbeat is stale; a stale read is still worth trying.
	Read,
	/// A write targets exactly the canonical replicas and is never extended to route around an
	/// unhealthy one.
	WriteNoExtend,
}

/// Who is asking for the healthy set, and therefore which states should be visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
	/// Normal request routing: only `Active` instances with a fresh heartbeat.
	Serving,
	/// Operational tooling: also admits `Joining`/`Leaving` instances.
	Reporting,
}

/// One replica's routable identity, as handed to the distributor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDesc {
	pub id: String,
	pub addr: String,
}

/// The live, atomically-published ring. Readers never block the gossip merger: every read takes
/// an `Arc` snapshot of the descriptor and walks it locally.
pub struct Ring {
	descriptor: ArcSwap<RingDescriptor>,
	replication_factor: usize,
	max_unavailable: usize,
	heartbeat_timeout_micros: i64,
}

impl Ring {
	pub fn new(replication_factor: usize, max_unavailable: usize, heartbeat_timeout_micros: i64) -> Self {
		Ring {
			descriptor: ArcSwap::from_pointee(RingDescriptor::new()),
			replication_factor,
			max_unavailable,
			heartbeat_timeout_micros,
		}
	}

	pub fn snapshot(&self) -> Arc<RingDescriptor> {
		self.descriptor.load_full()
	}

	/// Merges `incoming` (as received over gossip) into the current descriptor and publishes the
	/// result via `ArcSwap::rcu`, so a concurrent heartbeat or eviction racing this merge composes
	/// onto whatever the other writer just published instead of clobbering it with a stale
	/// load-then-store.
	pub fn merge_and_publish(&self, incoming: &RingDescriptor) {
		self.descriptor.rcu(|current| current.merge(incoming));
	}

	/// Atomically applies `mutate` to the current descriptor and publishes the result, retrying
	/// under contention the same way `merge_and_publish` does. Used for local mutations (this
	/// node's own heartbeat, auto-forget eviction, leaving the ring) that aren't merges of an
	/// externally-gossiped descriptor but still must not race one.
	pub fn update<F>(&self, mut mutate: F)
	where
		F: FnMut(&RingDescriptor) -> RingDescriptor,
	{
		self.descriptor.rcu(|current| mutate(current));
	}

	/// Strict variant: errors eagerly if fewer than `required` replicas are available. Suited to
	/// callers that want a go/no-go answer before doing any I/O.
	pub fn replicas_for(&self, token: u32, op: Op, now_micros: i64) -> Result<Vec<InstanceDesc>> {
		let replicas = self.candidate_replicas(token, op, now_micros)?;
		let required = self.required_replicas();
		if replicas.len() < required {
			return Err(RingError::InsufficientReplicas {
				available: replicas.len(),
				required,
				max_unavailable: self.max_unavailable,
			});
		}
		Ok(replicas)
	}

	/// Best-effort variant: returns whatever replicas are available, even if fewer than
	/// `required`, deferring the insufficient-replicas decision to the caller's own quorum loop
	/// (a lookup may still succeed from a single responding replica even if the ring looks
	/// thin). Only fails if the ring has no instances at all.
	pub fn candidate_replicas(&self, token: u32, op: Op, now_micros: i64) -> Result<Vec<InstanceDesc>> {
		let snapshot = self.snapshot();
		if snapshot.is_empty() {
			return Err(RingError::EmptyRing);
		}
		let sequence = snapshot.token_sequence();
		if sequence.is_empty() {
			return Ok(Vec::new());
		}
		let start = sequence.partition_point(|(t, _)| *t < token);

		let mut seen = std::collections::HashSet::new();
		let mut replicas = Vec::with_capacity(self.replication_factor);
		for i in 0..sequence.len() {
			let (_, id) = sequence[(start + i) % sequence.len()];
			if !seen.insert(id) {
				continue;
			}
			let Some(instance) = snapshot.get(id) else { continue };
			if instance.state == InstanceState::Left {
				continue;
			}
			if op == Op::WriteNoExtend
				&& instance.state == InstanceState::Active
				&& now_micros - instance.timestamp_micros > self.heartbeat_timeout_micros
			{
				continue;
			}
			replicas.push(InstanceDesc { id: instance.id.clone(), addr: instance.addr.clone() });
			if replicas.len() == self.replication_factor {
				break;
			}
		}
		Ok(replicas)
	}

	pub fn healthy_set(&self, purpose: Purpose, now_micros: i64) -> Vec<String> {
		let snapshot = self.snapshot();
		snapshot
			.instances()
			.filter(|inst| match purpose {
				Purpose::Serving => inst.is_healthy(now_micros, self.heartbeat_timeout_micros),
				Purpose::Reporting => matches!(
					inst.state,
					InstanceState::Active | InstanceState::Joining | InstanceState::Leaving
				),
			})
			.map(|inst| inst.addr.clone())
			.collect()
	}

	pub fn required_replicas(&self) -> usize {
		self.replication_factor - self.max_unavailable
	}

	pub fn replication_factor(&self) -> usize {
		self.replication_factor
	}

	pub fn max_unavailable(&self) -> usize {
		self.max_unavailable
	}

	/// Seeds the descriptor outright, bypassing `rcu`. Only meant for tests that need to set up
	/// an initial ring state with no concurrent writer to race; production code always goes
	/// through [`Ring::merge_and_publish`] or [`Ring::update`].
	#[cfg(test)]
	fn seed(&self, descriptor: RingDescriptor) {
		self.descriptor.store(Arc::new(descriptor));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::instance::Instance;

	fn descriptor_with(instances: Vec<Instance>) -> RingDescriptor {
		let mut d = RingDescriptor::new();
		for i in instances {
			d.upsert(i);
		}
		d
	}

	fn active(id: &str, tokens: Vec<u32>, ts: i64) -> Instance {
		Instance { id: id.into(), addr: format!("{id}:9000"), zone: None, state: InstanceState::Active, tokens, timestamp_micros: ts }
	}

	#[test]
	fn replicas_for_walks_clockwise_and_wraps() {
		let ring = Ring::new(2, 0, 10_000_000);
		ring.seed(descriptor_with(vec![active("n1", vec![10], 0), active("n2", vec![20], 0), active("n3", vec![30], 0)]));

		let replicas = ring.replicas_for(25, Op::Read, 0).unwrap();
		assert_eq!(replicas.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["n3", "n1"]);
	}

	#[test]
	fn insufficient_replicas_when_ring_too_small() {
		let ring = Ring::new(3, 0, 10_000_000);
		ring.seed(descriptor_with(vec![active("n1", vec![10], 0)]));
		let err = ring.replicas_for(5, Op::Read, 0).unwrap_err();
		assert!(matches!(err, RingError::InsufficientReplicas { .. }));
	}

	#[test]
	fn write_no_extend_skips_stale_instances() {
		let ring = Ring::new(2, 0, 100);
		ring.seed(descriptor_with(vec![active("n1", vec![10], 0), active("n2", vec![20], 1_000_000)]));
		let err = ring.replicas_for(5, Op::WriteNoExtend, 1_000_000).unwrap_err();
		assert!(matches!(err, RingError::InsufficientReplicas { available: 1, .. }));
	}

	#[test]
	fn update_retries_against_a_concurrent_merge_instead_of_clobbering_it() {
		let ring = Ring::new(2, 0, 10_000_000);
		ring.seed(descriptor_with(vec![active("n1", vec![10], 0)]));

		let injected = std::sync::atomic::AtomicBool::new(false);
		ring.update(|current| {
			let mut next = current.clone();
			if !injected.swap(true, std::sync::atomic::Ordering::SeqCst) {
				// Simulates a gossip merge landing concurrently, in between this closure reading
				// `current` and `update`'s compare-and-swap of it: the rcu loop must retry against
				// the merged result rather than overwrite it.
				ring.merge_and_publish(&descriptor_with(vec![active("n2", vec![20], 5)]));
			}
			next.upsert(active("n1", vec![10], 1));
			next
		});

		let snapshot = ring.snapshot();
		assert!(snapshot.get("n1").is_some(), "n1 survives the update");
		assert!(snapshot.get("n2").is_some(), "concurrent merge of n2 is not lost");
	}
}
