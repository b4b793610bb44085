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

use crate::instance::{Instance, InstanceState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The state-based CRDT gossiped between instances: instance id -> [`Instance`].
///
/// Merging is commutative, associative and idempotent, which is all gossip convergence requires:
/// per id, keep the record with the larger `timestamp_micros`; ties break on the monotonic
/// `InstanceState` ordering (`Joining < Active < Leaving < Left`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RingDescriptor {
	instances: BTreeMap<String, Instance>,
}

impl RingDescriptor {
	pub fn new() -> Self {
		RingDescriptor::default()
	}

	pub fn get(&self, id: &str) -> Option<&Instance> {
		self.instances.get(id)
	}

	pub fn upsert(&mut self, instance: Instance) {
		self.instances.insert(instance.id.clone(), instance);
	}

	pub fn remove(&mut self, id: &str) {
		self.instances.remove(id);
	}

	pub fn instances(&self) -> impl Iterator<Item = &Instance> {
		self.instances.values()
	}

	pub fn is_empty(&self) -> bool {
		self.instances.is_empty()
	}

	/// Merges `other` into `self`, returning a new descriptor. Pure so the gossip merger can
	/// publish the result atomically without holding a lock across the computation.
	pub fn merge(&self, other: &RingDescriptor) -> RingDescriptor {
		let mut merged = self.instances.clone();
		for (id, theirs) in &other.instances {
			match merged.get(id) {
				Some(ours) if !theirs_wins(ours, theirs) => {},
				_ => {
					merged.insert(id.clone(), theirs.clone());
				},
			}
		}
		RingDescriptor { instances: merged }
	}

	/// The sorted `(token, instance_id)` sequence derived from every non-`Left` instance's
	/// tokens. Recomputed on demand; never cached on the descriptor itself so merge stays cheap.
	pub fn token_sequence(&self) -> Vec<(u32, &str)> {
		let mut seq: Vec<(u32, &str)> = self
			.instances
			.values()
			.filter(|inst| inst.state != InstanceState::Left)
			.flat_map(|inst| inst.tokens.iter().map(move |t| (*t, inst.id.as_str())))
			.collect();
		seq.sort_unstable_by_key(|(token, _)| *token);
		seq
	}
}

fn theirs_wins(ours: &Instance, theirs: &Instance) -> bool {
	match theirs.timestamp_micros.cmp(&ours.timestamp_micros) {
		std::cmp::Ordering::Greater => true,
		std::cmp::Ordering::Less => false,
		std::cmp::Ordering::Equal => theirs.state > ours.state,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn instance(id: &str, state: InstanceState, ts: i64, tokens: Vec<u32>) -> Instance {
		Instance { id: id.into(), addr: format!("{id}:9000"), zone: None, state, tokens, timestamp_micros: ts }
	}

	#[test]
	fn merge_keeps_larger_timestamp() {
		let mut a = RingDescriptor::new();
		a.upsert(instance("n1", InstanceState::Active, 10, vec![1]));
		let mut b = RingDescriptor::new();
		b.upsert(instance("n1", InstanceState::Active, 20, vec![2]));

		let merged = a.merge(&b);
		assert_eq!(merged.get("n1").unwrap().timestamp_micros, 20);
	}

	#[test]
	fn merge_breaks_ties_on_state_order() {
		let mut a = RingDescriptor::new();
		a.upsert(instance("n1", InstanceState::Active, 10, vec![1]));
		let mut b = RingDescriptor::new();
		b.upsert(instance("n1", InstanceState::Leaving, 10, vec![1]));

		assert_eq!(a.merge(&b).get("n1").unwrap().state, InstanceState::Leaving);
		assert_eq!(b.merge(&a).get("n1").unwrap().state, InstanceState::Leaving);
	}

	#[test]
	fn merge_is_idempotent_and_commutative() {
		let mut a = RingDescriptor::new();
		a.upsert(instance("n1", InstanceState::Active, 10, vec![1]));
		a.upsert(instance("n2", InstanceState::Active, 5, vec![2]));
		let mut b = RingDescriptor::new();
		b.upsert(instance("n2", InstanceState::Active, 15, vec![2]));
		b.upsert(instance("n3", InstanceState::Joining, 1, vec![3]));

		let ab = a.merge(&b);
		let ba = b.merge(&a);
		assert_eq!(ab.token_sequence(), ba.token_sequence());

		let ab_again = ab.merge(&b);
		assert_eq!(ab.token_sequence(), ab_again.token_sequence());
	}

	#[test]
	fn token_sequence_excludes_left_instances() {
		let mut d = RingDescriptor::new();
		d.upsert(instance("n1", InstanceState::Left, 10, vec![1]));
		d.upsert(instance("n2", InstanceState::Active, 10, vec![2]));
		assert_eq!(d.token_sequence(), vec![(2, "n2")]);
	}
}
