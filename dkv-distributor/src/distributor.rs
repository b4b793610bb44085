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
	error::{DistributorError, Result},
	quorum::fan_out,
	token::{AdditiveChecksum, TokenStrategy},
};
use dkv_ring::{now_micros, Op, Ring};
use dkv_store::{StoreError, StorePool, VersionedValue};
use dkv_utils::metrics::DistributorMetrics;
use std::{
	sync::Arc,
	time::{Duration, SystemTime, UNIX_EPOCH},
};

/// A replica's per-call network budget. The request's overall deadline governs how long the
/// distributor waits for quorum; this bounds how long any single replica call may take.
const PER_CALL_TIMEOUT: Duration = Duration::from_secs(3);

/// Hashes, resolves, fans out, reconciles and reports: the engine that turns a client's
/// bucket/key request into a set of replica calls and a single, deterministic answer.
pub struct Distributor {
	ring: Arc<Ring>,
	pool: Arc<StorePool>,
	token_strategy: Arc<dyn TokenStrategy>,
	metrics: Arc<DistributorMetrics>,
}

impl Distributor {
	pub fn new(ring: Arc<Ring>, pool: Arc<StorePool>, metrics: Arc<DistributorMetrics>) -> Self {
		Distributor { ring, pool, token_strategy: Arc::new(AdditiveChecksum), metrics }
	}

	pub fn with_token_strategy(mut self, strategy: Arc<dyn TokenStrategy>) -> Self {
		self.token_strategy = strategy;
		self
	}

	pub async fn get(&self, bucket: &str, key: &str, deadline: Duration) -> Result<Vec<u8>> {
		let token = self.token_strategy.token(bucket, key);
		let replicas = self.ring.candidate_replicas(token, Op::Read, now_micros())?;
		let required = self.ring.required_replicas();
		let max_unavailable = self.ring.max_unavailable();
		let insufficient_candidates = replicas.len() < required;

		let total = replicas.len();
		let pool = self.pool.clone();
		let bucket = bucket.to_owned();
		let key = key.to_owned();
		let metrics = self.metrics.clone();

		let outcome = fan_out(
			replicas,
			required,
			max_unavailable,
			deadline,
			move |replica| {
				let pool = pool.clone();
				let bucket = bucket.clone();
				let key = key.clone();
				let metrics = metrics.clone();
				async move {
					let addr = replica.addr.clone();
					log::debug!("dispatching get to replica {addr}");
					let result = fetch_envelope(&pool, &addr, &bucket, &key).await;
					metrics.observe_replica_call("get", outcome_label(&result));
					(addr, result)
				}
			},
			None,
		)
		.await;

		let winner = outcome
			.successes
			.into_iter()
			.filter_map(|(_, envelope)| envelope)
			.reduce(VersionedValue::reconcile);

		match winner {
			Some(envelope) => {
				self.metrics.observe_request("get", "success");
				let age_ms = now_millis() - envelope.updated_at;
				self.metrics.reconcile_winner_age_ms.set(age_ms as f64);
				Ok(envelope.value)
			},
			None if outcome.deadline_exceeded => {
				self.metrics.observe_request("get", "cancelled");
				Err(DistributorError::ContextCancelled)
			},
			None if insufficient_candidates => {
				self.metrics.observe_request("get", "insufficient_replicas");
				Err(DistributorError::InsufficientReplicas(dkv_ring::RingError::InsufficientReplicas {
					available: outcome.failures.len(),
					required,
					max_unavailable,
				}))
			},
			None if total > 0 && outcome.failures.len() == total => {
				self.metrics.observe_request("get", "storage_error");
				let (address, source) = outcome.failures.into_iter().next().expect("failures is non-empty; qed");
				Err(DistributorError::Storage { address, source })
			},
			None => {
				self.metrics.observe_request("get", "not_found");
				Err(DistributorError::KeyValueNotFound)
			},
		}
	}

	pub async fn put(&self, bucket: &str, key: &str, value: Vec<u8>, deadline: Duration) -> Result<()> {
		let token = self.token_strategy.token(bucket, key);
		let replicas = self.ring.replicas_for(token, Op::WriteNoExtend, now_micros())?;
		let required = self.ring.required_replicas();
		let max_unavailable = self.ring.max_unavailable();

		let now_ms = now_millis();
		let envelope = VersionedValue::new(now_ms, value);
		let bytes = Arc::new(envelope.marshal()?);

		let total = replicas.len();
		let pool = self.pool.clone();
		let bucket = bucket.to_owned();
		let key = key.to_owned();
		let metrics = self.metrics.clone();

		let outcome = fan_out(
			replicas,
			required,
			max_unavailable,
			deadline,
			move |replica| {
				let pool = pool.clone();
				let bucket = bucket.clone();
				let key = key.clone();
				let bytes = bytes.clone();
				let metrics = metrics.clone();
				async move {
					let addr = replica.addr.clone();
					log::debug!("dispatching put to replica {addr}");
					let result = put_envelope(&pool, &addr, &bucket, &key, (*bytes).clone()).await;
					metrics.observe_replica_call("put", outcome_label(&result));
					(addr, result)
				}
			},
			None,
		)
		.await;

		if outcome.successes.len() >= required {
			self.metrics.observe_request("put", "success");
			return Ok(());
		}
		if outcome.deadline_exceeded {
			self.metrics.observe_request("put", "cancelled");
			return Err(DistributorError::ContextCancelled);
		}
		if outcome.successes.is_empty() && total > 0 && outcome.failures.len() == total {
			self.metrics.observe_request("put", "storage_error");
			let (address, source) = outcome.failures.into_iter().next().expect("failures is non-empty; qed");
			return Err(DistributorError::Storage { address, source });
		}
		self.metrics.observe_request("put", "quorum_not_reached");
		Err(DistributorError::QuorumNotReached { succeeded: outcome.successes.len(), required })
	}
}

async fn fetch_envelope(
	pool: &StorePool,
	addr: &str,
	bucket: &str,
	key: &str,
) -> std::result::Result<Option<VersionedValue>, StoreError> {
	let store = pool.get(addr).await.ok_or_else(|| StoreError::UnknownAddress(addr.to_owned()))?;
	let raw = tokio::time::timeout(PER_CALL_TIMEOUT, store.get(bucket, key))
		.await
		.map_err(|_| StoreError::RemoteStatus { address: addr.to_owned(), status: 504 })??;
	match raw {
		Some(bytes) => Ok(Some(VersionedValue::unmarshal(&bytes)?)),
		None => Ok(None),
	}
}

async fn put_envelope(pool: &StorePool, addr: &str, bucket: &str, key: &str, bytes: Vec<u8>) -> std::result::Result<(), StoreError> {
	let store = pool.get(addr).await.ok_or_else(|| StoreError::UnknownAddress(addr.to_owned()))?;
	tokio::time::timeout(PER_CALL_TIMEOUT, store.put(bucket, key, bytes))
		.await
		.map_err(|_| StoreError::RemoteStatus { address: addr.to_owned(), status: 504 })??;
	Ok(())
}

fn now_millis() -> i64 {
	SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock before epoch").as_millis() as i64
}

fn outcome_label<T>(result: &std::result::Result<T, StoreError>) -> &'static str {
	match result {
		Ok(_) => "success",
		Err(err) if err.is_transient() => "transient_failure",
		Err(_) => "failure",
	}
}
