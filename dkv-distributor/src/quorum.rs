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

use dkv_ring::InstanceDesc;
use dkv_store::StoreError;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;

/// How the fan-out loop stopped.
pub struct QuorumOutcome<T> {
	pub successes: Vec<(String, T)>,
	pub failures: Vec<(String, StoreError)>,
	/// The overall deadline fired before quorum (one way or the other) was reached.
	pub deadline_exceeded: bool,
}

/// Best-effort continuation timeout: how long detached sub-calls are allowed to keep running
/// after the caller has already gotten its answer, purely so metrics/logs reflect their outcome.
const DETACHED_COMPLETION_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs `call` against every replica concurrently and waits for either `required` successes,
/// more than `max_unavailable` failures, or `deadline`, whichever comes first. Replicas still
/// outstanding when the loop exits are detached into a background task bounded by
/// `DETACHED_COMPLETION_TIMEOUT`; `cleanup` (if given) runs exactly once after every sub-call has
/// either completed or been detached.
pub async fn fan_out<T, F, Fut>(
	replicas: Vec<InstanceDesc>,
	required: usize,
	max_unavailable: usize,
	deadline: Duration,
	call: F,
	cleanup: Option<Box<dyn FnOnce() + Send + 'static>>,
) -> QuorumOutcome<T>
where
	T: Send + 'static,
	F: Fn(InstanceDesc) -> Fut,
	Fut: Future<Output = (String, Result<T, StoreError>)> + Send + 'static,
{
	let mut handles = FuturesUnordered::new();
	for replica in replicas {
		handles.push(tokio::spawn(call(replica)));
	}

	let mut successes = Vec::new();
	let mut failures = Vec::new();
	let mut deadline_exceeded = false;
	let sleep = tokio::time::sleep(deadline);
	tokio::pin!(sleep);

	loop {
		if successes.len() >= required {
			break;
		}
		if failures.len() > max_unavailable {
			break;
		}
		if handles.is_empty() {
			break;
		}
		tokio::select! {
			next = handles.next() => {
				match next {
					Some(Ok((addr, Ok(value)))) => successes.push((addr, value)),
					Some(Ok((addr, Err(err)))) => failures.push((addr, err)),
					Some(Err(join_err)) => log::warn!("replica call task panicked: {join_err}"),
					None => break,
				}
			},
			_ = &mut sleep => {
				deadline_exceeded = true;
				break;
			},
		}
	}

	if !handles.is_empty() {
		log::debug!("detaching {} outstanding replica calls past quorum", handles.len());
		tokio::spawn(async move {
			let _ = tokio::time::timeout(DETACHED_COMPLETION_TIMEOUT, async {
				while let Some(result) = handles.next().await {
					if let Ok((addr, Err(err))) = result {
						log::debug!("detached replica call to {addr} failed: {err}");
					}
				}
			})
			.await;
			if let Some(cleanup) = cleanup {
				cleanup();
			}
		});
	} else if let Some(cleanup) = cleanup {
		cleanup();
	}

	QuorumOutcome { successes, failures, deadline_exceeded }
}
