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
	config::LifecyclerConfig,
	error::{Result, RingError},
	instance::{Instance, InstanceState},
	ring::Ring,
	time::now_micros,
};
use rand::Rng;
use std::{
	io::{Read, Write},
	sync::{atomic::{AtomicBool, Ordering}, Arc},
	time::Duration,
};
use tokio_util::sync::CancellationToken;

/// Drives this node's own membership through `Joining -> Active(observing) -> Active -> Leaving
/// -> Left`, publishing each transition to the ring and heartbeating while `Active`.
///
/// Transition side effects (register-on-join, leave-on-stop, auto-forget) are plain sequential
/// steps inside `run`/`shutdown` rather than a chain of wrapping delegates: there is exactly one
/// lifecycler per process, so the composability a delegate chain buys an operator-facing system
/// isn't needed here. See DESIGN.md.
pub struct Lifecycler {
	config: LifecyclerConfig,
	ring: Arc<Ring>,
	ready: AtomicBool,
}

impl Lifecycler {
	pub fn new(config: LifecyclerConfig, ring: Arc<Ring>) -> Arc<Self> {
		Arc::new(Lifecycler { config, ring, ready: AtomicBool::new(false) })
	}

	pub fn is_ready(&self) -> bool {
		self.ready.load(Ordering::Relaxed)
	}

	fn load_or_draw_tokens(&self) -> Vec<u32> {
		if let Some(path) = &self.config.tokens_file_path {
			if let Ok(tokens) = self.read_tokens_file(path) {
				if !tokens.is_empty() {
					log::info!("loaded {} tokens from {path}", tokens.len());
					return tokens;
				}
			}
		}
		draw_tokens(self.config.num_tokens)
	}

	fn read_tokens_file(&self, path: &str) -> Result<Vec<u32>> {
		let mut contents = String::new();
		std::fs::File::open(path)
			.map_err(|source| RingError::TokensFile { path: path.to_owned(), source })?
			.read_to_string(&mut contents)
			.map_err(|source| RingError::TokensFile { path: path.to_owned(), source })?;
		serde_json::from_str(&contents).map_err(|source| RingError::TokensFileCodec { path: path.to_owned(), source })
	}

	fn write_tokens_file(&self, tokens: &[u32]) -> Result<()> {
		let Some(path) = &self.config.tokens_file_path else { return Ok(()) };
		let encoded = serde_json::to_vec(tokens).map_err(|source| RingError::TokensFileCodec { path: path.clone(), source })?;
		std::fs::File::create(path)
			.map_err(|source| RingError::TokensFile { path: path.clone(), source })?
			.write_all(&encoded)
			.map_err(|source| RingError::TokensFile { path: path.clone(), source })?;
		Ok(())
	}

	fn instance(&self, state: InstanceState, tokens: Vec<u32>) -> Instance {
		Instance {
			id: self.config.id.clone(),
			addr: self.config.addr.clone(),
			zone: self.config.zone.clone(),
			state,
			tokens,
			timestamp_micros: now_micros(),
		}
	}

	fn publish_self(&self, state: InstanceState, tokens: Vec<u32>) {
		let instance = self.instance(state, tokens);
		self.ring.update(|current| {
			let mut next = current.clone();
			next.upsert(instance.clone());
			next
		});
	}

	/// Tokens belonging to someone else in the current ring snapshot.
	fn colliding_tokens(&self, tokens: &[u32]) -> Vec<u32> {
		let snapshot = self.ring.snapshot();
		tokens
			.iter()
			.copied()
			.filter(|token| snapshot.token_sequence().iter().any(|(t, id)| t == token && *id != self.config.id))
			.collect()
	}

	/// Runs the full lifecycle until `cancel` fires, then leaves gracefully. Intended to be
	/// spawned as a single long-lived task.
	pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
		let mut tokens = self.load_or_draw_tokens();
		self.publish_self(InstanceState::Joining, tokens.clone());
		log::info!("{} joining with {} tokens", self.config.id, tokens.len());

		let observe_deadline = Duration::from_secs(self.config.observe_period_secs);
		let check_interval = Duration::from_millis(500).min(observe_deadline);
		let mut elapsed = Duration::ZERO;
		while elapsed < observe_deadline {
			tokio::select! {
				_ = tokio::time::sleep(check_interval) => {},
				_ = cancel.cancelled() => {
					self.leave(tokens).await;
					return;
				},
			}
			elapsed += check_interval;
			let colliding = self.colliding_tokens(&tokens);
			if !colliding.is_empty() {
				log::warn!("{} lost {} colliding tokens, redrawing", self.config.id, colliding.len());
				for token in colliding {
					tokens.retain(|t| *t != token);
				}
				tokens.extend(draw_tokens(self.config.num_tokens - tokens.len()));
				self.publish_self(InstanceState::Joining, tokens.clone());
				elapsed = Duration::ZERO;
			}
		}

		self.publish_self(InstanceState::Active, tokens.clone());
		self.ready.store(true, Ordering::Relaxed);
		log::info!("{} is active", self.config.id);

		let mut heartbeat = tokio::time::interval(Duration::from_secs(self.config.heartbeat_period_secs));
		loop {
			tokio::select! {
				_ = heartbeat.tick() => {
					self.publish_self(InstanceState::Active, tokens.clone());
				},
				_ = cancel.cancelled() => {
					self.leave(tokens).await;
					return;
				},
			}
		}
	}

	async fn leave(&self, tokens: Vec<u32>) {
		log::info!("{} leaving", self.config.id);
		self.ready.store(false, Ordering::Relaxed);
		self.publish_self(InstanceState::Leaving, tokens.clone());
		if let Err(err) = self.write_tokens_file(&tokens) {
			log::warn!("failed to persist tokens on shutdown: {err}");
		}
		tokio::time::sleep(Duration::from_secs(self.config.final_sleep_secs)).await;
		if self.config.unregister_on_shutdown {
			let id = self.config.id.clone();
			self.ring.update(|current| {
				let mut next = current.clone();
				next.remove(&id);
				next
			});
		} else {
			self.publish_self(InstanceState::Left, tokens);
		}
	}
}

fn draw_tokens(n: usize) -> Vec<u32> {
	let mut rng = rand::thread_rng();
	(0..n).map(|_| rng.gen()).collect()
}

/// Background sweeper evicting instances whose heartbeat has gone stale beyond `forget_period`.
/// Eviction is an ordinary descriptor mutation and gossips like any other change.
pub fn spawn_auto_forget(ring: Arc<Ring>, forget_period: Duration, sweep_interval: Duration, self_id: String) -> tokio::task::JoinHandle<()> {
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(sweep_interval);
		loop {
			ticker.tick().await;
			let now = now_micros();
			let forget_micros = forget_period.as_micros() as i64;
			ring.update(|current| {
				let stale: Vec<String> = current
					.instances()
					.filter(|inst| inst.id != self_id && now - inst.timestamp_micros > forget_micros)
					.map(|inst| inst.id.clone())
					.collect();
				let mut next = current.clone();
				for id in &stale {
					log::info!("forgetting stale instance {id}");
					next.remove(id);
				}
				next
			});
		}
	})
}
