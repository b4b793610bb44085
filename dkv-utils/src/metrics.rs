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

//! Global system-wide and per-component Prometheus metrics.

use crate::error::Result;
use prometheus::{Encoder, Gauge, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sysinfo::{RefreshKind, System};

/// Anything that registers itself with the process-wide [`Registry`].
pub trait Metric {
	/// Register this metric's series with the registry.
	fn register(&self, registry: &Registry) -> Result<()>;
}

/// A metric that needs to be refreshed on a timer rather than updated inline by request code.
#[async_trait::async_trait]
pub trait StandaloneMetric: Metric + Send + Sync + 'static {
	/// Refresh the metric's current value.
	async fn update(&self);
	/// How often [`StandaloneMetric::update`] should be called.
	fn update_interval(&self) -> Duration;
}

fn metric_name(prefix: Option<&str>, name: &str) -> String {
	match prefix {
		Some(prefix) => format!("dkv_{prefix}_{name}"),
		None => format!("dkv_{name}"),
	}
}

/// Global, process-wide metrics: load average, CPU and memory usage of this node.
#[derive(Clone)]
pub struct GlobalMetrics {
	system: Arc<Mutex<System>>,
	system_average_load: GaugeVec,
	process_cpu_usage_percentage: Gauge,
	process_memory_usage_bytes: Gauge,
}

impl GlobalMetrics {
	/// Create the metric series (not yet registered with any registry).
	pub fn new() -> Result<Self> {
		Ok(GlobalMetrics {
			system: Arc::new(Mutex::new(System::new_with_specifics(RefreshKind::everything()))),
			system_average_load: GaugeVec::new(
				Opts::new(metric_name(None, "system_average_load"), "System load average"),
				&["over"],
			)?,
			process_cpu_usage_percentage: Gauge::new(
				metric_name(None, "process_cpu_usage_percentage"),
				"Process CPU usage",
			)?,
			process_memory_usage_bytes: Gauge::new(
				metric_name(None, "process_memory_usage_bytes"),
				"Process memory (resident set size) usage",
			)?,
		})
	}
}

impl Metric for GlobalMetrics {
	fn register(&self, registry: &Registry) -> Result<()> {
		registry.register(Box::new(self.system_average_load.clone()))?;
		registry.register(Box::new(self.process_cpu_usage_percentage.clone()))?;
		registry.register(Box::new(self.process_memory_usage_bytes.clone()))?;
		Ok(())
	}
}

#[async_trait::async_trait]
impl StandaloneMetric for GlobalMetrics {
	async fn update(&self) {
		let mut system = self.system.lock().expect("global metrics lock poisoned");
		let load = System::load_average();
		self.system_average_load.with_label_values(&["1min"]).set(load.one);
		self.system_average_load.with_label_values(&["5min"]).set(load.five);
		self.system_average_load.with_label_values(&["15min"]).set(load.fifteen);

		let pid = match sysinfo::get_current_pid() {
			Ok(pid) => pid,
			Err(err) => {
				log::warn!(target: "metrics", "failed to determine own pid: {err}");
				return
			},
		};
		if system.refresh_process(pid) {
			if let Some(process) = system.process(pid) {
				self.process_cpu_usage_percentage.set(process.cpu_usage() as f64);
				self.process_memory_usage_bytes.set((process.memory() * 1024) as f64);
			}
		} else {
			log::warn!(target: "metrics", "failed to refresh process info, metrics may be stale");
		}
	}

	fn update_interval(&self) -> Duration {
		Duration::from_secs(10)
	}
}

/// Distributor-facing request counters: total requests, per-replica outcomes.
#[derive(Clone)]
pub struct DistributorMetrics {
	pub requests_total: IntCounterVec,
	pub replica_calls_total: IntCounterVec,
	pub reconcile_winner_age_ms: Gauge,
}

impl DistributorMetrics {
	pub fn new() -> Result<Self> {
		Ok(DistributorMetrics {
			requests_total: IntCounterVec::new(
				Opts::new(metric_name(Some("distributor"), "requests_total"), "Requests handled by the distributor"),
				&["op", "outcome"],
			)?,
			replica_calls_total: IntCounterVec::new(
				Opts::new(
					metric_name(Some("distributor"), "replica_calls_total"),
					"Per-replica fan-out call outcomes",
				),
				&["op", "outcome"],
			)?,
			reconcile_winner_age_ms: Gauge::new(
				metric_name(Some("distributor"), "reconcile_winner_age_ms"),
				"Age in milliseconds of the reconciled version at read time",
			)?,
		})
	}

	pub fn observe_request(&self, op: &str, outcome: &str) {
		self.requests_total.with_label_values(&[op, outcome]).inc();
	}

	pub fn observe_replica_call(&self, op: &str, outcome: &str) {
		self.replica_calls_total.with_label_values(&[op, outcome]).inc();
	}
}

impl Metric for DistributorMetrics {
	fn register(&self, registry: &Registry) -> Result<()> {
		registry.register(Box::new(self.requests_total.clone()))?;
		registry.register(Box::new(self.replica_calls_total.clone()))?;
		registry.register(Box::new(self.reconcile_winner_age_ms.clone()))?;
		Ok(())
	}
}

/// Process-wide Prometheus registry plus the interval-driven standalone metrics.
pub struct MetricsRegistry {
	registry: Registry,
}

impl MetricsRegistry {
	pub fn new() -> Self {
		MetricsRegistry { registry: Registry::new() }
	}

	pub fn inner(&self) -> &Registry {
		&self.registry
	}

	pub fn register(&self, metric: &dyn Metric) -> Result<()> {
		metric.register(&self.registry)
	}

	/// Spawn a background task that calls `update()` on `metric` every `update_interval()`.
	pub fn spawn_standalone<M: StandaloneMetric + Clone>(metric: M) {
		tokio::spawn(async move {
			let mut interval = tokio::time::interval(metric.update_interval());
			loop {
				interval.tick().await;
				metric.update().await;
			}
		});
	}

	/// Render the current state of all registered metrics as Prometheus text exposition format.
	pub fn gather_text(&self) -> String {
		let families = self.registry.gather();
		let mut buffer = Vec::new();
		TextEncoder::new().encode(&families, &mut buffer).expect("prometheus encoding never fails for valid UTF8 labels; qed");
		String::from_utf8(buffer).expect("prometheus text exposition is valid UTF8; qed")
	}
}

impl Default for MetricsRegistry {
	fn default() -> Self {
		Self::new()
	}
}
