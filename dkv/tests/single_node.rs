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

//! A single-node, `R=1` cluster round-trips a write through the client HTTP API and reads it
//! back.

use base64::Engine;
use dkv::{config::Config, node::Node};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn single_node_config(db_path: &std::path::Path) -> Config {
	let mut config = Config::default();
	config.store.db.path = db_path.display().to_string();
	config.server.bind_ip = "127.0.0.1".into();
	config.server.http_listen_port = 18180;
	config.lifecycler.id = "node-1".into();
	config.lifecycler.addr = "127.0.0.1:18180".into();
	config.lifecycler.num_tokens = 8;
	config.lifecycler.observe_period_secs = 0;
	config.lifecycler.heartbeat_period_secs = 1;
	config.lifecycler.heartbeat_timeout_secs = 30;
	config.lifecycler.final_sleep_secs = 0;
	config.memberlist.bind_addr = "127.0.0.1".into();
	config.memberlist.bind_port = 18181;
	config.ring.replication_factor = 1;
	config.ring.max_unavailable = 0;
	config.metrics.enabled = false;
	config
}

#[tokio::test]
async fn single_node_round_trip() {
	let dir = tempfile::tempdir().unwrap();
	let config = single_node_config(&dir.path().join("data.db"));
	let node = Node::bootstrap(config).await.unwrap();

	let cancel = CancellationToken::new();
	let running = {
		let cancel = cancel.clone();
		tokio::spawn(async move { node.run(cancel).await })
	};

	// The store-pool reconciler only registers the self entry on its next tick (period 5s); give
	// it two ticks of margin so the in-process call path is actually wired up before we hit it.
	tokio::time::sleep(Duration::from_secs(6)).await;

	let client = reqwest::Client::new();

	let put = client
		.post("http://127.0.0.1:18180/api/v1/buckets/b/k1")
		.json(&serde_json::json!({ "Value": "alpha" }))
		.send()
		.await
		.unwrap();
	assert_eq!(put.status(), 200);

	let get = client
		.get("http://127.0.0.1:18180/api/v1/buckets/b/k1")
		.header("Accept", "application/json")
		.send()
		.await
		.unwrap();
	assert_eq!(get.status(), 200);
	let body: serde_json::Value = get.json().await.unwrap();
	let decoded = base64::engine::general_purpose::STANDARD.decode(body["Value"].as_str().unwrap()).unwrap();
	assert_eq!(decoded, b"alpha");

	// A raw (non-JSON) accept falls back to the bare bytes, never the versioned envelope.
	let get_raw = client.get("http://127.0.0.1:18180/api/v1/buckets/b/k1").send().await.unwrap();
	assert_eq!(get_raw.status(), 200);
	assert_eq!(get_raw.bytes().await.unwrap().as_ref(), b"alpha");

	let missing = client.get("http://127.0.0.1:18180/api/v1/buckets/b/nosuchkey").send().await.unwrap();
	assert_eq!(missing.status(), 404);

	cancel.cancel();
	let _ = tokio::time::timeout(Duration::from_secs(2), running).await;
}
