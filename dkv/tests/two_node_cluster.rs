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

//! Once gossip has converged on a two-member ring with `R=2`, a write issued against either node
//! must be readable from the other, since both are canonical replicas for every key.

use dkv::{config::Config, node::Node};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn node_config(id: &str, http_port: u16, gossip_port: u16, join_gossip_port: u16, db_path: &std::path::Path) -> Config {
	let mut config = Config::default();
	config.store.db.path = db_path.display().to_string();
	config.server.bind_ip = "127.0.0.1".into();
	config.server.http_listen_port = http_port;
	config.lifecycler.id = id.into();
	config.lifecycler.addr = format!("127.0.0.1:{http_port}");
	config.lifecycler.num_tokens = 32;
	config.lifecycler.observe_period_secs = 0;
	config.lifecycler.heartbeat_period_secs = 1;
	config.lifecycler.heartbeat_timeout_secs = 30;
	config.lifecycler.final_sleep_secs = 0;
	config.memberlist.bind_addr = "127.0.0.1".into();
	config.memberlist.bind_port = gossip_port;
	config.memberlist.join_members = vec![format!("127.0.0.1:{join_gossip_port}")];
	config.memberlist.gossip_interval_millis = 100;
	config.ring.replication_factor = 2;
	config.ring.max_unavailable = 0;
	config.metrics.enabled = false;
	config
}

#[tokio::test]
async fn write_on_one_node_is_readable_from_the_other() {
	let dir1 = tempfile::tempdir().unwrap();
	let dir2 = tempfile::tempdir().unwrap();

	let config1 = node_config("node-1", 18190, 18191, 18193, &dir1.path().join("data.db"));
	let config2 = node_config("node-2", 18192, 18193, 18191, &dir2.path().join("data.db"));

	let node1 = Node::bootstrap(config1).await.unwrap();
	let node2 = Node::bootstrap(config2).await.unwrap();

	let cancel1 = CancellationToken::new();
	let cancel2 = CancellationToken::new();
	let running1 = {
		let cancel = cancel1.clone();
		tokio::spawn(async move { node1.run(cancel).await })
	};
	let running2 = {
		let cancel = cancel2.clone();
		tokio::spawn(async move { node2.run(cancel).await })
	};

	// Generous margin for gossip convergence (100ms tick) plus the 5s store-pool reconcile tick
	// on both nodes.
	tokio::time::sleep(Duration::from_secs(7)).await;

	let client = reqwest::Client::new();
	let put = client
		.post("http://127.0.0.1:18190/api/v1/buckets/b/k1")
		.json(&serde_json::json!({ "Value": "hello" }))
		.send()
		.await
		.unwrap();
	assert_eq!(put.status(), 200);

	let get = client.get("http://127.0.0.1:18192/api/v1/buckets/b/k1").send().await.unwrap();
	assert_eq!(get.status(), 200);
	assert_eq!(get.bytes().await.unwrap().as_ref(), b"hello");

	cancel1.cancel();
	cancel2.cancel();
	let _ = tokio::time::timeout(Duration::from_secs(2), running1).await;
	let _ = tokio::time::timeout(Duration::from_secs(2), running2).await;
}
