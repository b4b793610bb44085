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

//! The two subcommands `main.rs` dispatches to.

use crate::{
	config::Config,
	node::Node,
};
use anyhow::{Context, Result};
use dkv_utils::config::Validate;
use futures::stream::StreamExt;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Loads and validates the config at `config_path`, boots a node and serves it until the process
/// receives `SIGINT`/`SIGTERM`, at which point it leaves the ring gracefully before exiting.
pub async fn run(config_path: &Path) -> Result<()> {
	let config = Config::load(config_path).with_context(|| format!("loading {}", config_path.display()))?;
	config.validate().context("validating configuration")?;

	let node = Node::bootstrap(config).await?;
	log::info!(target: "dkv", "node {} starting", node.self_address());

	let cancel = CancellationToken::new();
	let signals_handle = spawn_shutdown_listener(cancel.clone())?;

	node.run(cancel).await?;
	signals_handle.close();
	log::info!(target: "dkv", "shut down cleanly");
	Ok(())
}

/// Writes a commented default configuration to `output`, for an operator to fill in and edit.
pub fn init_config(output: &Path) -> Result<()> {
	let config = Config::default();
	let yaml = serde_yaml::to_string(&config).context("encoding default configuration")?;
	let contents = format!("# dkv default configuration, generated by `dkv init-config`.\n# Fields left blank (store.db.path, lifecycler.id, lifecycler.addr) are required.\n{yaml}");
	std::fs::write(output, contents).with_context(|| format!("writing {}", output.display()))?;
	println!("wrote default configuration to {}", output.display());
	Ok(())
}

/// Spawns the task that translates `SIGINT`/`SIGTERM` into cancellation of `cancel`. Returns the
/// `signal-hook` handle so the caller can stop the signal stream once shutdown is complete.
fn spawn_shutdown_listener(cancel: CancellationToken) -> Result<signal_hook_tokio::Handle> {
	let mut signals = Signals::new([SIGINT, SIGTERM]).context("registering signal handlers")?;
	let handle = signals.handle();
	tokio::spawn(async move {
		if signals.next().await.is_some() {
			log::info!(target: "dkv", "received shutdown signal, leaving the ring");
			cancel.cancel();
		}
	});
	Ok(handle)
}
