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

//! `dkv` node entrypoint: parses the CLI, then dispatches to `run` or `init-config`.

use dkv::cli::{Command, Opt};
use structopt::StructOpt;

fn main() -> anyhow::Result<()> {
	let opt = Opt::from_args();
	match opt.command {
		Command::InitConfig { output } => dkv::commands::init_config(&output),
		Command::Run { config } => {
			let runtime = tokio::runtime::Runtime::new()?;
			runtime.block_on(dkv::commands::run(&config))
		},
	}
}
