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

use std::path::PathBuf;
use structopt::StructOpt;

/// Command-line arguments for the `dkv` node binary.
#[derive(Debug, StructOpt)]
#[structopt(name = "dkv", about = "A distributed, replicated key-value store node")]
pub struct Opt {
	#[structopt(subcommand)]
	pub command: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
	/// Loads the config, joins the ring and serves client and peer traffic until terminated.
	Run {
		/// Path to the node's YAML configuration file.
		#[structopt(long, parse(from_os_str), default_value = "dkv.yaml")]
		config: PathBuf,
	},
	/// Writes a default configuration file to the given path, for the operator to edit.
	InitConfig {
		/// Path the default configuration is written to.
		#[structopt(long, parse(from_os_str), default_value = "dkv.yaml")]
		output: PathBuf,
	},
}
