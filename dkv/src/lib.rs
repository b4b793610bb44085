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

//! Library half of the `dkv` node binary: the top-level config schema and the component wiring
//! that turns a validated [`config::Config`] into a running [`node::Node`]. Kept separate from
//! `main.rs` so integration tests can boot a node in-process without shelling out.

pub mod cli;
pub mod commands;
pub mod config;
pub mod node;
