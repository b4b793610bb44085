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

//! Cluster membership: the gossiped ring descriptor, the lifecycler state machine that drives
//! this node's own membership through it, and the transport that carries it between peers.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod gossip;
pub mod instance;
pub mod lifecycler;
pub mod ring;
mod time;

pub use config::{LifecyclerConfig, MemberlistConfig, RingConfig};
pub use descriptor::RingDescriptor;
pub use error::{Result, RingError};
pub use gossip::GossipTransport;
pub use instance::{Instance, InstanceState};
pub use lifecycler::{spawn_auto_forget, Lifecycler};
pub use ring::{InstanceDesc, Op, Purpose, Ring};
pub use time::now_micros;
