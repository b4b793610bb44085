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

use dkv_distributor::Distributor;
use dkv_ring::Lifecycler;
use dkv_store::StorePool;
use dkv_utils::metrics::MetricsRegistry;
use std::{sync::Arc, time::Duration};

#[derive(Clone)]
pub struct AppState {
	pub distributor: Arc<Distributor>,
	pub pool: Arc<StorePool>,
	pub lifecycler: Arc<Lifecycler>,
	pub metrics: Arc<MetricsRegistry>,
	pub request_deadline: Duration,
	/// This instance's own `host:port`, used by the internal peer handlers to route straight to
	/// the local store rather than back through the distributor.
	pub self_address: String,
}
