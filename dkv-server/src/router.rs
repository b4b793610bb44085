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

use crate::{handlers, state::AppState};
use axum::{
	routing::{get, post},
	Router,
};

pub fn build_router(state: AppState) -> Router {
	Router::new()
		.route("/api/v1/buckets/:bucket/:key", get(handlers::get_value_by_key).post(handlers::post_value_by_key))
		.route("/v1/internal/get", post(handlers::internal_get))
		.route("/v1/internal/put", post(handlers::internal_put))
		.route("/metrics", get(handlers::metrics))
		.route("/ready", get(handlers::ready))
		.route("/health", get(handlers::health))
		.with_state(state)
}
