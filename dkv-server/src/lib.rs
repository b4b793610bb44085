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

//! The HTTP surface: client API, internal peer API and ambient operational endpoints, all served
//! from the same `axum` router.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use router::build_router;
pub use state::AppState;

use tokio_util::sync::CancellationToken;

/// Binds and serves the router until `shutdown` fires, then performs a graceful axum shutdown.
pub async fn serve(config: &ServerConfig, state: AppState, shutdown: CancellationToken) -> std::io::Result<()> {
	let app = build_router(state);
	let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
	log::info!("HTTP server listening on {}", config.bind_addr());
	axum::serve(listener, app)
		.with_graceful_shutdown(async move {
			shutdown.cancelled().await;
			log::info!("HTTP server shutting down");
		})
		.await
}
