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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors produced by a single [`crate::Store`] implementation.
///
/// `is_transient` drives the distributor's decision to retry a different replica rather than
/// fail the whole request outright.
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("local storage engine error: {0}")]
	Engine(#[from] jammdb::Error),

	#[error("value for key could not be decoded: {0}")]
	Codec(#[from] serde_json::Error),

	#[error("remote store at {address} returned status {status}")]
	RemoteStatus { address: String, status: u16 },

	#[error("remote store at {address} is unreachable: {source}")]
	RemoteTransport { address: String, #[source] source: reqwest::Error },

	#[error("store pool has no entry for address {0}")]
	UnknownAddress(String),
}

impl StoreError {
	/// Whether the distributor should treat this as a transient failure of one replica (and try
	/// the next one) rather than a hard error to surface to the caller.
	pub fn is_transient(&self) -> bool {
		match self {
			StoreError::RemoteTransport { .. } => true,
			StoreError::RemoteStatus { status, .. } => *status >= 500,
			StoreError::Engine(_) | StoreError::Codec(_) | StoreError::UnknownAddress(_) => false,
		}
	}
}
