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

pub type Result<T> = std::result::Result<T, DistributorError>;

#[derive(Debug, Error)]
pub enum DistributorError {
	#[error("no value found for the requested key")]
	KeyValueNotFound,

	#[error("quorum not reached: {succeeded} of {required} replicas acknowledged the write")]
	QuorumNotReached { succeeded: usize, required: usize },

	#[error(transparent)]
	InsufficientReplicas(#[from] dkv_ring::RingError),

	#[error("request cancelled before quorum was reached")]
	ContextCancelled,

	#[error("storage error from replica {address}: {source}")]
	Storage { address: String, #[source] source: dkv_store::StoreError },

	#[error("failed to encode the value envelope: {0}")]
	Codec(#[from] dkv_store::StoreError),
}
