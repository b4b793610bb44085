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

pub type Result<T> = std::result::Result<T, RingError>;

#[derive(Debug, Error)]
pub enum RingError {
	#[error("only {available} of {required} replicas are available for this operation (max_unavailable={max_unavailable})")]
	InsufficientReplicas { available: usize, required: usize, max_unavailable: usize },

	#[error("ring has no instances")]
	EmptyRing,

	#[error("failed to read tokens file {path}: {source}")]
	TokensFile { path: String, #[source] source: std::io::Error },

	#[error("failed to decode tokens file {path}: {source}")]
	TokensFileCodec { path: String, #[source] source: serde_json::Error },
}
