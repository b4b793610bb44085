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

//! Hashes a bucket/key to a ring token, fans out Get/Put across the replicas that own it, and
//! reconciles diverging responses into a single answer.

pub mod distributor;
pub mod error;
pub mod quorum;
pub mod token;

pub use distributor::Distributor;
pub use error::{DistributorError, Result};
pub use token::{AdditiveChecksum, Fnv1a, TokenStrategy};
