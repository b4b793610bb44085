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

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use dkv_distributor::DistributorError;
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
	error: String,
}

/// Wraps a [`DistributorError`] so handlers can `?`-propagate it and axum renders the right
/// status code for each failure mode.
pub struct ApiError(pub DistributorError);

impl From<DistributorError> for ApiError {
	fn from(err: DistributorError) -> Self {
		ApiError(err)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = match &self.0 {
			DistributorError::KeyValueNotFound => StatusCode::NOT_FOUND,
			DistributorError::QuorumNotReached { .. } => StatusCode::SERVICE_UNAVAILABLE,
			DistributorError::InsufficientReplicas(_) => StatusCode::SERVICE_UNAVAILABLE,
			DistributorError::ContextCancelled => StatusCode::GATEWAY_TIMEOUT,
			DistributorError::Storage { .. } | DistributorError::Codec(_) => StatusCode::INTERNAL_SERVER_ERROR,
		};
		(status, Json(ErrorBody { error: self.0.to_string() })).into_response()
	}
}
