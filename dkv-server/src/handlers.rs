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

use crate::{error::ApiError, state::AppState};
use axum::{
	body::Bytes,
	extract::{Path, State},
	http::{header, HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	Json,
};
use base64::Engine;
use serde::{Deserialize, Serialize};

/// `{"value": ...}` — the only shape external clients ever see; the versioned envelope never
/// crosses the client-facing API.
#[derive(Serialize)]
struct GetValueResponse {
	#[serde(rename = "Value")]
	value: String,
}

#[derive(Deserialize)]
pub struct PostValueByKeyRequest {
	#[serde(rename = "Value")]
	value: String,
}

fn accepts_json(headers: &HeaderMap) -> bool {
	headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()).map(|v| v.contains("application/json")).unwrap_or(false)
}

pub async fn get_value_by_key(
	State(state): State<AppState>,
	Path((bucket, key)): Path<(String, String)>,
	headers: HeaderMap,
) -> Result<Response, ApiError> {
	let value = state.distributor.get(&bucket, &key, state.request_deadline).await?;
	if accepts_json(&headers) {
		let encoded = base64::engine::general_purpose::STANDARD.encode(&value);
		Ok(Json(GetValueResponse { value: encoded }).into_response())
	} else {
		Ok(value.into_response())
	}
}

pub async fn post_value_by_key(
	State(state): State<AppState>,
	Path((bucket, key)): Path<(String, String)>,
	Json(req): Json<PostValueByKeyRequest>,
) -> Result<StatusCode, ApiError> {
	state.distributor.put(&bucket, &key, req.value.into_bytes(), state.request_deadline).await?;
	Ok(StatusCode::OK)
}

#[derive(Deserialize)]
pub struct InternalGetRequest {
	#[serde(rename = "bucketName", with = "base64_string")]
	bucket_name: String,
	#[serde(with = "base64_string")]
	key: String,
}

#[derive(Deserialize)]
pub struct InternalPutRequest {
	#[serde(rename = "bucketName", with = "base64_string")]
	bucket_name: String,
	#[serde(with = "base64_string")]
	key: String,
	#[serde(with = "base64_bytes")]
	value: Vec<u8>,
}

mod base64_string {
	use base64::Engine;
	use serde::{Deserialize, Deserializer};

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
		let encoded = String::deserialize(deserializer)?;
		let bytes = base64::engine::general_purpose::STANDARD.decode(encoded).map_err(serde::de::Error::custom)?;
		String::from_utf8(bytes).map_err(serde::de::Error::custom)
	}
}

mod base64_bytes {
	use base64::Engine;
	use serde::{Deserialize, Deserializer};

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
		let encoded = String::deserialize(deserializer)?;
		base64::engine::general_purpose::STANDARD.decode(encoded).map_err(serde::de::Error::custom)
	}
}

/// The internal peer API never reconciles or quorum-checks: it talks straight to this node's own
/// local store, since the distributor on the *calling* node is the one doing fan-out.
pub async fn internal_get(State(state): State<AppState>, Json(req): Json<InternalGetRequest>) -> Response {
	let local = match state.pool.get(&state.self_address).await {
		Some(store) => store,
		None => return StatusCode::SERVICE_UNAVAILABLE.into_response(),
	};
	match local.get(&req.bucket_name, &req.key).await {
		Ok(Some(bytes)) => Bytes::from(bytes).into_response(),
		Ok(None) => StatusCode::NOT_FOUND.into_response(),
		Err(err) => {
			log::warn!("internal get failed: {err}");
			StatusCode::INTERNAL_SERVER_ERROR.into_response()
		},
	}
}

pub async fn internal_put(State(state): State<AppState>, Json(req): Json<InternalPutRequest>) -> StatusCode {
	let local = match state.pool.get(&state.self_address).await {
		Some(store) => store,
		None => return StatusCode::SERVICE_UNAVAILABLE,
	};
	match local.put(&req.bucket_name, &req.key, req.value).await {
		Ok(()) => StatusCode::OK,
		Err(err) => {
			log::warn!("internal put failed: {err}");
			StatusCode::INTERNAL_SERVER_ERROR
		},
	}
}

pub async fn metrics(State(state): State<AppState>) -> String {
	state.metrics.gather_text()
}

pub async fn ready(State(state): State<AppState>) -> StatusCode {
	if state.lifecycler.is_ready() {
		StatusCode::OK
	} else {
		StatusCode::SERVICE_UNAVAILABLE
	}
}

pub async fn health() -> StatusCode {
	StatusCode::OK
}
