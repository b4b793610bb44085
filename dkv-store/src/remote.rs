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

use crate::{
	error::{Result, StoreError},
	Store,
};
use async_trait::async_trait;
use base64::Engine;
use serde::Serialize;
use std::time::Duration;

/// Talks to one peer's internal API over HTTP. `bucket`/`key`/`value` travel as base64 inside the
/// JSON body, matching the peer's own request decoding.
pub struct RemoteStore {
	address: String,
	client: reqwest::Client,
}

#[derive(Serialize)]
struct GetReq<'a> {
	#[serde(rename = "bucketName", with = "base64_field")]
	bucket_name: &'a str,
	#[serde(with = "base64_field")]
	key: &'a str,
}

#[derive(Serialize)]
struct PutReq<'a> {
	#[serde(rename = "bucketName", with = "base64_field")]
	bucket_name: &'a str,
	#[serde(with = "base64_field")]
	key: &'a str,
	#[serde(with = "base64_bytes")]
	value: &'a [u8],
}

mod base64_field {
	use base64::Engine;
	use serde::Serializer;

	pub fn serialize<S: Serializer>(field: &&str, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(field.as_bytes()))
	}
}

mod base64_bytes {
	use base64::Engine;
	use serde::Serializer;

	pub fn serialize<S: Serializer>(bytes: &&[u8], serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
	}
}

impl RemoteStore {
	pub fn new(address: impl Into<String>) -> Result<Self> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(5))
			.build()
			.map_err(|source| StoreError::RemoteTransport { address: String::new(), source })?;
		Ok(RemoteStore { address: address.into(), client })
	}

	pub fn address(&self) -> &str {
		&self.address
	}

	fn url(&self, path: &str) -> String {
		let address = self.address.trim_end_matches('/');
		if address.starts_with("http://") || address.starts_with("https://") {
			format!("{address}{path}")
		} else {
			format!("http://{address}{path}")
		}
	}
}

#[async_trait]
impl Store for RemoteStore {
	async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
		let body = GetReq { bucket_name: bucket, key };
		let resp = self
			.client
			.post(self.url("/v1/internal/get"))
			.json(&body)
			.send()
			.await
			.map_err(|source| StoreError::RemoteTransport { address: self.address.clone(), source })?;

		if resp.status() == reqwest::StatusCode::NOT_FOUND {
			return Ok(None);
		}
		if !resp.status().is_success() {
			return Err(StoreError::RemoteStatus { address: self.address.clone(), status: resp.status().as_u16() });
		}
		let bytes = resp
			.bytes()
			.await
			.map_err(|source| StoreError::RemoteTransport { address: self.address.clone(), source })?;
		if bytes.is_empty() {
			return Ok(None);
		}
		Ok(Some(bytes.to_vec()))
	}

	async fn put(&self, bucket: &str, key: &str, value: Vec<u8>) -> Result<()> {
		let body = PutReq { bucket_name: bucket, key, value: &value };
		let resp = self
			.client
			.post(self.url("/v1/internal/put"))
			.json(&body)
			.send()
			.await
			.map_err(|source| StoreError::RemoteTransport { address: self.address.clone(), source })?;

		if !resp.status().is_success() {
			return Err(StoreError::RemoteStatus { address: self.address.clone(), status: resp.status().as_u16() });
		}
		Ok(())
	}
}
