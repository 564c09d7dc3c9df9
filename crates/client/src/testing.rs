use std::collections::VecDeque;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::StatusCode;

use crate::error::{ClientError, ClientResult};
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Transport replaying canned responses and recording requests.
#[derive(Default)]
pub(crate) struct FakeTransport {
	responses: Mutex<VecDeque<ClientResult<ApiResponse>>>,
	requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn respond(&self, status: StatusCode, body: serde_json::Value) {
		self.responses.lock().push_back(Ok(ApiResponse::json(status, &body)));
	}

	pub fn respond_raw(&self, status: StatusCode, body: &'static str) {
		self.responses.lock().push_back(Ok(ApiResponse {
			status,
			body: Bytes::from_static(body.as_bytes()),
		}));
	}

	pub fn requests(&self) -> Vec<ApiRequest> {
		self.requests.lock().clone()
	}
}

#[async_trait]
impl Transport for FakeTransport {
	async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
		self.requests.lock().push(request);
		self.responses
			.lock()
			.pop_front()
			.unwrap_or_else(|| Err(ClientError::Network("no canned response".into())))
	}
}

/// Transport whose requests never complete.
pub(crate) struct StalledTransport;

#[async_trait]
impl Transport for StalledTransport {
	async fn send(&self, _request: ApiRequest) -> ClientResult<ApiResponse> {
		std::future::pending().await
	}
}
