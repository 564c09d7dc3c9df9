//! HTTP transport seam.
//!
//! [`ApiClient`](crate::ApiClient) speaks to the network only through the
//! [`Transport`] trait, which keeps credential injection and the 401 policy
//! testable without a server. [`ReqwestTransport`] is the production
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Request body variants used by the API.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
	#[default]
	Empty,
	/// JSON document.
	Json(serde_json::Value),
	/// `multipart/form-data` made of text fields.
	Multipart(Vec<(String, String)>),
}

/// Transport-level request, relative to the API base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
	pub method: Method,
	pub path: String,
	pub headers: HeaderMap,
	pub body: RequestBody,
}

impl ApiRequest {
	/// Creates a body-less request.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			headers: HeaderMap::new(),
			body: RequestBody::Empty,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// Attaches a JSON body.
	#[must_use]
	pub fn json(mut self, body: serde_json::Value) -> Self {
		self.body = RequestBody::Json(body);
		self
	}

	/// Attaches a multipart body of text fields.
	#[must_use]
	pub fn multipart(mut self, fields: Vec<(String, String)>) -> Self {
		self.body = RequestBody::Multipart(fields);
		self
	}
}

/// Transport-level response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
	pub status: StatusCode,
	pub body: Bytes,
}

impl ApiResponse {
	/// Creates a response with a JSON body.
	pub fn json(status: StatusCode, body: &serde_json::Value) -> Self {
		Self {
			status,
			body: Bytes::from(body.to_string()),
		}
	}
}

/// Sends API requests.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Sends `request` and returns the raw response, whatever its status.
	async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse>;
}

/// [`Transport`] over a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	http: reqwest::Client,
	base_url: Url,
}

impl ReqwestTransport {
	/// Creates a transport rooted at `base_url`.
	pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
		let mut base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());
			base_url.set_path(&path);
		}

		let http = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ClientError::Network(e.to_string()))?;

		Ok(Self { http, base_url })
	}

	/// Base URL requests are resolved against.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Resolves an API path against the base URL.
	pub fn resolve(&self, path: &str) -> ClientResult<Url> {
		self.base_url
			.join(path.trim_start_matches('/'))
			.map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
	}
}

#[async_trait]
impl Transport for ReqwestTransport {
	async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
		let url = self.resolve(&request.path)?;
		let builder = self.http.request(request.method, url).headers(request.headers);
		let builder = match request.body {
			RequestBody::Empty => builder,
			RequestBody::Json(value) => builder.json(&value),
			RequestBody::Multipart(fields) => {
				let form = fields
					.into_iter()
					.fold(reqwest::multipart::Form::new(), |form, (name, value)| form.text(name, value));
				builder.multipart(form)
			}
		};

		let response = builder.send().await.map_err(|e| ClientError::Network(e.to_string()))?;
		let status = response.status();
		let body = response.bytes().await.map_err(|e| ClientError::Network(e.to_string()))?;
		Ok(ApiResponse { status, body })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn resolve_keeps_base_path() {
		let transport = ReqwestTransport::new("http://localhost:8000/api", Duration::from_secs(5)).unwrap();
		assert_eq!(transport.base_url().as_str(), "http://localhost:8000/api/");
		assert_eq!(transport.resolve("/jobs/42").unwrap().as_str(), "http://localhost:8000/api/jobs/42");
	}

	#[test]
	fn resolve_from_bare_origin() {
		let transport = ReqwestTransport::new("http://localhost:8000", Duration::from_secs(5)).unwrap();
		assert_eq!(transport.resolve("/jobs").unwrap().as_str(), "http://localhost:8000/jobs");
	}

	#[test]
	fn rejects_invalid_base_url() {
		let err = ReqwestTransport::new("not a url", Duration::from_secs(5)).unwrap_err();
		assert!(matches!(err, ClientError::InvalidUrl(_)));
	}

	#[test]
	fn request_builders_set_body() {
		let request = ApiRequest::new(Method::POST, "/jobs").json(serde_json::json!({"a": 1}));
		assert_eq!(request.body, RequestBody::Json(serde_json::json!({"a": 1})));
		let request = ApiRequest::get("/jobs").multipart(vec![("name".into(), "Jane".into())]);
		assert!(matches!(request.body, RequestBody::Multipart(ref f) if f.len() == 1));
	}
}
