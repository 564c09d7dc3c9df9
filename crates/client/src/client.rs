//! Authenticated API client.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionContext;
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

/// Sends requests with the session's bearer token and enforces the 401 policy.
///
/// On `401 Unauthorized` the session is expired through
/// [`SessionContext::expire`], which clears it and broadcasts
/// [`SessionEvent::Unauthorized`](crate::SessionEvent::Unauthorized) with the
/// configured login path. The call itself fails with
/// [`ClientError::Unauthorized`].
#[derive(Clone)]
pub struct ApiClient {
	transport: Arc<dyn Transport>,
	session: SessionContext,
	login_path: String,
}

impl ApiClient {
	/// Creates a client over HTTP as described by `config`.
	pub fn new(config: &ClientConfig, session: SessionContext) -> ClientResult<Self> {
		let transport = ReqwestTransport::new(&config.base_url, config.timeout())?;
		Ok(Self::with_transport(Arc::new(transport), session, config.login_path.clone()))
	}

	/// Creates a client over an arbitrary transport.
	pub fn with_transport(transport: Arc<dyn Transport>, session: SessionContext, login_path: impl Into<String>) -> Self {
		Self {
			transport,
			session,
			login_path: login_path.into(),
		}
	}

	/// Session this client reads credentials from.
	pub fn session(&self) -> &SessionContext {
		&self.session
	}

	/// Login entry point announced on 401.
	pub fn login_path(&self) -> &str {
		&self.login_path
	}

	/// Sends `request` and returns the response if its status is a success.
	pub async fn send(&self, mut request: ApiRequest) -> ClientResult<ApiResponse> {
		self.authorize(&mut request)?;
		let method = request.method.clone();
		let path = request.path.clone();
		tracing::debug!(%method, %path, "client.request");

		let response = self.transport.send(request).await?;
		let status = response.status;
		if status == StatusCode::UNAUTHORIZED {
			tracing::warn!(%method, %path, "client.unauthorized");
			self.session.expire(&self.login_path);
			return Err(ClientError::Unauthorized);
		}
		if !status.is_success() {
			tracing::debug!(%method, %path, status = status.as_u16(), "client.status");
			return Err(ClientError::Status {
				status: status.as_u16(),
				detail: error_detail(&response.body),
			});
		}
		Ok(response)
	}

	/// Like [`Self::send`], but gives up with [`ClientError::Cancelled`] once
	/// `cancel` fires.
	pub async fn send_cancellable(&self, request: ApiRequest, cancel: &CancellationToken) -> ClientResult<ApiResponse> {
		with_cancel(cancel, self.send(request)).await
	}

	/// Sends `request` and decodes the JSON response body.
	pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
		let response = self.send(request).await?;
		decode(&response.body)
	}

	fn authorize(&self, request: &mut ApiRequest) -> ClientResult<()> {
		let Some(token) = self.session.token() else {
			return Ok(());
		};
		let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
			.map_err(|_| ClientError::Session("stored token is not a valid header value".into()))?;
		value.set_sensitive(true);
		request.headers.insert(AUTHORIZATION, value);
		Ok(())
	}
}

impl fmt::Debug for ApiClient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ApiClient")
			.field("session", &self.session)
			.field("login_path", &self.login_path)
			.finish_non_exhaustive()
	}
}

/// Runs `fut` until it completes or `cancel` fires.
pub async fn with_cancel<F, T>(cancel: &CancellationToken, fut: F) -> ClientResult<T>
where
	F: Future<Output = ClientResult<T>>,
{
	tokio::select! {
		biased;
		_ = cancel.cancelled() => Err(ClientError::Cancelled),
		result = fut => result,
	}
}

pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> ClientResult<T> {
	serde_json::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Extracts the `detail` message of an error body, falling back to the raw text.
fn error_detail(body: &[u8]) -> String {
	#[derive(Deserialize)]
	struct ErrorBody {
		detail: serde_json::Value,
	}

	match serde_json::from_slice::<ErrorBody>(body) {
		Ok(ErrorBody {
			detail: serde_json::Value::String(message),
		}) => message,
		Ok(ErrorBody { detail }) => detail.to_string(),
		Err(_) => String::from_utf8_lossy(body).trim().to_string(),
	}
}
