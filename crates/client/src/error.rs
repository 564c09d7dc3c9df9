//! Error types for the API client.

use jobline_fetch::OperationError;
use thiserror::Error;

use crate::validate::ValidationErrors;

/// Errors produced by [`ApiClient`](crate::ApiClient) and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
	/// Request could not be sent or the response body could not be read.
	#[error("network error: {0}")]
	Network(String),

	/// Server answered with a non-success status other than 401.
	#[error("server returned {status}: {detail}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// `detail` field of the error body, or the raw body.
		detail: String,
	},

	/// Server rejected the credential. The session has been cleared.
	#[error("not authorized; session cleared")]
	Unauthorized,

	/// Response body did not match the expected shape.
	#[error("invalid response body: {0}")]
	Decode(String),

	/// Request payload could not be serialized.
	#[error("could not encode request body: {0}")]
	Encode(String),

	/// Request was abandoned because its cancellation token fired.
	#[error("request cancelled")]
	Cancelled,

	/// Session store could not be read or written.
	#[error("session store error: {0}")]
	Session(String),

	/// Base URL or request path could not be turned into a URL.
	#[error("invalid URL: {0}")]
	InvalidUrl(String),

	/// Payload failed client-side validation and was not sent.
	#[error("validation failed: {0}")]
	Validation(ValidationErrors),
}

impl ClientError {
	/// Returns the HTTP status carried by this error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::Unauthorized => Some(401),
			_ => None,
		}
	}
}

impl OperationError for ClientError {
	fn is_cancellation(&self) -> bool {
		matches!(self, Self::Cancelled)
	}
}

impl From<ValidationErrors> for ClientError {
	fn from(errors: ValidationErrors) -> Self {
		Self::Validation(errors)
	}
}

/// Result type for client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_cancelled_is_a_cancellation() {
		assert!(ClientError::Cancelled.is_cancellation());
		assert!(!ClientError::Unauthorized.is_cancellation());
		assert!(!ClientError::Network("reset".into()).is_cancellation());
	}

	#[test]
	fn status_is_exposed_for_http_failures() {
		let err = ClientError::Status {
			status: 404,
			detail: "Job not found".into(),
		};
		assert_eq!(err.status(), Some(404));
		assert_eq!(err.to_string(), "server returned 404: Job not found");
		assert_eq!(ClientError::Unauthorized.status(), Some(401));
		assert_eq!(ClientError::Cancelled.status(), None);
	}
}
