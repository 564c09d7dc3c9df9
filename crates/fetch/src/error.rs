//! Failure classification for wrapped operations.

/// Error type of an operation wrapped by a [`Fetcher`](crate::Fetcher).
///
/// The fetcher does not retry or classify failures beyond one question:
/// was this a cancellation? Cancellations are suppressed; everything else is
/// surfaced through `FetchState::error` and the `on_error` observer.
pub trait OperationError {
	/// Returns true if this failure is a cancellation signal.
	fn is_cancellation(&self) -> bool {
		false
	}
}

impl OperationError for String {}

impl OperationError for &'static str {}

impl OperationError for std::convert::Infallible {}
