use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Monotonic generation clock for fetcher invocations.
#[derive(Debug, Default, Clone)]
pub(crate) struct InvocationClock {
	next: Arc<AtomicU64>,
}

impl InvocationClock {
	/// Creates a new clock starting at generation 1.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the next generation ID.
	pub fn next(&self) -> u64 {
		self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}
}

/// Cancellation handle bound to exactly one fetcher invocation.
///
/// A token is issued when an invocation starts and cancelled when a newer
/// invocation supersedes it or the owning fetcher is torn down. Wrapped
/// operations receive a clone so they can stop early; results arriving on a
/// cancelled token are discarded either way.
#[derive(Debug, Clone)]
pub struct InvocationToken {
	generation: u64,
	cancel: CancellationToken,
}

impl InvocationToken {
	pub(crate) fn new(generation: u64, cancel: CancellationToken) -> Self {
		Self { generation, cancel }
	}

	/// Returns the generation ID of this invocation.
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// Returns true once the invocation has been superseded or torn down.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Future resolving when the invocation is superseded or torn down.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}

	/// Underlying cancellation token, for handing to cancellable I/O.
	pub fn cancellation(&self) -> &CancellationToken {
		&self.cancel
	}

	pub(crate) fn cancel(&self) {
		self.cancel.cancel();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clock_starts_at_one_and_increments() {
		let clock = InvocationClock::new();
		assert_eq!(clock.next(), 1);
		assert_eq!(clock.next(), 2);
		let shared = clock.clone();
		assert_eq!(shared.next(), 3);
	}

	#[test]
	fn child_tokens_follow_scope_cancellation() {
		let scope = CancellationToken::new();
		let token = InvocationToken::new(7, scope.child_token());
		assert_eq!(token.generation(), 7);
		assert!(!token.is_cancelled());

		scope.cancel();
		assert!(token.is_cancelled());
	}

	#[test]
	fn cancelling_token_leaves_scope_alive() {
		let scope = CancellationToken::new();
		let token = InvocationToken::new(1, scope.child_token());
		token.cancel();
		assert!(token.cancellation().is_cancelled());
		assert!(!scope.is_cancelled());
	}
}
