use std::future::Future;

use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::Trigger;

/// Spawns fetcher work onto the ambient Tokio runtime, inside a span naming
/// what started it.
///
/// # Panics
///
/// Panics when called outside a Tokio runtime.
pub(crate) fn spawn<F>(trigger: Trigger, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	let span = tracing::debug_span!("fetch.task", trigger = trigger.as_str());
	tokio::spawn(fut.instrument(span))
}
