use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub(crate) type Observer<V> = Arc<dyn Fn(&V) + Send + Sync>;

/// What happens to previously fetched data when a refetch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaleData {
	/// Keep the last successful result next to the new error.
	#[default]
	Keep,
	/// Drop the last successful result when an error is recorded.
	Clear,
}

/// Fetcher configuration.
pub struct FetchOptions<T, E> {
	pub(crate) immediate: bool,
	pub(crate) debounce: Duration,
	pub(crate) stale_data: StaleData,
	pub(crate) on_success: Option<Observer<T>>,
	pub(crate) on_error: Option<Observer<E>>,
}

impl<T, E> Default for FetchOptions<T, E> {
	fn default() -> Self {
		Self {
			immediate: true,
			debounce: Duration::ZERO,
			stale_data: StaleData::Keep,
			on_success: None,
			on_error: None,
		}
	}
}

impl<T, E> Clone for FetchOptions<T, E> {
	fn clone(&self) -> Self {
		Self {
			immediate: self.immediate,
			debounce: self.debounce,
			stale_data: self.stale_data,
			on_success: self.on_success.clone(),
			on_error: self.on_error.clone(),
		}
	}
}

impl<T, E> fmt::Debug for FetchOptions<T, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FetchOptions")
			.field("immediate", &self.immediate)
			.field("debounce", &self.debounce)
			.field("stale_data", &self.stale_data)
			.field("on_success", &self.on_success.is_some())
			.field("on_error", &self.on_error.is_some())
			.finish()
	}
}

impl<T, E> FetchOptions<T, E> {
	/// Creates the default configuration: immediate, no debounce.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets whether activation and dependency changes run the operation.
	#[must_use]
	pub fn immediate(mut self, immediate: bool) -> Self {
		self.immediate = immediate;
		self
	}

	/// Sets the quiet period before an invocation starts the operation.
	#[must_use]
	pub fn debounce(mut self, debounce: Duration) -> Self {
		self.debounce = debounce;
		self
	}

	/// Shorthand for [`Self::debounce`] in milliseconds.
	#[must_use]
	pub fn debounce_ms(self, millis: u64) -> Self {
		self.debounce(Duration::from_millis(millis))
	}

	/// Sets the stale data policy applied on failed settlements.
	#[must_use]
	pub fn stale_data(mut self, policy: StaleData) -> Self {
		self.stale_data = policy;
		self
	}

	/// Registers an observer for successful, non-superseded settlements.
	#[must_use]
	pub fn on_success(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
		self.on_success = Some(Arc::new(f));
		self
	}

	/// Registers an observer for failed, non-superseded, non-cancelled settlements.
	#[must_use]
	pub fn on_error(mut self, f: impl Fn(&E) + Send + Sync + 'static) -> Self {
		self.on_error = Some(Arc::new(f));
		self
	}

	/// Returns whether activation runs the operation.
	pub fn is_immediate(&self) -> bool {
		self.immediate
	}

	/// Returns the configured debounce.
	pub fn debounce_duration(&self) -> Duration {
		self.debounce
	}
}
