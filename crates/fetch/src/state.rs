//! Observable fetch state.

/// Latest non-superseded outcome of a fetcher.
///
/// `loading` is true only between the start of an invocation and its
/// settlement. A successful settlement clears `error`; a failed one leaves
/// `data` alone unless the fetcher is configured with [`StaleData::Clear`].
///
/// [`StaleData::Clear`]: crate::StaleData::Clear
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchState<T, E> {
	/// Result of the last successful settlement.
	pub data: Option<T>,
	/// Whether an invocation is between start and settlement.
	pub loading: bool,
	/// Failure of the last failed settlement.
	pub error: Option<E>,
}

impl<T, E> Default for FetchState<T, E> {
	fn default() -> Self {
		Self {
			data: None,
			loading: false,
			error: None,
		}
	}
}

impl<T, E> FetchState<T, E> {
	/// Returns true when nothing has been fetched and nothing is pending.
	pub fn is_idle(&self) -> bool {
		self.data.is_none() && self.error.is_none() && !self.loading
	}

	pub(crate) fn begin(&mut self) {
		self.loading = true;
		self.error = None;
	}

	pub(crate) fn succeed(&mut self, data: T) {
		self.data = Some(data);
		self.loading = false;
		self.error = None;
	}

	pub(crate) fn fail(&mut self, error: E, clear_data: bool) {
		if clear_data {
			self.data = None;
		}
		self.error = Some(error);
		self.loading = false;
	}

	/// The pending invocation went away without settling.
	pub(crate) fn abandon(&mut self) {
		self.loading = false;
	}

	pub(crate) fn clear(&mut self) {
		self.data = None;
		self.error = None;
		self.loading = false;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn begin_clears_error_but_keeps_data() {
		let mut state = FetchState {
			data: Some(1),
			loading: false,
			error: Some("boom"),
		};
		state.begin();
		assert_eq!(state.data, Some(1));
		assert!(state.loading);
		assert!(state.error.is_none());
	}

	#[test]
	fn fail_respects_clear_flag() {
		let mut keep: FetchState<i32, &str> = FetchState::default();
		keep.succeed(5);
		keep.fail("boom", false);
		assert_eq!(keep.data, Some(5));
		assert_eq!(keep.error, Some("boom"));

		let mut clear: FetchState<i32, &str> = FetchState::default();
		clear.succeed(5);
		clear.fail("boom", true);
		assert!(clear.data.is_none());
		assert!(!clear.loading);
	}

	#[test]
	fn clear_returns_to_idle() {
		let mut state = FetchState {
			data: Some(1),
			loading: true,
			error: Some("boom"),
		};
		state.clear();
		assert!(state.is_idle());
	}
}
