//! Cancellable, debounced fetcher.
//!
//! A [`Fetcher`] wraps one asynchronous operation and publishes the outcome
//! of its latest invocation as a [`FetchState`].
//!
//! # Supersession
//!
//! Every call to [`Fetcher::execute`] issues a fresh [`InvocationToken`] and
//! cancels the previous one before returning its future. Settlement commits to
//! state only if the settling token is still the current one, so the
//! last-issued invocation wins regardless of which one finishes last or in
//! which order the futures are awaited. [`Fetcher::trigger`] issues its token
//! before spawning, which makes issue order equal to call order.
//!
//! An invocation dropped before it settles (an `execute` future abandoned by
//! a timeout, an aborted `trigger` task) gives up its token and clears
//! `loading` if it was still current.
//!
//! # Debounce
//!
//! With a non-zero debounce an invocation sleeps before calling the wrapped
//! operation. A newer invocation arriving during the sleep cancels it and the
//! operation is never called.
//!
//! # Teardown
//!
//! [`Fetcher::teardown`] (also run on drop) cancels the scope token that all
//! invocation tokens derive from. Commit, supersession and teardown share one
//! lock, and teardown waits for observers already running, so once teardown
//! returns no invocation can touch state or call an observer. Teardown called
//! from inside an observer does not wait.

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::options::FetchOptions;
use crate::spawn::spawn;
use crate::state::FetchState;
use crate::token::{InvocationClock, InvocationToken};
use crate::{OperationError, StaleData, Trigger};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;
type OperationFn<A, T, E> = dyn Fn(A, InvocationToken) -> BoxFuture<Result<T, E>> + Send + Sync;

thread_local! {
	/// Observer callbacks currently running on this thread.
	static OBSERVING: Cell<usize> = const { Cell::new(0) };
}

/// Marks the current thread as running an observer.
struct ObserverScope;

impl ObserverScope {
	fn enter() -> Self {
		OBSERVING.with(|depth| depth.set(depth.get() + 1));
		Self
	}

	fn is_active() -> bool {
		OBSERVING.with(|depth| depth.get() > 0)
	}
}

impl Drop for ObserverScope {
	fn drop(&mut self) {
		OBSERVING.with(|depth| depth.set(depth.get() - 1));
	}
}

/// How one invocation ended, from the fetcher's point of view.
///
/// Purely diagnostic: the state channel remains the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	/// The result was committed to state.
	Applied,
	/// The failure was committed to state.
	Failed,
	/// The operation reported a cancellation; state was left untouched.
	Cancelled,
	/// A newer invocation took over before this one settled.
	Superseded,
	/// The fetcher was torn down before this invocation settled.
	TornDown,
}

struct Shared<A, T, E> {
	op: Box<OperationFn<A, T, E>>,
	options: FetchOptions<T, E>,
	state: watch::Sender<FetchState<T, E>>,
	clock: InvocationClock,
	current: Mutex<Option<InvocationToken>>,
	/// Held shared while an observer runs; teardown takes it exclusively.
	observers: RwLock<()>,
	scope: CancellationToken,
}

/// An issued invocation. Dropping it before settlement abandons it.
struct Invocation<A, T, E> {
	shared: Arc<Shared<A, T, E>>,
	token: InvocationToken,
}

impl<A, T, E> Shared<A, T, E>
where
	A: Send + 'static,
	T: Clone + Send + Sync + 'static,
	E: OperationError + Clone + Send + Sync + 'static,
{
	/// Supersedes the current invocation and issues a new one.
	///
	/// Returns `None` once the fetcher has been torn down.
	fn begin(shared: &Arc<Self>, trigger: Trigger) -> Option<Invocation<A, T, E>> {
		let mut current = shared.current.lock();
		if shared.scope.is_cancelled() {
			tracing::trace!(trigger = trigger.as_str(), "fetch.execute.torn_down");
			return None;
		}
		if let Some(previous) = current.take() {
			previous.cancel();
			tracing::trace!(generation = previous.generation(), "fetch.superseded");
		}

		let token = InvocationToken::new(shared.clock.next(), shared.scope.child_token());
		tracing::debug!(generation = token.generation(), trigger = trigger.as_str(), "fetch.execute");
		shared.state.send_modify(FetchState::begin);
		*current = Some(token.clone());
		Some(Invocation {
			shared: Arc::clone(shared),
			token,
		})
	}

	/// Issues an invocation now and returns the future that drives it.
	fn invoke(shared: &Arc<Self>, args: A, trigger: Trigger) -> impl Future<Output = Outcome> + Send + use<A, T, E> {
		let invocation = Self::begin(shared, trigger);
		async move {
			match invocation {
				Some(invocation) => invocation.run(args).await,
				None => Outcome::TornDown,
			}
		}
	}

	fn launch(shared: &Arc<Self>, args: A, trigger: Trigger) -> JoinHandle<Outcome> {
		spawn(trigger, Self::invoke(shared, args, trigger))
	}

	fn settle(&self, token: &InvocationToken, result: Result<T, E>) -> Outcome {
		let generation = token.generation();
		let mut current = self.current.lock();
		let is_current = current.as_ref().map(InvocationToken::generation) == Some(generation);
		if token.is_cancelled() || !is_current {
			drop(current);
			return self.discarded(token);
		}
		*current = None;

		match result {
			Ok(data) => {
				let observed = self.options.on_success.as_ref().map(|f| (Arc::clone(f), data.clone()));
				self.state.send_modify(|state| state.succeed(data));
				drop(current);
				tracing::debug!(generation, "fetch.applied");
				if let Some((on_success, data)) = observed {
					self.observe(|| on_success(&data));
				}
				Outcome::Applied
			}
			Err(error) if error.is_cancellation() => {
				drop(current);
				tracing::debug!(generation, "fetch.cancelled");
				Outcome::Cancelled
			}
			Err(error) => {
				let observed = self.options.on_error.as_ref().map(|f| (Arc::clone(f), error.clone()));
				let clear_data = self.options.stale_data == StaleData::Clear;
				self.state.send_modify(|state| state.fail(error, clear_data));
				drop(current);
				tracing::debug!(generation, clear_data, "fetch.failed");
				if let Some((on_error, error)) = observed {
					self.observe(|| on_error(&error));
				}
				Outcome::Failed
			}
		}
	}

	fn discarded(&self, token: &InvocationToken) -> Outcome {
		if self.scope.is_cancelled() {
			tracing::trace!(generation = token.generation(), "fetch.discarded.torn_down");
			Outcome::TornDown
		} else {
			tracing::trace!(generation = token.generation(), "fetch.discarded.superseded");
			Outcome::Superseded
		}
	}
}

impl<A, T, E> Shared<A, T, E> {
	/// Releases `token` if it is still current without having settled.
	fn abandon(&self, token: &InvocationToken) {
		let mut current = self.current.lock();
		if current.as_ref().map(InvocationToken::generation) != Some(token.generation()) {
			return;
		}
		*current = None;
		token.cancel();
		self.state.send_modify(FetchState::abandon);
		tracing::debug!(generation = token.generation(), "fetch.abandoned");
	}

	/// Runs an observer unless teardown has started.
	fn observe(&self, notify: impl FnOnce()) {
		let _running = self.observers.read_recursive();
		if self.scope.is_cancelled() {
			tracing::trace!("fetch.observer.skipped");
			return;
		}
		let _scope = ObserverScope::enter();
		notify();
	}
}

impl<A, T, E> Invocation<A, T, E>
where
	A: Send + 'static,
	T: Clone + Send + Sync + 'static,
	E: OperationError + Clone + Send + Sync + 'static,
{
	async fn run(self, args: A) -> Outcome {
		let (shared, token) = (&self.shared, &self.token);
		let debounce = shared.options.debounce;
		if !debounce.is_zero() {
			tokio::select! {
				biased;
				_ = token.cancelled() => return shared.discarded(token),
				_ = tokio::time::sleep(debounce) => {}
			}
		}
		if token.is_cancelled() {
			return shared.discarded(token);
		}

		let operation = (shared.op)(args, token.clone());
		let result = tokio::select! {
			biased;
			_ = token.cancelled() => return shared.discarded(token),
			result = operation => result,
		};
		shared.settle(token, result)
	}
}

impl<A, T, E> Drop for Invocation<A, T, E> {
	fn drop(&mut self) {
		self.shared.abandon(&self.token);
	}
}

/// Runs an async operation under supersession and debounce control.
///
/// `A` is the argument forwarded to the operation, `T` its success value and
/// `E` its error. Dropping the fetcher tears it down.
pub struct Fetcher<A, T, E> {
	shared: Arc<Shared<A, T, E>>,
}

impl<A, T, E> Fetcher<A, T, E>
where
	A: Send + 'static,
	T: Clone + Send + Sync + 'static,
	E: OperationError + Clone + Send + Sync + 'static,
{
	/// Creates a fetcher around `op`.
	///
	/// The operation receives the invocation's token and may watch it to
	/// abort early. It is dropped at the next await point once the token is
	/// cancelled, and its result is ignored if it settles anyway.
	pub fn new<F, Fut>(op: F, options: FetchOptions<T, E>) -> Self
	where
		F: Fn(A, InvocationToken) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<T, E>> + Send + 'static,
	{
		let op: Box<OperationFn<A, T, E>> =
			Box::new(move |args: A, token: InvocationToken| -> BoxFuture<Result<T, E>> { Box::pin(op(args, token)) });
		let (state, _) = watch::channel(FetchState::default());
		Self {
			shared: Arc::new(Shared {
				op,
				options,
				state,
				clock: InvocationClock::new(),
				current: Mutex::new(None),
				observers: RwLock::new(()),
				scope: CancellationToken::new(),
			}),
		}
	}

	/// Runs the operation with `args`, superseding any pending invocation.
	///
	/// The invocation is issued when this is called, not when the future is
	/// first polled. The future resolves once this invocation settles, is
	/// superseded, or the fetcher is torn down. Dropping it early abandons
	/// the invocation.
	pub fn execute(&self, args: A) -> impl Future<Output = Outcome> + Send + use<A, T, E> {
		Shared::invoke(&self.shared, args, Trigger::Manual)
	}

	/// Like [`Self::execute`], but spawned onto the runtime.
	///
	/// The invocation is issued before this returns, so a later `trigger`
	/// or `execute` call always supersedes it.
	///
	/// # Panics
	///
	/// Panics when called outside a Tokio runtime, as do [`Self::activate`]
	/// and [`Self::activate_with`].
	pub fn trigger(&self, args: A) -> JoinHandle<Outcome> {
		Shared::launch(&self.shared, args, Trigger::Manual)
	}

	/// Clears data and error and marks the fetcher as not loading.
	///
	/// In-flight work is not cancelled and may still commit later. No-op
	/// after teardown.
	pub fn reset(&self) {
		let _current = self.shared.current.lock();
		if self.shared.scope.is_cancelled() {
			return;
		}
		self.shared.state.send_modify(FetchState::clear);
		tracing::trace!("fetch.reset");
	}

	/// Runs the operation once with default arguments if `immediate` is set.
	pub fn activate(&self) -> Option<JoinHandle<Outcome>>
	where
		A: Default,
	{
		if !self.shared.options.immediate {
			return None;
		}
		Some(Shared::launch(&self.shared, A::default(), Trigger::Activation))
	}

	/// Binds the fetcher to a reactive dependency set.
	///
	/// With `immediate` set, the operation runs now with the current value and
	/// again whenever the value changes to something different from the last
	/// executed one. Each run supersedes the previous one. The returned driver
	/// stops at teardown or when the sender side is dropped.
	pub fn activate_with(&self, mut deps: watch::Receiver<A>) -> JoinHandle<()>
	where
		A: Clone + PartialEq + Sync,
	{
		let shared = Arc::clone(&self.shared);
		let mut last = deps.borrow_and_update().clone();
		if shared.options.immediate {
			drop(Shared::launch(&shared, last.clone(), Trigger::Activation));
		}

		let scope = shared.scope.clone();
		spawn(Trigger::Dependency, async move {
			loop {
				tokio::select! {
					biased;
					_ = scope.cancelled() => break,
					changed = deps.changed() => {
						if changed.is_err() {
							break;
						}
						let next = deps.borrow_and_update().clone();
						if next == last {
							continue;
						}
						last = next.clone();
						if shared.options.immediate {
							drop(Shared::launch(&shared, next, Trigger::Dependency));
						}
					}
				}
			}
			tracing::trace!("fetch.dependencies.closed");
		})
	}

	/// Returns a snapshot of the current state.
	pub fn state(&self) -> FetchState<T, E> {
		self.shared.state.borrow().clone()
	}
}

impl<A, T, E> Fetcher<A, T, E> {
	/// Subscribes to state changes.
	pub fn subscribe(&self) -> watch::Receiver<FetchState<T, E>> {
		self.shared.state.subscribe()
	}

	/// Generation of the invocation currently allowed to commit, if any.
	pub fn current_generation(&self) -> Option<u64> {
		self.shared.current.lock().as_ref().map(InvocationToken::generation)
	}

	/// Returns true once [`Self::teardown`] has run.
	pub fn is_torn_down(&self) -> bool {
		self.shared.scope.is_cancelled()
	}

	/// Cancels the current invocation, any pending debounce and the
	/// dependency driver. Afterwards state is frozen.
	///
	/// Waits for observer callbacks that are already running, unless called
	/// from inside one.
	pub fn teardown(&self) {
		{
			let mut current = self.shared.current.lock();
			if self.shared.scope.is_cancelled() {
				return;
			}
			self.shared.scope.cancel();
			let pending = current.take().map(|token| token.generation());
			tracing::debug!(pending = ?pending, "fetch.teardown");
		}
		if !ObserverScope::is_active() {
			drop(self.shared.observers.write());
		}
	}
}

impl<A, T, E> Drop for Fetcher<A, T, E> {
	fn drop(&mut self) {
		self.teardown();
	}
}

impl<A, T, E> fmt::Debug for Fetcher<A, T, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Fetcher")
			.field("options", &self.shared.options)
			.field("current_generation", &self.current_generation())
			.field("torn_down", &self.is_torn_down())
			.finish()
	}
}
