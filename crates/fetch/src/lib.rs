//! Cancellable, debounced data fetching.
//!
//! This crate provides one primitive, [`Fetcher`], which runs a caller
//! supplied async operation and exposes the latest non-superseded outcome as
//! reactive [`FetchState`]:
//! * every invocation supersedes the previous one (last-issued wins)
//! * an optional debounce delays the operation until calls go quiet
//! * teardown cancels everything and freezes state
//! * cancellation failures are suppressed, all other failures are surfaced

#![warn(missing_docs)]

mod error;
pub mod fetcher;
mod options;
mod spawn;
mod state;
mod token;
mod trigger;

pub use error::OperationError;
pub use fetcher::{Fetcher, Outcome};
pub use options::{FetchOptions, StaleData};
pub use state::FetchState;
pub use token::InvocationToken;
pub use trigger::Trigger;
