//! Job board API client.
//!
//! [`ApiClient`] talks to the REST backend over a [`Transport`], attaching the
//! bearer token held by an injected [`SessionContext`]. A rejected credential
//! clears the session and is announced as [`SessionEvent::Unauthorized`]
//! instead of navigating anywhere; the host subscribes and decides.
//!
//! [`ClientError`] implements [`jobline_fetch::OperationError`], so endpoint
//! calls plug straight into a [`jobline_fetch::Fetcher`]. Use the
//! `*_cancellable` variants with [`InvocationToken::cancellation`] to abort
//! superseded requests early.
//!
//! [`InvocationToken::cancellation`]: jobline_fetch::InvocationToken::cancellation

mod api;
mod client;
pub mod config;
mod error;
pub mod model;
pub mod session;
#[cfg(test)]
mod testing;
pub mod transport;
pub mod validate;

pub use client::{ApiClient, with_cancel};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ClientResult};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionContext, SessionEvent, SessionStore};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
pub use validate::ValidationErrors;
