//! Injectable session context.
//!
//! The session (bearer token plus the signed-in user) lives behind a
//! [`SessionStore`] and is handed to the client explicitly through a
//! [`SessionContext`]. State transitions are published as [`SessionEvent`]s;
//! in particular a rejected credential produces
//! [`SessionEvent::Unauthorized`] carrying the login entry point, and the
//! host decides how to navigate there.

mod store;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub use self::store::{FileSessionStore, MemorySessionStore, SessionStore};
use crate::error::ClientResult;

/// Session event broadcast buffer capacity.
const EVENT_BUFFER: usize = 16;

/// Role of the signed-in user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	Admin,
	#[default]
	User,
}

/// Signed-in user record stored next to the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
	pub name: String,
	pub email: String,
	#[serde(default)]
	pub role: Role,
}

/// Bearer token and optional user record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
	pub token: String,
	pub user: Option<SessionUser>,
}

impl Session {
	/// Creates a session holding only a token.
	pub fn new(token: impl Into<String>) -> Self {
		Self {
			token: token.into(),
			user: None,
		}
	}

	/// Attaches the user record.
	#[must_use]
	pub fn with_user(mut self, user: SessionUser) -> Self {
		self.user = Some(user);
		self
	}

	/// Returns true if the stored user is an admin.
	pub fn is_admin(&self) -> bool {
		self.user.as_ref().is_some_and(|user| user.role == Role::Admin)
	}
}

impl fmt::Debug for Session {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Session")
			.field("token", &"<redacted>")
			.field("user", &self.user)
			.finish()
	}
}

/// Session state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
	/// A session was stored.
	SignedIn { user: Option<SessionUser> },
	/// The session was cleared on request.
	SignedOut,
	/// The server rejected the credential; the session was cleared and the
	/// host should send the user to `redirect`.
	Unauthorized { redirect: String },
}

/// Shared handle to the session store plus its event stream.
#[derive(Clone)]
pub struct SessionContext {
	store: Arc<dyn SessionStore>,
	events: broadcast::Sender<SessionEvent>,
}

impl SessionContext {
	/// Creates a context over `store`.
	pub fn new(store: impl SessionStore + 'static) -> Self {
		Self::from_shared(Arc::new(store))
	}

	/// Creates a context over an already shared store.
	pub fn from_shared(store: Arc<dyn SessionStore>) -> Self {
		let (events, _) = broadcast::channel(EVENT_BUFFER);
		Self { store, events }
	}

	/// Creates a context over a fresh in-memory store.
	pub fn in_memory() -> Self {
		Self::new(MemorySessionStore::new())
	}

	/// Returns the stored session. Store failures read as signed out.
	pub fn current(&self) -> Option<Session> {
		match self.store.load() {
			Ok(session) => session,
			Err(error) => {
				tracing::warn!(%error, "session.load_failed");
				None
			}
		}
	}

	/// Returns the stored bearer token.
	pub fn token(&self) -> Option<String> {
		self.current().map(|session| session.token)
	}

	/// Returns true if a session is stored.
	pub fn is_signed_in(&self) -> bool {
		self.current().is_some()
	}

	/// Stores `session` and announces it.
	pub fn sign_in(&self, session: Session) -> ClientResult<()> {
		self.store.save(&session)?;
		tracing::debug!(user = ?session.user.as_ref().map(|u| &u.email), "session.signed_in");
		self.emit(SessionEvent::SignedIn { user: session.user });
		Ok(())
	}

	/// Clears the session and announces it.
	pub fn sign_out(&self) -> ClientResult<()> {
		self.store.clear()?;
		tracing::debug!("session.signed_out");
		self.emit(SessionEvent::SignedOut);
		Ok(())
	}

	/// Clears the session after the server rejected it.
	///
	/// Always emits [`SessionEvent::Unauthorized`], even if the store could
	/// not be cleared.
	pub fn expire(&self, redirect: &str) {
		if let Err(error) = self.store.clear() {
			tracing::warn!(%error, "session.clear_failed");
		}
		tracing::info!(redirect, "session.expired");
		self.emit(SessionEvent::Unauthorized {
			redirect: redirect.to_string(),
		});
	}

	/// Subscribes to session events.
	pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
		self.events.subscribe()
	}

	fn emit(&self, event: SessionEvent) {
		let _ = self.events.send(event);
	}
}

impl fmt::Debug for SessionContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionContext")
			.field("signed_in", &self.is_signed_in())
			.field("subscribers", &self.events.receiver_count())
			.finish()
	}
}
