//! Session persistence backends.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::{Session, SessionUser};
use crate::error::{ClientError, ClientResult};

/// Storage for the signed-in session.
pub trait SessionStore: Send + Sync {
	/// Loads the stored session, if any.
	fn load(&self) -> ClientResult<Option<Session>>;

	/// Persists `session`, replacing any previous one.
	fn save(&self, session: &Session) -> ClientResult<()>;

	/// Removes the stored session.
	fn clear(&self) -> ClientResult<()>;
}

/// In-process session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
	session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a store that starts signed in.
	pub fn with_session(session: Session) -> Self {
		Self {
			session: RwLock::new(Some(session)),
		}
	}
}

impl SessionStore for MemorySessionStore {
	fn load(&self) -> ClientResult<Option<Session>> {
		Ok(self.session.read().clone())
	}

	fn save(&self, session: &Session) -> ClientResult<()> {
		*self.session.write() = Some(session.clone());
		Ok(())
	}

	fn clear(&self) -> ClientResult<()> {
		*self.session.write() = None;
		Ok(())
	}
}

/// On-disk layout: one entry for the token, one for the serialized user.
#[derive(Serialize, Deserialize)]
struct SessionFile {
	token: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	user: Option<SessionUser>,
}

/// JSON file session store.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
	path: PathBuf,
}

impl FileSessionStore {
	/// Creates a store backed by `path`. The file is created on first save.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Store at `<config_dir>/jobline/session.json`.
	pub fn default_location() -> Option<Self> {
		Some(Self::new(dirs::config_dir()?.join("jobline").join("session.json")))
	}

	/// Backing file path.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn io_error(&self, action: &str, error: impl std::fmt::Display) -> ClientError {
		ClientError::Session(format!("failed to {action} {}: {error}", self.path.display()))
	}
}

impl SessionStore for FileSessionStore {
	fn load(&self) -> ClientResult<Option<Session>> {
		let text = match fs::read_to_string(&self.path) {
			Ok(text) => text,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(self.io_error("read", e)),
		};
		let file: SessionFile = serde_json::from_str(&text).map_err(|e| self.io_error("parse", e))?;
		Ok(Some(Session {
			token: file.token,
			user: file.user,
		}))
	}

	fn save(&self, session: &Session) -> ClientResult<()> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).map_err(|e| self.io_error("create directory for", e))?;
		}
		let file = SessionFile {
			token: session.token.clone(),
			user: session.user.clone(),
		};
		let text = serde_json::to_string_pretty(&file).map_err(|e| self.io_error("serialize", e))?;
		fs::write(&self.path, text).map_err(|e| self.io_error("write", e))
	}

	fn clear(&self) -> ClientResult<()> {
		match fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
			Err(e) => Err(self.io_error("remove", e)),
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::session::Role;

	fn sample() -> Session {
		Session::new("jwt-abc").with_user(SessionUser {
			name: "Jane".into(),
			email: "jane@example.com".into(),
			role: Role::Admin,
		})
	}

	#[test]
	fn memory_store_round_trip() {
		let store = MemorySessionStore::new();
		assert_eq!(store.load().unwrap(), None);
		store.save(&sample()).unwrap();
		assert_eq!(store.load().unwrap(), Some(sample()));
		store.clear().unwrap();
		assert_eq!(store.load().unwrap(), None);
	}

	#[test]
	fn file_store_persists_token_and_user() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));
		assert_eq!(store.load().unwrap(), None);

		store.save(&sample()).unwrap();
		let reopened = FileSessionStore::new(store.path());
		assert_eq!(reopened.load().unwrap(), Some(sample()));

		let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
		assert_eq!(raw["token"], "jwt-abc");
		assert_eq!(raw["user"]["role"], "admin");

		store.clear().unwrap();
		store.clear().unwrap();
		assert_eq!(store.load().unwrap(), None);
	}

	#[test]
	fn file_store_reports_corrupt_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("session.json");
		fs::write(&path, "not json").unwrap();
		let err = FileSessionStore::new(&path).load().unwrap_err();
		assert!(matches!(err, ClientError::Session(msg) if msg.contains("parse")));
	}
}
