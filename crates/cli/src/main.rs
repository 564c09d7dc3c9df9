//! Jobline command-line host.
//!
//! Loads the client configuration, wires the persisted session into an
//! [`ApiClient`] and runs one command. Reads go through a
//! [`jobline_fetch::Fetcher`] so they share the cancellation and debounce
//! semantics of interactive hosts.

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use jobline_client::{ApiClient, ClientConfig, MemorySessionStore, SessionContext, SessionEvent};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Jobline command line arguments.
#[derive(Parser, Debug)]
#[command(name = "jobline")]
#[command(about = "Browse and manage job postings from the command line")]
struct Args {
	/// Configuration file (defaults to <config_dir>/jobline/config.toml)
	#[arg(short, long, value_name = "PATH", global = true)]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
	/// List job postings
	Jobs {
		/// Quiet period before the request is sent
		#[arg(long, value_name = "MS", default_value_t = 0)]
		debounce_ms: u64,
	},
	/// Show one job posting
	Job {
		/// Job id
		id: String,
	},
	/// Sign in and store the session
	Login {
		email: String,
		password: String,
		/// Use the admin login endpoint
		#[arg(long)]
		admin: bool,
	},
	/// Clear the stored session
	Logout,
	/// List applications (all of them for admins)
	Applications {
		/// Only the signed-in candidate's applications
		#[arg(long)]
		mine: bool,
	},
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let subscriber = tracing_subscriber::fmt()
		.with_max_level(if args.verbose {
			tracing::Level::DEBUG
		} else {
			tracing::Level::INFO
		})
		.with_writer(std::io::stderr)
		.finish();
	tracing::subscriber::set_global_default(subscriber)?;

	let config_path = args.config.or_else(ClientConfig::default_path);
	let config = match &config_path {
		Some(path) => ClientConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
		None => ClientConfig::default(),
	};
	info!(base_url = %config.base_url, "jobline.start");

	let session = match config.session_store() {
		Some(store) => SessionContext::new(store),
		None => {
			warn!("no config directory; session will not persist");
			SessionContext::new(MemorySessionStore::new())
		}
	};
	let watcher = watch_session(&session);
	let api = ApiClient::new(&config, session)?;

	let result = commands::run(args.command, api).await;
	watcher.await?;
	result
}

/// Logs session transitions until every session handle is gone.
fn watch_session(session: &SessionContext) -> JoinHandle<()> {
	let mut events = session.subscribe();
	tokio::spawn(async move {
		loop {
			match events.recv().await {
				Ok(SessionEvent::Unauthorized { redirect }) => {
					warn!(%redirect, "session expired, sign in again");
				}
				Ok(event) => tracing::debug!(?event, "session.event"),
				Err(RecvError::Lagged(skipped)) => tracing::debug!(skipped, "session.events_lagged"),
				Err(RecvError::Closed) => break,
			}
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_global_flags_after_subcommand() {
		let args = Args::try_parse_from(["jobline", "jobs", "--debounce-ms", "250", "-v"]).unwrap();
		assert!(args.verbose);
		assert_eq!(args.command, Command::Jobs { debounce_ms: 250 });
	}

	#[test]
	fn parses_login() {
		let args = Args::try_parse_from([
			"jobline",
			"--config",
			"/tmp/jobline.toml",
			"login",
			"jane@example.com",
			"hunter22",
			"--admin",
		])
		.unwrap();
		assert_eq!(args.config, Some(PathBuf::from("/tmp/jobline.toml")));
		assert_eq!(
			args.command,
			Command::Login {
				email: "jane@example.com".into(),
				password: "hunter22".into(),
				admin: true,
			}
		);
	}

	#[test]
	fn job_requires_id() {
		assert!(Args::try_parse_from(["jobline", "job"]).is_err());
	}
}
