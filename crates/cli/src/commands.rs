use std::fmt::Write as _;

use anyhow::bail;
use jobline_client::model::{Application, Credentials, Job};
use jobline_client::session::{Role, SessionUser};
use jobline_client::{ApiClient, ClientError, Session};
use jobline_fetch::{FetchOptions, Fetcher, InvocationToken, Outcome};
use tracing::{info, warn};

use crate::Command;

/// Runs `command`. Consumes the client so the session closes afterwards.
pub(crate) async fn run(command: Command, api: ApiClient) -> anyhow::Result<()> {
	match command {
		Command::Jobs { debounce_ms } => {
			let fetcher = Fetcher::new(
				move |(), token: InvocationToken| {
					let api = api.clone();
					async move { api.jobs_cancellable(token.cancellation()).await }
				},
				FetchOptions::new().debounce_ms(debounce_ms),
			);
			let jobs = settle(&fetcher, ()).await?;
			print!("{}", format_jobs(&jobs));
		}
		Command::Job { id } => {
			let fetcher = Fetcher::new(
				move |id: String, token: InvocationToken| {
					let api = api.clone();
					async move { api.job_cancellable(&id, token.cancellation()).await }
				},
				FetchOptions::new(),
			);
			let job = settle(&fetcher, id).await?;
			print!("{}", format_job(&job));
		}
		Command::Login { email, password, admin } => login(&api, email, password, admin).await?,
		Command::Logout => {
			api.session().sign_out()?;
			info!("signed out");
		}
		Command::Applications { mine } => {
			if !api.session().is_signed_in() {
				bail!("not signed in; run `jobline login` first");
			}
			let fetcher = Fetcher::new(
				move |mine: bool, _token: InvocationToken| {
					let api = api.clone();
					async move {
						if mine {
							api.user_applications().await
						} else {
							api.applications().await
						}
					}
				},
				FetchOptions::new(),
			);
			let applications = settle(&fetcher, mine).await?;
			print!("{}", format_applications(&applications));
		}
	}
	Ok(())
}

/// Executes one invocation and returns the settled data or error.
async fn settle<A, T>(fetcher: &Fetcher<A, T, ClientError>, args: A) -> anyhow::Result<T>
where
	A: Send + 'static,
	T: Clone + Send + Sync + 'static,
{
	let outcome = fetcher.execute(args).await;
	let state = fetcher.state();
	match (outcome, state.data, state.error) {
		(Outcome::Applied, Some(data), _) => Ok(data),
		(_, _, Some(error)) => Err(error.into()),
		(outcome, ..) => bail!("request did not complete ({outcome:?})"),
	}
}

async fn login(api: &ApiClient, email: String, password: String, admin: bool) -> anyhow::Result<()> {
	let credentials = Credentials::new(email.clone(), password);
	let (token, role) = if admin {
		(api.admin_login(&credentials).await?, Role::Admin)
	} else {
		(api.login(&credentials).await?, Role::User)
	};

	let session = api.session();
	session.sign_in(Session::new(token.access_token.clone()))?;
	let name = match role {
		Role::Admin => email.clone(),
		Role::User => match api.profile().await {
			Ok(profile) => profile.name,
			Err(error) => {
				warn!(%error, "could not load profile");
				email.clone()
			}
		},
	};
	// A 401 on the profile request already expired the fresh session.
	if !session.is_signed_in() {
		bail!("server rejected the new session");
	}
	session.sign_in(Session::new(token.access_token).with_user(SessionUser { name, email, role }))?;
	info!(?role, "signed in");
	Ok(())
}

fn format_jobs(jobs: &[Job]) -> String {
	let mut out = String::new();
	for job in jobs {
		let status = if job.is_open() { "open" } else { "closed" };
		let _ = writeln!(
			out,
			"{}\t{}\t{}\t{}\t{}",
			job.id, job.title, job.company_name, job.location, status
		);
	}
	out
}

fn format_job(job: &Job) -> String {
	let status = if job.is_open() { "open" } else { "closed" };
	format!(
		"{} at {} ({status})\nid: {}\nlocation: {}\nsalary: {}\n\n{}\n",
		job.title, job.company_name, job.id, job.location, job.salary, job.description
	)
}

fn format_applications(applications: &[Application]) -> String {
	let mut out = String::new();
	for app in applications {
		let job = if app.job_title.is_empty() { &app.job_id } else { &app.job_title };
		let _ = writeln!(out, "{}\t{}\t{} <{}>\t{}", app.id, job, app.name, app.email, app.status);
	}
	out
}

#[cfg(test)]
mod tests {
	use jobline_client::model::JobStatus;

	use super::*;

	fn job(id: &str, status: JobStatus) -> Job {
		Job {
			id: id.into(),
			title: "Rust Engineer".into(),
			company_name: "Acme".into(),
			description: "Build things".into(),
			location: "Remote".into(),
			salary: 100,
			status,
		}
	}

	#[test]
	fn jobs_render_one_line_each() {
		let out = format_jobs(&[job("1", JobStatus::Open), job("2", JobStatus::Closed)]);
		assert_eq!(
			out,
			"1\tRust Engineer\tAcme\tRemote\topen\n2\tRust Engineer\tAcme\tRemote\tclosed\n"
		);
	}

	#[test]
	fn job_detail_includes_description() {
		let out = format_job(&job("1", JobStatus::Open));
		assert!(out.starts_with("Rust Engineer at Acme (open)\n"));
		assert!(out.ends_with("\nBuild things\n"));
	}

	#[tokio::test]
	async fn settle_reports_failure() {
		let fetcher: Fetcher<(), Vec<Job>, ClientError> =
			Fetcher::new(|(), _token| async { Err(ClientError::Unauthorized) }, FetchOptions::new());
		let err = settle(&fetcher, ()).await.unwrap_err();
		assert_eq!(err.to_string(), ClientError::Unauthorized.to_string());
	}
}
