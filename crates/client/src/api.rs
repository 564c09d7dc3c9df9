//! Job board endpoints.
//!
//! Each method maps to one backend route. Payloads with form rules are
//! validated locally first and never reach the network when invalid.

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::client::{ApiClient, decode};
use crate::error::{ClientError, ClientResult};
use crate::model::{
	Application, ApplicationForm, Company, CompanyProfile, Credentials, Job, JobDraft, MessageResponse, NewUser,
	TokenResponse, UserProfile,
};
use crate::transport::ApiRequest;

fn json_request(method: Method, path: impl Into<String>, body: &impl Serialize) -> ClientResult<ApiRequest> {
	let body = serde_json::to_value(body).map_err(|e| ClientError::Encode(e.to_string()))?;
	Ok(ApiRequest::new(method, path).json(body))
}

impl ApiClient {
	async fn get<T: DeserializeOwned>(&self, path: String) -> ClientResult<T> {
		self.fetch(ApiRequest::get(path)).await
	}

	/// Lists all job postings.
	pub async fn jobs(&self) -> ClientResult<Vec<Job>> {
		self.get("/jobs".into()).await
	}

	/// Lists job postings, giving up once `cancel` fires.
	pub async fn jobs_cancellable(&self, cancel: &CancellationToken) -> ClientResult<Vec<Job>> {
		let response = self.send_cancellable(ApiRequest::get("/jobs"), cancel).await?;
		decode(&response.body)
	}

	/// Fetches one job posting.
	pub async fn job(&self, id: &str) -> ClientResult<Job> {
		self.get(format!("/jobs/{id}")).await
	}

	/// Fetches one job posting, giving up once `cancel` fires.
	pub async fn job_cancellable(&self, id: &str, cancel: &CancellationToken) -> ClientResult<Job> {
		let response = self.send_cancellable(ApiRequest::get(format!("/jobs/{id}")), cancel).await?;
		decode(&response.body)
	}

	/// Submits an application for `job_id`. Resume files are not uploaded.
	pub async fn apply(&self, job_id: &str, form: ApplicationForm) -> ClientResult<Application> {
		form.validate()?;
		let request = ApiRequest::new(Method::POST, format!("/jobs/{job_id}/apply")).multipart(form.into_fields());
		self.fetch(request).await
	}

	/// Registers an admin account.
	pub async fn admin_register(&self, credentials: &Credentials) -> ClientResult<MessageResponse> {
		self.fetch(json_request(Method::POST, "/admin/register", credentials)?).await
	}

	/// Exchanges admin credentials for a token. Does not touch the session.
	pub async fn admin_login(&self, credentials: &Credentials) -> ClientResult<TokenResponse> {
		self.fetch(json_request(Method::POST, "/admin/login", credentials)?).await
	}

	/// Publishes a job posting.
	pub async fn create_job(&self, draft: &JobDraft) -> ClientResult<Job> {
		draft.validate()?;
		self.fetch(json_request(Method::POST, "/admin/jobs", draft)?).await
	}

	/// Lists every application across postings.
	pub async fn applications(&self) -> ClientResult<Vec<Application>> {
		self.get("/admin/applications".into()).await
	}

	/// Registers a candidate account.
	pub async fn register(&self, user: &NewUser) -> ClientResult<MessageResponse> {
		user.validate()?;
		self.fetch(json_request(Method::POST, "/auth/register", user)?).await
	}

	/// Exchanges candidate credentials for a token. Does not touch the session.
	pub async fn login(&self, credentials: &Credentials) -> ClientResult<TokenResponse> {
		self.fetch(json_request(Method::POST, "/auth/login", credentials)?).await
	}

	/// Lists the signed-in candidate's applications.
	pub async fn user_applications(&self) -> ClientResult<Vec<Application>> {
		self.get("/user/applications".into()).await
	}

	/// Fetches the signed-in user's profile.
	pub async fn profile(&self) -> ClientResult<UserProfile> {
		self.get("/user/profile".into()).await
	}

	/// Replaces the signed-in user's profile.
	pub async fn update_profile(&self, profile: &UserProfile) -> ClientResult<UserProfile> {
		self.fetch(json_request(Method::PUT, "/user/profile", profile)?).await
	}

	/// Fetches a company profile.
	pub async fn company(&self, id: &str) -> ClientResult<Company> {
		self.get(format!("/company/{id}")).await
	}

	/// Creates a company profile.
	pub async fn create_company(&self, profile: &CompanyProfile) -> ClientResult<Company> {
		profile.validate()?;
		self.fetch(json_request(Method::POST, "/company", profile)?).await
	}

	/// Updates a company profile.
	pub async fn update_company(&self, id: &str, profile: &CompanyProfile) -> ClientResult<Company> {
		profile.validate()?;
		self.fetch(json_request(Method::PUT, format!("/company/{id}"), profile)?).await
	}
}
