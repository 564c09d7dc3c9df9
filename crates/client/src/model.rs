//! Wire types exchanged with the job board API.
//!
//! Field names follow the backend's camelCase JSON. Server-assigned ids come
//! back as `_id`; `id` is accepted too.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::validate::{
	self, COMPANY_NAME_MESSAGE, EMAIL_MESSAGE, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN, MIN_PASSWORD_LEN, NAME_MESSAGE,
	NUMBER_MESSAGE, PASSWORD_MESSAGE, PORTFOLIO_URL_MESSAGE, REQUIRED_MESSAGE, ValidationErrors, WEBSITE_MESSAGE,
};

/// Whether a posting accepts applications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
	/// Accepting applications.
	#[default]
	Open,
	/// No longer accepting applications.
	Closed,
}

/// Job posting payload as submitted by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
	pub title: String,
	pub company_name: String,
	pub description: String,
	pub location: String,
	pub salary: i64,
	#[serde(default)]
	pub status: JobStatus,
}

impl JobDraft {
	/// Checks length limits and salary sign.
	pub fn validate(&self) -> Result<(), ValidationErrors> {
		let mut errors = ValidationErrors::new();
		errors.check("title", !self.title.trim().is_empty(), REQUIRED_MESSAGE);
		errors.check("title", self.title.chars().count() <= MAX_TITLE_LEN, "Title is too long");
		errors.check("companyName", !self.company_name.trim().is_empty(), REQUIRED_MESSAGE);
		errors.check("companyName", self.company_name.chars().count() <= MAX_TITLE_LEN, "Company name is too long");
		errors.check(
			"description",
			self.description.chars().count() <= MAX_DESCRIPTION_LEN,
			"Description is too long",
		);
		errors.check("location", !self.location.trim().is_empty(), REQUIRED_MESSAGE);
		errors.check("salary", self.salary >= 0, NUMBER_MESSAGE);
		errors.into_result()
	}
}

/// Job posting as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
	#[serde(rename = "_id", alias = "id")]
	pub id: String,
	pub title: String,
	pub company_name: String,
	pub description: String,
	pub location: String,
	pub salary: i64,
	#[serde(default)]
	pub status: JobStatus,
}

impl Job {
	/// Returns true if the posting accepts applications.
	pub fn is_open(&self) -> bool {
		self.status == JobStatus::Open
	}
}

fn default_application_status() -> String {
	"Pending".to_string()
}

/// Application as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
	#[serde(rename = "_id", alias = "id")]
	pub id: String,
	pub job_id: String,
	#[serde(default)]
	pub job_title: String,
	#[serde(default)]
	pub company_name: String,
	pub name: String,
	pub email: String,
	#[serde(default)]
	pub experience: Option<String>,
	#[serde(rename = "currentCTC", default)]
	pub current_ctc: Option<String>,
	#[serde(rename = "expectedCTC", default)]
	pub expected_ctc: Option<String>,
	#[serde(default)]
	pub notice_period: Option<String>,
	#[serde(rename = "portfolioURL", default)]
	pub portfolio_url: Option<String>,
	#[serde(default = "default_application_status")]
	pub status: String,
	#[serde(default)]
	pub applied_on: Option<String>,
	#[serde(rename = "resume_path", default)]
	pub resume_path: Option<String>,
}

/// Candidate-entered application fields, sent as multipart text.
///
/// Numeric fields stay strings because that is how the form collects them;
/// [`ApplicationForm::validate`] checks they parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationForm {
	pub name: String,
	pub email: String,
	#[serde(default)]
	pub experience: String,
	#[serde(rename = "currentCTC", default)]
	pub current_ctc: String,
	#[serde(rename = "expectedCTC", default)]
	pub expected_ctc: String,
	#[serde(default)]
	pub notice_period: String,
	#[serde(rename = "portfolioURL", default)]
	pub portfolio_url: String,
}

impl ApplicationForm {
	/// Applies the application form's field rules.
	///
	/// Name, email and experience are required; the other numeric fields and
	/// the portfolio URL may be left empty.
	pub fn validate(&self) -> Result<(), ValidationErrors> {
		let mut errors = ValidationErrors::new();
		errors.check("name", !self.name.trim().is_empty(), NAME_MESSAGE);
		errors.check("email", validate::is_valid_email(&self.email), EMAIL_MESSAGE);
		errors.check(
			"experience",
			!self.experience.trim().is_empty() && validate::is_non_negative_number(&self.experience),
			NUMBER_MESSAGE,
		);
		errors.check("currentCTC", validate::is_non_negative_number(&self.current_ctc), NUMBER_MESSAGE);
		errors.check("expectedCTC", validate::is_non_negative_number(&self.expected_ctc), NUMBER_MESSAGE);
		errors.check("noticePeriod", validate::is_non_negative_number(&self.notice_period), NUMBER_MESSAGE);
		errors.check("portfolioURL", validate::is_valid_url(&self.portfolio_url), PORTFOLIO_URL_MESSAGE);
		errors.into_result()
	}

	/// Multipart text fields in submission order.
	pub(crate) fn into_fields(self) -> Vec<(String, String)> {
		vec![
			("name".into(), self.name),
			("email".into(), self.email),
			("experience".into(), self.experience),
			("currentCTC".into(), self.current_ctc),
			("expectedCTC".into(), self.expected_ctc),
			("noticePeriod".into(), self.notice_period),
			("portfolioURL".into(), self.portfolio_url),
		]
	}
}

/// Email and password pair used by both login endpoints.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	pub email: String,
	pub password: String,
}

impl Credentials {
	/// Creates a credential pair.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self {
			email: email.into(),
			password: password.into(),
		}
	}
}

impl std::fmt::Debug for Credentials {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Credentials")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Sign-up payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
	pub name: String,
	pub email: String,
	pub password: String,
}

impl NewUser {
	/// Applies the sign-up form's field rules.
	pub fn validate(&self) -> Result<(), ValidationErrors> {
		let mut errors = ValidationErrors::new();
		errors.check("name", !self.name.trim().is_empty(), NAME_MESSAGE);
		errors.check("email", validate::is_valid_email(&self.email), EMAIL_MESSAGE);
		errors.check("password", self.password.chars().count() >= MIN_PASSWORD_LEN, PASSWORD_MESSAGE);
		errors.into_result()
	}
}

impl std::fmt::Debug for NewUser {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NewUser")
			.field("name", &self.name)
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Access token issued by a login endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
	pub access_token: String,
	#[serde(default = "default_token_type")]
	pub token_type: String,
}

fn default_token_type() -> String {
	"bearer".to_string()
}

impl std::fmt::Debug for TokenResponse {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TokenResponse")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.finish()
	}
}

/// Plain acknowledgement body, e.g. from registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
	pub message: String,
}

/// Signed-in user's profile.
///
/// Only name and email are fixed; anything else the backend sends is kept
/// in `extra` and written back unchanged on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
	pub name: String,
	pub email: String,
	#[serde(flatten)]
	pub extra: BTreeMap<String, serde_json::Value>,
}

/// Company profile payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
	pub company_name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub website: String,
	#[serde(default)]
	pub location: String,
	#[serde(default)]
	pub industry: String,
	#[serde(default)]
	pub size: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub logo_url: Option<String>,
}

impl CompanyProfile {
	/// Applies the company form's field rules.
	pub fn validate(&self) -> Result<(), ValidationErrors> {
		let mut errors = ValidationErrors::new();
		errors.check("companyName", !self.company_name.trim().is_empty(), COMPANY_NAME_MESSAGE);
		errors.check("website", validate::is_valid_url(&self.website), WEBSITE_MESSAGE);
		errors.into_result()
	}
}

/// Company profile as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
	#[serde(rename = "_id", alias = "id")]
	pub id: String,
	#[serde(flatten)]
	pub profile: CompanyProfile,
}
