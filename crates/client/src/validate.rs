//! Client-side field validation.
//!
//! These checks mirror what the job board forms enforce before submitting,
//! so obviously bad payloads never reach the server. They are deliberately
//! loose; the backend remains the authority.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"));

// ASCII word characters only; `\w` would also admit non-Latin hosts.
static URL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(https?://)?([A-Za-z0-9_-]+\.)+[A-Za-z0-9_-]{2,}(/.*)?$").expect("url pattern compiles")
});

/// Minimum password length accepted by the sign-up form.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum length of job titles and company names.
pub const MAX_TITLE_LEN: usize = 100;

/// Maximum length of job descriptions.
pub const MAX_DESCRIPTION_LEN: usize = 2000;

pub(crate) const EMAIL_MESSAGE: &str = "Enter a valid email address";
pub(crate) const NUMBER_MESSAGE: &str = "Enter a valid number (0 or more)";
pub(crate) const PORTFOLIO_URL_MESSAGE: &str = "Enter a valid URL (http(s)://...)";
pub(crate) const WEBSITE_MESSAGE: &str = "Enter a valid URL";
pub(crate) const NAME_MESSAGE: &str = "Name is required";
pub(crate) const COMPANY_NAME_MESSAGE: &str = "Company name is required";
pub(crate) const PASSWORD_MESSAGE: &str = "Password must be at least 6 characters";
pub(crate) const REQUIRED_MESSAGE: &str = "This field is required";

/// Returns true if `email` looks like an address.
pub fn is_valid_email(email: &str) -> bool {
	EMAIL.is_match(email)
}

/// Returns true if `url` is empty or looks like a web address.
pub fn is_valid_url(url: &str) -> bool {
	url.is_empty() || URL.is_match(url)
}

/// Returns true if `value` is empty or parses to a number `>= 0`.
pub fn is_non_negative_number(value: &str) -> bool {
	value.is_empty() || value.trim().parse::<f64>().is_ok_and(|n| n >= 0.0)
}

/// Per-field validation messages, keyed by wire field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
	fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
	/// Creates an empty error set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `message` for `field`, keeping the first message per field.
	pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
		self.fields.entry(field).or_insert_with(|| message.into());
	}

	/// Records `message` for `field` when `valid` is false.
	pub fn check(&mut self, field: &'static str, valid: bool, message: &str) {
		if !valid {
			self.add(field, message);
		}
	}

	/// Returns the message for `field`, if it failed.
	pub fn get(&self, field: &str) -> Option<&str> {
		self.fields.get(field).map(String::as_str)
	}

	/// Returns true if no field failed.
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Iterates failed fields in name order.
	pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
		self.fields.iter().map(|(field, message)| (*field, message.as_str()))
	}

	/// Converts into `Ok(())` when empty.
	pub fn into_result(self) -> Result<(), Self> {
		if self.is_empty() { Ok(()) } else { Err(self) }
	}
}

impl fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, (field, message)) in self.iter().enumerate() {
			if i > 0 {
				f.write_str("; ")?;
			}
			write!(f, "{field}: {message}")?;
		}
		Ok(())
	}
}

impl std::error::Error for ValidationErrors {}
