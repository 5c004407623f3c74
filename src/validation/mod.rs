//! Client-side form schemas.
//!
//! Every form is checked locally before anything is sent; a form that fails
//! validation never reaches the network. Errors are reported per field, first
//! failing rule wins, keyed by the camelCase field name the backend uses.

pub mod auth;
pub mod onboarding;
pub mod records;

pub use auth::{LoginForm, RegisterForm, ResendOtpForm, VerifyEmailForm};
pub use onboarding::{ClinicInfoForm, CompanyInfoForm, PersonalInfoForm};
pub use records::{AppointmentForm, AppointmentUpdateForm, MicrochipForm, PetForm, PetUpdateForm};

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::model::date_part;
use crate::model::vet::{PhoneNumber, DEFAULT_COUNTRY_CODE, SUPPORTED_COUNTRY_CODES};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static PERSON_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZçğıöşüÇĞIİÖŞÜ\s]+$").unwrap());

/// Field-level validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.summary())]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field`, keeping the first one already recorded.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    fn summary(&self) -> String {
        self.iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A form that can be checked before submission.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

// ── Rules ───────────────────────────────────────────────────────────────

/// Required text with a length range, counted in characters.
pub(crate) fn text(errors: &mut FieldErrors, field: &str, label: &str, value: &str, min: usize, max: usize) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.add(field, format!("{label} is required"));
    } else if len < min {
        errors.add(field, format!("{label} must be at least {min} characters"));
    } else if len > max {
        errors.add(field, format!("{label} must be at most {max} characters"));
    }
}

/// Required string of exactly `len` ASCII digits.
pub(crate) fn exact_digits(errors: &mut FieldErrors, field: &str, label: &str, value: &str, len: usize) {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, format!("{label} is required"));
    } else if value.chars().count() != len {
        errors.add(field, format!("{label} must be {len} digits"));
    } else if !is_digits(value) {
        errors.add(field, format!("{label} must contain digits only"));
    }
}

pub(crate) fn email(errors: &mut FieldErrors, field: &str, label: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, format!("{label} is required"));
    } else if !is_email(value) {
        errors.add(field, "Enter a valid e-mail address");
    }
}

pub(crate) fn person_name(errors: &mut FieldErrors, field: &str, label: &str, value: &str) {
    text(errors, field, label, value, 2, 50);
    if !value.trim().is_empty() && !PERSON_NAME.is_match(value) {
        errors.add(field, format!("{label} must contain letters only"));
    }
}

/// Phone numbers: supported calling code, national digits only, ten of them
/// for Turkish numbers.
pub(crate) fn phone(errors: &mut FieldErrors, field: &str, label: &str, value: &PhoneNumber) {
    let number = value.number.trim();
    if number.is_empty() {
        errors.add(field, format!("{label} is required"));
    } else if !SUPPORTED_COUNTRY_CODES.contains(&value.country_code) {
        errors.add(field, format!("Country code +{} is not supported", value.country_code));
    } else if !is_digits(number) {
        errors.add(field, format!("{label} must contain digits only"));
    } else if value.country_code == DEFAULT_COUNTRY_CODE && number.len() != 10 {
        errors.add(field, format!("{label} must be in the format +90XXXXXXXXXX"));
    } else if !(4..=14).contains(&number.len()) {
        errors.add(field, format!("{label} must be between 4 and 14 digits"));
    }
}

/// Select inputs for city/district use 0 for "nothing chosen".
pub(crate) fn selection(errors: &mut FieldErrors, field: &str, label: &str, value: u32) {
    if value < 1 {
        errors.add(field, format!("Select a valid {label}"));
    }
}

/// Required date (`YYYY-MM-DD` or a full timestamp); returns it when valid.
pub(crate) fn date(errors: &mut FieldErrors, field: &str, label: &str, value: &str) -> Option<NaiveDate> {
    if value.trim().is_empty() {
        errors.add(field, format!("{label} is required"));
        return None;
    }
    let parsed = parse_date(value);
    if parsed.is_none() {
        errors.add(field, format!("{label} must be a valid date"));
    }
    parsed
}

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

pub fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Parse a date input, tolerating a trailing time component.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_part(value.trim()), "%Y-%m-%d").ok()
}
