//! Veterinarian onboarding records: personal, company, and clinic info.

use serde::{Deserialize, Serialize};

use super::auth::Role;
use crate::onboarding::OnboardingStep;

/// Country calling codes the phone input offers (TR, US, GB, DE, FR).
pub const SUPPORTED_COUNTRY_CODES: &[u16] = &[90, 1, 44, 49, 33];

/// Default country calling code (Turkey).
pub const DEFAULT_COUNTRY_CODE: u16 = 90;

/// A phone number split into calling code and national digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    pub country_code: u16,
    pub number: String,
}

impl Default for PhoneNumber {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE,
            number: String::new(),
        }
    }
}

impl PhoneNumber {
    pub fn new(country_code: u16, number: impl Into<String>) -> Self {
        Self {
            country_code,
            number: number.into(),
        }
    }

    /// Parse `+<code><digits>`, matching the calling code against the
    /// supported list. Spaces and dashes are ignored.
    pub fn parse(input: &str) -> Option<Self> {
        let compact: String = input
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        let digits = compact.strip_prefix('+')?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        SUPPORTED_COUNTRY_CODES.iter().find_map(|code| {
            let rest = digits.strip_prefix(&code.to_string())?;
            (!rest.is_empty()).then(|| Self::new(*code, rest))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.number.is_empty()
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.number.is_empty() {
            return Ok(());
        }
        write!(f, "+{}{}", self.country_code, self.number)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            other => Err(format!("unknown gender '{other}'")),
        }
    }
}

/// Legal form of the practice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyType {
    #[default]
    Individual,
    #[serde(alias = "CORPORATION")]
    Corporate,
}

impl std::str::FromStr for CompanyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INDIVIDUAL" => Ok(Self::Individual),
            "CORPORATE" | "CORPORATION" => Ok(Self::Corporate),
            other => Err(format!("unknown company type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD` on the way out; the backend may echo a full timestamp.
    pub birth_date: String,
    pub gender: Gender,
    pub tc_identity_no: String,
    pub phone: PhoneNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub company_name: String,
    pub company_type: CompanyType,
    pub tax_office: String,
    pub tax_number: String,
    pub city_id: u32,
    pub district_id: u32,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub clinic_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_photo: Option<String>,
    pub clinic_email: String,
    pub clinic_phone: PhoneNumber,
    pub city_id: u32,
    pub district_id: u32,
    pub address: String,
}

/// Full veterinarian profile from `/users/vet/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VetProfile {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub onboarding_step: OnboardingStep,
    #[serde(default)]
    pub personal_info: Option<PersonalInfo>,
    #[serde(default)]
    pub company_info: Option<CompanyInfo>,
    #[serde(default)]
    pub clinic_info: Option<ClinicInfo>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}
