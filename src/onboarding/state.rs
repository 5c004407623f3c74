//! Veterinarian registration steps and the per-step completion flags the
//! backend reports.

use serde::{Deserialize, Deserializer, Serialize};

/// Registration steps, in the order a veterinarian completes them.
///
/// Variant order is progression order, so `Ord` compares progress.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnboardingStep {
    #[default]
    EmailVerification,
    PersonalInfo,
    CompanyInfo,
    ClinicInfo,
    Completed,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 5] = [
        Self::EmailVerification,
        Self::PersonalInfo,
        Self::CompanyInfo,
        Self::ClinicInfo,
        Self::Completed,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// The step after this one; `None` once completed.
    pub fn next(&self) -> Option<OnboardingStep> {
        Self::ALL.get(*self as usize + 1).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailVerification => "EMAIL_VERIFICATION",
            Self::PersonalInfo => "PERSONAL_INFO",
            Self::CompanyInfo => "COMPANY_INFO",
            Self::ClinicInfo => "CLINIC_INFO",
            Self::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-step completion flags mirrored from the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingSteps {
    #[serde(rename = "EMAIL_VERIFICATION", default)]
    pub email_verification: bool,
    #[serde(rename = "PERSONAL_INFO", default)]
    pub personal_info: bool,
    #[serde(rename = "COMPANY_INFO", default)]
    pub company_info: bool,
    #[serde(rename = "CLINIC_INFO", default)]
    pub clinic_info: bool,
}

impl OnboardingSteps {
    /// Flags with every step up to and including `step` marked done.
    pub fn through(step: OnboardingStep) -> Self {
        Self {
            email_verification: true,
            personal_info: step >= OnboardingStep::PersonalInfo,
            company_info: step >= OnboardingStep::CompanyInfo,
            clinic_info: step >= OnboardingStep::ClinicInfo,
        }
    }
}

/// Onboarding progress as reported by `/users/vet/onboarding-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    /// `None` when the backend reports no step or one this client does not
    /// know.
    #[serde(default, deserialize_with = "lenient_step")]
    pub current_step: Option<OnboardingStep>,
    pub is_complete: bool,
    #[serde(default)]
    pub steps: OnboardingSteps,
}

/// Reads a step name, mapping missing, null, or unknown values to `None`.
pub(crate) fn lenient_step<'de, D>(deserializer: D) -> Result<Option<OnboardingStep>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|name| OnboardingStep::ALL.into_iter().find(|step| step.as_str() == name)))
}
