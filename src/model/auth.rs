//! Account models: users, roles, and the auth request/response bodies.

use serde::{Deserialize, Serialize};

use crate::onboarding::{OnboardingStep, OnboardingSteps};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Pet owner.
    User,
    /// Veterinarian.
    Vet,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Vet => "VET",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "VET" => Ok(Self::Vet),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// The signed-in account as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_code: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(
        default,
        deserialize_with = "crate::onboarding::state::lenient_step",
        skip_serializing_if = "Option::is_none"
    )]
    pub onboarding_step: Option<OnboardingStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<OnboardingSteps>,
}

impl User {
    pub fn is_vet(&self) -> bool {
        self.role == Role::Vet
    }

    /// Local part of the e-mail, used as a display name.
    pub fn display_name(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// Token + user pair returned by login and e-mail verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Body of `/auth/register` responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredEmail {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `/auth/me` responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: User,
}
