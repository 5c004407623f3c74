//! Veterinarian onboarding: step state, the status resolver, and the step
//! form flow.
//!
//! A new VET walks personal info → company info → clinic info → success.
//! The backend is the source of truth for progress; the session mirrors it
//! after every successful save so the guard and menus see the new step
//! without a refetch.

pub mod flow;
pub mod resolver;
pub mod state;

pub use flow::OnboardingFlow;
pub use resolver::{Resolution, landing_route, resolve, route_for_status};
pub use state::{OnboardingStatus, OnboardingStep, OnboardingSteps};

pub const ONBOARDING_PATH: &str = "/onboarding";
pub const PERSONAL_INFO_PATH: &str = "/onboarding/personal-info";
pub const COMPANY_INFO_PATH: &str = "/onboarding/company-info";
pub const CLINIC_INFO_PATH: &str = "/onboarding/clinic-info";
pub const SUCCESS_PATH: &str = "/onboarding/success";
