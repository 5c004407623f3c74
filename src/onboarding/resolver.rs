//! Where a user should go next: the `/onboarding` entry page and the
//! landing page after sign-in.

use tracing::{debug, warn};

use super::state::{OnboardingStatus, OnboardingStep};
use super::{CLINIC_INFO_PATH, COMPANY_INFO_PATH, ONBOARDING_PATH, PERSONAL_INFO_PATH};
use crate::api::ApiClient;
use crate::guard::DASHBOARD_PATH;
use crate::model::User;

/// Outcome of resolving the onboarding entry page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing to decide yet: no session, or the status could not be fetched.
    Loading,
    Redirect(&'static str),
}

/// Page for a server-reported onboarding status.
///
/// Only `currentStep` decides the form; the per-step flags are ignored, so a
/// missing or unknown step starts at personal info.
pub fn route_for_status(status: &OnboardingStatus) -> &'static str {
    if status.is_complete {
        return DASHBOARD_PATH;
    }
    match status.current_step {
        Some(OnboardingStep::CompanyInfo) => COMPANY_INFO_PATH,
        Some(OnboardingStep::ClinicInfo) => CLINIC_INFO_PATH,
        _ => PERSONAL_INFO_PATH,
    }
}

/// Page to open right after login or e-mail verification.
pub fn landing_route(user: &User) -> &'static str {
    if user.is_vet() && !user.onboarding_step.is_some_and(|step| step.is_terminal()) {
        ONBOARDING_PATH
    } else {
        DASHBOARD_PATH
    }
}

/// Resolve the onboarding entry page for the signed-in user.
///
/// Non-VET users go straight to the dashboard without a status fetch. A
/// failed fetch is logged and leaves the page loading.
pub async fn resolve(api: &ApiClient) -> Resolution {
    let Some(user) = api.session().current_user().await else {
        return Resolution::Loading;
    };
    if !user.is_vet() {
        return Resolution::Redirect(DASHBOARD_PATH);
    }

    match api.vet().onboarding_status().await {
        Ok(status) => {
            let target = route_for_status(&status);
            debug!(step = ?status.current_step, target, "Resolved onboarding status");
            Resolution::Redirect(target)
        }
        Err(e) => {
            warn!(error = %e, "Failed to fetch onboarding status");
            Resolution::Loading
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use crate::onboarding::OnboardingSteps;

    fn status(step: Option<OnboardingStep>, complete: bool) -> OnboardingStatus {
        OnboardingStatus {
            current_step: step,
            is_complete: complete,
            steps: OnboardingSteps::default(),
        }
    }

    fn user(role: Role, step: Option<OnboardingStep>) -> User {
        User {
            id: "u-1".into(),
            email: "someone@example.com".into(),
            user_code: None,
            role,
            is_verified: true,
            onboarding_step: step,
            steps: None,
        }
    }

    #[test]
    fn status_routes() {
        use OnboardingStep::*;
        assert_eq!(route_for_status(&status(Some(CompanyInfo), false)), COMPANY_INFO_PATH);
        assert_eq!(route_for_status(&status(Some(ClinicInfo), false)), CLINIC_INFO_PATH);
        assert_eq!(route_for_status(&status(Some(PersonalInfo), false)), PERSONAL_INFO_PATH);
        assert_eq!(route_for_status(&status(Some(EmailVerification), false)), PERSONAL_INFO_PATH);
        assert_eq!(route_for_status(&status(None, false)), PERSONAL_INFO_PATH);
        assert_eq!(route_for_status(&status(Some(ClinicInfo), true)), DASHBOARD_PATH);

        let from_flags = OnboardingStatus {
            current_step: None,
            is_complete: false,
            steps: OnboardingSteps::through(CompanyInfo),
        };
        assert_eq!(route_for_status(&from_flags), PERSONAL_INFO_PATH);

        let unknown: OnboardingStatus =
            serde_json::from_str(r#"{"currentStep": "DOCUMENTS", "isComplete": false}"#).unwrap();
        assert_eq!(route_for_status(&unknown), PERSONAL_INFO_PATH);
    }

    #[test]
    fn landing_after_sign_in() {
        use OnboardingStep::*;
        assert_eq!(landing_route(&user(Role::Vet, Some(PersonalInfo))), ONBOARDING_PATH);
        assert_eq!(landing_route(&user(Role::Vet, None)), ONBOARDING_PATH);
        assert_eq!(landing_route(&user(Role::Vet, Some(Completed))), DASHBOARD_PATH);
        assert_eq!(landing_route(&user(Role::User, None)), DASHBOARD_PATH);
    }
}
