//! OnboardingFlow: prefill, validate, save, and advance for each step form.

use tracing::{info, warn};

use super::state::{OnboardingStep, OnboardingSteps};
use super::{CLINIC_INFO_PATH, COMPANY_INFO_PATH, SUCCESS_PATH};
use crate::api::ApiClient;
use crate::error::{SessionError, SubmitError};
use crate::guard::DASHBOARD_PATH;
use crate::validation::{ClinicInfoForm, CompanyInfoForm, PersonalInfoForm};

/// Drives the three onboarding step forms against the backend and keeps the
/// session's step state in line with what was saved.
pub struct OnboardingFlow<'a> {
    api: &'a ApiClient,
}

impl<'a> OnboardingFlow<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    // ── Prefill ─────────────────────────────────────────────────────────

    /// Saved personal info as a form; empty when none exists or the fetch
    /// fails.
    pub async fn load_personal_info(&self) -> PersonalInfoForm {
        match self.api.vet().personal_info().await {
            Ok(Some(info)) => PersonalInfoForm::from(&info),
            Ok(None) => PersonalInfoForm::default(),
            Err(e) => {
                warn!(error = %e, "Could not load personal info");
                PersonalInfoForm::default()
            }
        }
    }

    pub async fn load_company_info(&self) -> CompanyInfoForm {
        match self.api.vet().company_info().await {
            Ok(Some(info)) => CompanyInfoForm::from(&info),
            Ok(None) => CompanyInfoForm::default(),
            Err(e) => {
                warn!(error = %e, "Could not load company info");
                CompanyInfoForm::default()
            }
        }
    }

    pub async fn load_clinic_info(&self) -> ClinicInfoForm {
        match self.api.vet().clinic_info().await {
            Ok(Some(info)) => ClinicInfoForm::from(&info),
            Ok(None) => ClinicInfoForm::default(),
            Err(e) => {
                warn!(error = %e, "Could not load clinic info");
                ClinicInfoForm::default()
            }
        }
    }

    // ── Submit ──────────────────────────────────────────────────────────

    /// Validate and save personal info. Returns the next page.
    pub async fn submit_personal_info(&self, form: &PersonalInfoForm) -> Result<&'static str, SubmitError> {
        let request = form.to_request()?;
        self.api.vet().save_personal_info(&request).await?;
        self.advance(OnboardingStep::PersonalInfo).await?;
        Ok(COMPANY_INFO_PATH)
    }

    pub async fn submit_company_info(&self, form: &CompanyInfoForm) -> Result<&'static str, SubmitError> {
        let request = form.to_request()?;
        self.api.vet().save_company_info(&request).await?;
        self.advance(OnboardingStep::CompanyInfo).await?;
        Ok(CLINIC_INFO_PATH)
    }

    /// Last step: marks the user completed and sends them to the success page.
    pub async fn submit_clinic_info(&self, form: &ClinicInfoForm) -> Result<&'static str, SubmitError> {
        let request = form.to_request()?;
        self.api.vet().save_clinic_info(&request).await?;
        self.advance(OnboardingStep::ClinicInfo).await?;
        Ok(SUCCESS_PATH)
    }

    /// Success page: mark the user completed and leave for the dashboard.
    pub async fn finish(&self) -> Result<&'static str, SessionError> {
        self.api
            .session()
            .update_onboarding_step(OnboardingStep::Completed)
            .await?;
        Ok(DASHBOARD_PATH)
    }

    /// Mark every step through `saved` done and move the current step on.
    async fn advance(&self, saved: OnboardingStep) -> Result<(), SessionError> {
        let next = saved.next().unwrap_or(OnboardingStep::Completed);
        info!(saved = %saved, next = %next, "Onboarding step saved");
        self.api
            .session()
            .record_onboarding_progress(OnboardingSteps::through(saved), next)
            .await
    }
}
