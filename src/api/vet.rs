//! `/users/vet` endpoints: onboarding status, profile, and the three
//! onboarding records.

use std::time::Duration;

use super::cache::keys;
use super::client::ApiClient;
use crate::error::ApiError;
use crate::model::{ClinicInfo, CompanyInfo, PersonalInfo, VetProfile};
use crate::onboarding::OnboardingStatus;

pub struct VetApi<'a> {
    client: &'a ApiClient,
}

impl<'a> VetApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn onboarding_status(&self) -> Result<OnboardingStatus, ApiError> {
        self.client
            .cache()
            .fetch(keys::onboarding_status(), Duration::ZERO, || {
                self.client.get("/users/vet/onboarding-status")
            })
            .await
    }

    pub async fn profile(&self) -> Result<VetProfile, ApiError> {
        self.client.get("/users/vet/profile").await
    }

    pub async fn personal_info(&self) -> Result<Option<PersonalInfo>, ApiError> {
        self.fetch_record("personal").await
    }

    pub async fn company_info(&self) -> Result<Option<CompanyInfo>, ApiError> {
        self.fetch_record("company").await
    }

    pub async fn clinic_info(&self) -> Result<Option<ClinicInfo>, ApiError> {
        self.fetch_record("clinic").await
    }

    pub async fn save_personal_info(&self, info: &PersonalInfo) -> Result<(), ApiError> {
        self.save_record("personal-info", "personal", info).await
    }

    pub async fn save_company_info(&self, info: &CompanyInfo) -> Result<(), ApiError> {
        self.save_record("company-info", "company", info).await
    }

    pub async fn save_clinic_info(&self, info: &ClinicInfo) -> Result<(), ApiError> {
        self.save_record("clinic-info", "clinic", info).await
    }

    async fn fetch_record<T>(&self, resource: &str) -> Result<Option<T>, ApiError>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
    {
        let path = format!("/users/vet/{resource}");
        self.client
            .cache()
            .fetch(keys::vet(resource), Duration::ZERO, || self.client.get(&path))
            .await
    }

    /// POST the record, then drop the cached copy and the onboarding status.
    async fn save_record<B>(&self, endpoint: &str, resource: &str, body: &B) -> Result<(), ApiError>
    where
        B: serde::Serialize + Sync,
    {
        let _: Option<serde_json::Value> = self
            .client
            .post(&format!("/users/vet/{endpoint}"), body)
            .await?;
        let cache = self.client.cache();
        cache.invalidate(&keys::vet(resource)).await;
        cache.invalidate(&keys::onboarding_status()).await;
        Ok(())
    }
}
