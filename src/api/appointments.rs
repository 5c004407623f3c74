//! `/appointments` endpoints. Every mutation invalidates all appointment
//! queries.

use std::time::Duration;

use uuid::Uuid;

use super::cache::keys;
use super::client::ApiClient;
use crate::error::ApiError;
use crate::model::{Appointment, CreateAppointmentRequest, UpdateAppointmentRequest};

pub struct AppointmentsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AppointmentsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Appointment>, ApiError> {
        self.client
            .cache()
            .fetch(keys::appointments(), Duration::ZERO, || {
                self.client.get("/appointments")
            })
            .await
    }

    pub async fn by_pet(&self, pet_id: Uuid) -> Result<Vec<Appointment>, ApiError> {
        let path = format!("/appointments/pet/{pet_id}");
        self.client
            .cache()
            .fetch(
                keys::appointments_for_pet(&pet_id.to_string()),
                Duration::ZERO,
                || self.client.get(&path),
            )
            .await
    }

    pub async fn create(&self, request: &CreateAppointmentRequest) -> Result<Appointment, ApiError> {
        let created = self.client.post("/appointments", request).await?;
        self.invalidate().await;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateAppointmentRequest,
    ) -> Result<Appointment, ApiError> {
        let updated = self.client.put(&format!("/appointments/{id}"), request).await?;
        self.invalidate().await;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let _: Option<serde_json::Value> =
            self.client.delete(&format!("/appointments/{id}")).await?;
        self.invalidate().await;
        Ok(())
    }

    async fn invalidate(&self) {
        self.client.cache().invalidate(&keys::appointments()).await;
    }
}
