//! `/pets` endpoints and their cache updates.

use uuid::Uuid;

use super::cache::{PETS_STALE_TIME, keys};
use super::client::ApiClient;
use crate::error::ApiError;
use crate::model::{CreateMicrochipRequest, CreatePetRequest, MicrochipInfo, Pet, UpdatePetRequest};

pub struct PetsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PetsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Pet>, ApiError> {
        self.client
            .cache()
            .fetch(keys::pet_lists(), PETS_STALE_TIME, || self.client.get("/pets"))
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<Pet, ApiError> {
        let path = format!("/pets/{id}");
        self.client
            .cache()
            .fetch(keys::pet_detail(&id.to_string()), PETS_STALE_TIME, || {
                self.client.get(&path)
            })
            .await
    }

    pub async fn create(&self, request: &CreatePetRequest) -> Result<Pet, ApiError> {
        let pet: Pet = self.client.post("/pets", request).await?;
        self.client.cache().invalidate(&keys::pet_lists()).await;
        Ok(pet)
    }

    /// Replaces the pet in the cached list and caches the new detail.
    pub async fn update(&self, id: Uuid, request: &UpdatePetRequest) -> Result<Pet, ApiError> {
        let pet: Pet = self.client.put(&format!("/pets/{id}"), request).await?;
        let cache = self.client.cache();
        cache
            .update(&keys::pet_lists(), |pets: &mut Vec<Pet>| {
                if let Some(slot) = pets.iter_mut().find(|p| p.id == id) {
                    *slot = pet.clone();
                }
            })
            .await;
        cache
            .set(keys::pet_detail(&id.to_string()), &pet, PETS_STALE_TIME)
            .await;
        Ok(pet)
    }

    /// Removes the pet from the cached list and drops its detail.
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let _: Option<serde_json::Value> = self.client.delete(&format!("/pets/{id}")).await?;
        let cache = self.client.cache();
        cache
            .update(&keys::pet_lists(), |pets: &mut Vec<Pet>| pets.retain(|p| p.id != id))
            .await;
        cache.remove(&keys::pet_detail(&id.to_string())).await;
        Ok(())
    }

    pub async fn add_microchip(
        &self,
        pet_id: Uuid,
        request: &CreateMicrochipRequest,
    ) -> Result<MicrochipInfo, ApiError> {
        let chip: MicrochipInfo = self
            .client
            .post(&format!("/pets/{pet_id}/microchip"), request)
            .await?;
        let cache = self.client.cache();
        cache.invalidate(&keys::pet_detail(&pet_id.to_string())).await;
        cache.invalidate(&keys::pet_lists()).await;
        Ok(chip)
    }
}
