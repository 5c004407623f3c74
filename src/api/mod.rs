//! Typed REST layer over the `{success, data, message}` backend.
//!
//! [`ApiClient`] owns the HTTP client and the [`QueryCache`]; the resource
//! services borrow it:
//!
//! ```ignore
//! let pets = api.pets().list().await?;
//! ```

pub mod appointments;
pub mod auth;
pub mod cache;
pub mod client;
pub mod pets;
pub mod vet;

pub use appointments::AppointmentsApi;
pub use auth::AuthApi;
pub use cache::{QueryCache, QueryKey, keys};
pub use client::ApiClient;
pub use pets::PetsApi;
pub use vet::VetApi;

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn vet(&self) -> VetApi<'_> {
        VetApi::new(self)
    }

    pub fn pets(&self) -> PetsApi<'_> {
        PetsApi::new(self)
    }

    pub fn appointments(&self) -> AppointmentsApi<'_> {
        AppointmentsApi::new(self)
    }
}
