//! Wire models shared with the REST backend.
//!
//! JSON field names are camelCase and enum values SCREAMING_SNAKE_CASE, the
//! way the backend emits them.

pub mod appointment;
pub mod auth;
pub mod pet;
pub mod vet;

pub use appointment::{
    Appointment, AppointmentStatus, AppointmentType, CreateAppointmentRequest,
    UpdateAppointmentRequest,
};
pub use auth::{
    AuthResponse, LoginRequest, RegisterRequest, ResendOtpRequest, Role, User, VerifyEmailRequest,
};
pub use pet::{
    CreateMicrochipRequest, CreatePetRequest, MedicalRecord, MicrochipInfo, Pet, PetGender,
    PetType, UpdatePetRequest,
};
pub use vet::{ClinicInfo, CompanyInfo, CompanyType, Gender, PersonalInfo, PhoneNumber, VetProfile};

use serde::{Deserialize, Serialize};

/// The `{success, data, message}` envelope every endpoint responds with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(default)]
    pub message: String,
}

/// Trim an ISO-8601 timestamp to its `YYYY-MM-DD` date part.
pub fn date_part(value: &str) -> &str {
    value.split('T').next().unwrap_or(value)
}
