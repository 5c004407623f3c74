//! Appointments between a pet and a veterinarian.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pet::Pet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentType {
    #[default]
    Checkup,
    Vaccination,
    Surgery,
    Treatment,
}

impl std::str::FromStr for AppointmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CHECKUP" => Ok(Self::Checkup),
            "VACCINATION" => Ok(Self::Vaccination),
            "SURGERY" => Ok(Self::Surgery),
            "TREATMENT" => Ok(Self::Treatment),
            other => Err(format!("unknown appointment type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SCHEDULED" => Ok(Self::Scheduled),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(format!("unknown appointment status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub veterinarian_id: String,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub title: String,
    pub appointment_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub vaccine_type: Option<String>,
    #[serde(default)]
    pub treatment_type: Option<String>,
    #[serde(default)]
    pub surgery_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet: Option<Pet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub pet_id: Uuid,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub title: String,
    pub appointment_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vaccine_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surgery_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vaccine_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surgery_type: Option<String>,
}
