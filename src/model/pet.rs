//! Pets, microchips, and medical records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PetType {
    #[default]
    Dog,
    Cat,
    Bird,
    Other,
}

impl std::str::FromStr for PetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DOG" => Ok(Self::Dog),
            "CAT" => Ok(Self::Cat),
            "BIRD" => Ok(Self::Bird),
            "OTHER" => Ok(Self::Other),
            other => Err(format!("unknown pet type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PetGender {
    #[default]
    Male,
    Female,
}

impl std::str::FromStr for PetGender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            other => Err(format!("unknown gender '{other}'")),
        }
    }
}

/// Owner summary embedded in pet responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetOwner {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub user_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicrochipInfo {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub chip_number: String,
    pub chip_date: String,
    #[serde(default)]
    pub veterinarian_id: Option<String>,
}

/// Medical record kinds mirror the appointment kinds.
pub type MedicalRecordType = super::appointment::AppointmentType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub veterinarian_id: String,
    #[serde(default)]
    pub appointment_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub record_type: MedicalRecordType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub treatment: String,
    #[serde(default)]
    pub medication: String,
    #[serde(default)]
    pub notes: String,
    pub record_date: String,
    #[serde(default)]
    pub next_visit_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub pet_type: PetType,
    pub breed: String,
    pub birth_date: String,
    pub gender: PetGender,
    pub color: String,
    #[serde(default)]
    pub allergies: Option<String>,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<PetOwner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microchip_info: Option<MicrochipInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub medical_records: Vec<MedicalRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePetRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub pet_type: PetType,
    pub breed: String,
    pub birth_date: String,
    pub gender: PetGender,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePetRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMicrochipRequest {
    pub chip_number: String,
    pub chip_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_parses_with_microchip_and_records() {
        let json = r#"{
            "id": "ec4ed2cd-7e4a-4f49-833f-82c4cb9693ec",
            "name": "Buddy",
            "type": "DOG",
            "breed": "Golden Retriever",
            "birthDate": "2020-03-01T00:00:00.000Z",
            "gender": "MALE",
            "color": "golden",
            "allergies": null,
            "ownerId": "u-1",
            "microchipInfo": {
                "id": "85a079f7-86fc-4c7c-9c54-b6985f85b6da",
                "petId": "ec4ed2cd-7e4a-4f49-833f-82c4cb9693ec",
                "chipNumber": "985112345678901",
                "chipDate": "2021-01-01"
            },
            "medicalRecords": [{
                "id": "0b7c9a55-4a8e-4c57-9d0e-0f0c2d9b8f11",
                "petId": "ec4ed2cd-7e4a-4f49-833f-82c4cb9693ec",
                "veterinarianId": "v-1",
                "type": "VACCINATION",
                "title": "Rabies",
                "recordDate": "2024-02-02"
            }]
        }"#;
        let pet: Pet = serde_json::from_str(json).unwrap();
        assert_eq!(pet.pet_type, PetType::Dog);
        assert_eq!(pet.microchip_info.unwrap().chip_number, "985112345678901");
        assert_eq!(pet.medical_records.len(), 1);
        assert!(pet.allergies.is_none());
    }

    #[test]
    fn update_request_omits_unset_fields() {
        let update = UpdatePetRequest {
            color: Some("black".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "color": "black" }));
    }

    #[test]
    fn pet_type_from_str() {
        assert_eq!("cat".parse::<PetType>().unwrap(), PetType::Cat);
        assert!("fish".parse::<PetType>().is_err());
        assert_eq!("female".parse::<PetGender>().unwrap(), PetGender::Female);
    }
}
