//! Pet, microchip, and appointment forms.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use super::{FieldErrors, Validate, date, exact_digits, text};
use crate::model::date_part;
use crate::model::{
    AppointmentStatus, AppointmentType, CreateAppointmentRequest, CreateMicrochipRequest,
    CreatePetRequest, Pet, PetGender, PetType, UpdateAppointmentRequest, UpdatePetRequest,
};

const MAX_ALLERGIES: usize = 500;
const MAX_NOTES: usize = 500;

/// Formats accepted for an appointment time. Times without an offset are
/// taken as UTC.
const LOCAL_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

// ── Pets ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetForm {
    pub name: String,
    pub pet_type: PetType,
    pub breed: String,
    pub birth_date: String,
    pub gender: PetGender,
    pub color: String,
    pub allergies: String,
}

impl PetForm {
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        text(&mut errors, "name", "Name", &self.name, 2, 50);
        text(&mut errors, "breed", "Breed", &self.breed, 2, 50);
        past_date(&mut errors, "birthDate", "Birth date", &self.birth_date, today);
        text(&mut errors, "color", "Color", &self.color, 1, 50);
        allergies(&mut errors, &self.allergies);
        errors.into_result()
    }

    pub fn to_request(&self) -> Result<CreatePetRequest, FieldErrors> {
        self.validate()?;
        Ok(CreatePetRequest {
            name: self.name.trim().to_string(),
            pet_type: self.pet_type,
            breed: self.breed.trim().to_string(),
            birth_date: date_part(self.birth_date.trim()).to_string(),
            gender: self.gender,
            color: self.color.trim().to_string(),
            allergies: non_empty(&self.allergies),
        })
    }
}

impl Validate for PetForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        self.validate_on(Utc::now().date_naive())
    }
}

impl From<&Pet> for PetForm {
    fn from(pet: &Pet) -> Self {
        Self {
            name: pet.name.clone(),
            pet_type: pet.pet_type,
            breed: pet.breed.clone(),
            birth_date: date_part(&pet.birth_date).to_string(),
            gender: pet.gender,
            color: pet.color.clone(),
            allergies: pet.allergies.clone().unwrap_or_default(),
        }
    }
}

/// Partial pet edit: only the provided fields are checked and sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetUpdateForm {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub birth_date: Option<String>,
    pub color: Option<String>,
    pub allergies: Option<String>,
}

impl PetUpdateForm {
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            text(&mut errors, "name", "Name", name, 2, 50);
        }
        if let Some(breed) = &self.breed {
            text(&mut errors, "breed", "Breed", breed, 2, 50);
        }
        if let Some(birth_date) = &self.birth_date {
            past_date(&mut errors, "birthDate", "Birth date", birth_date, today);
        }
        if let Some(color) = &self.color {
            text(&mut errors, "color", "Color", color, 1, 50);
        }
        if let Some(value) = &self.allergies {
            allergies(&mut errors, value);
        }
        errors.into_result()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn to_request(&self) -> Result<UpdatePetRequest, FieldErrors> {
        self.validate()?;
        let trimmed = |v: &Option<String>| v.as_ref().map(|s| s.trim().to_string());
        Ok(UpdatePetRequest {
            name: trimmed(&self.name),
            breed: trimmed(&self.breed),
            birth_date: self
                .birth_date
                .as_ref()
                .map(|d| date_part(d.trim()).to_string()),
            color: trimmed(&self.color),
            allergies: trimmed(&self.allergies),
        })
    }
}

impl Validate for PetUpdateForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        self.validate_on(Utc::now().date_naive())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MicrochipForm {
    pub chip_number: String,
    pub chip_date: String,
}

impl MicrochipForm {
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        exact_digits(&mut errors, "chipNumber", "Chip number", &self.chip_number, 15);
        past_date(&mut errors, "chipDate", "Chip date", &self.chip_date, today);
        errors.into_result()
    }

    pub fn to_request(&self) -> Result<CreateMicrochipRequest, FieldErrors> {
        self.validate()?;
        Ok(CreateMicrochipRequest {
            chip_number: self.chip_number.trim().to_string(),
            chip_date: date_part(self.chip_date.trim()).to_string(),
        })
    }
}

impl Validate for MicrochipForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        self.validate_on(Utc::now().date_naive())
    }
}

// ── Appointments ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentForm {
    pub pet_id: String,
    pub appointment_type: AppointmentType,
    pub title: String,
    /// `YYYY-MM-DDTHH:MM` (UTC) or an RFC 3339 timestamp.
    pub appointment_date: String,
    pub notes: String,
    pub vaccine_type: String,
    pub treatment_type: String,
    pub surgery_type: String,
}

impl AppointmentForm {
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.pet_id.trim().is_empty() {
            errors.add("petId", "Select a pet");
        } else if Uuid::parse_str(self.pet_id.trim()).is_err() {
            errors.add("petId", "Select a valid pet");
        }
        text(&mut errors, "title", "Title", &self.title, 3, 100);

        if self.appointment_date.trim().is_empty() {
            errors.add("appointmentDate", "Appointment date is required");
        } else {
            match parse_appointment_date(&self.appointment_date) {
                None => errors.add("appointmentDate", "Appointment date must be a valid date"),
                Some(when) if when <= now => {
                    errors.add("appointmentDate", "Appointment date must be in the future")
                }
                Some(_) => {}
            }
        }

        if self.notes.chars().count() > MAX_NOTES {
            errors.add("notes", format!("Notes must be at most {MAX_NOTES} characters"));
        }

        if let Some((field, label)) = type_field(self.appointment_type) {
            if self.type_specific().is_none() {
                errors.add(field, format!("{label} is required"));
            }
        }
        errors.into_result()
    }

    /// The value of the field the selected type requires, if filled in.
    fn type_specific(&self) -> Option<String> {
        let value = match self.appointment_type {
            AppointmentType::Vaccination => &self.vaccine_type,
            AppointmentType::Treatment => &self.treatment_type,
            AppointmentType::Surgery => &self.surgery_type,
            AppointmentType::Checkup => return None,
        };
        non_empty(value)
    }

    pub fn to_request_at(&self, now: DateTime<Utc>) -> Result<CreateAppointmentRequest, FieldErrors> {
        self.validate_at(now)?;
        let mut errors = FieldErrors::new();
        let pet_id = Uuid::parse_str(self.pet_id.trim()).ok();
        let appointment_date = parse_appointment_date(&self.appointment_date);
        let (Some(pet_id), Some(appointment_date)) = (pet_id, appointment_date) else {
            errors.add("appointmentDate", "Appointment date must be a valid date");
            return Err(errors);
        };

        let specific = self.type_specific();
        let (vaccine_type, treatment_type, surgery_type) = match self.appointment_type {
            AppointmentType::Vaccination => (specific, None, None),
            AppointmentType::Treatment => (None, specific, None),
            AppointmentType::Surgery => (None, None, specific),
            AppointmentType::Checkup => (None, None, None),
        };

        Ok(CreateAppointmentRequest {
            pet_id,
            appointment_type: self.appointment_type,
            title: self.title.trim().to_string(),
            appointment_date,
            notes: non_empty(&self.notes),
            vaccine_type,
            treatment_type,
            surgery_type,
        })
    }

    pub fn to_request(&self) -> Result<CreateAppointmentRequest, FieldErrors> {
        self.to_request_at(Utc::now())
    }
}

impl Validate for AppointmentForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        self.validate_at(Utc::now())
    }
}

/// Status change or notes on an existing appointment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentUpdateForm {
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
    pub vaccine_type: Option<String>,
    pub treatment_type: Option<String>,
    pub surgery_type: Option<String>,
}

impl AppointmentUpdateForm {
    pub fn to_request(&self) -> Result<UpdateAppointmentRequest, FieldErrors> {
        self.validate()?;
        Ok(UpdateAppointmentRequest {
            status: self.status,
            notes: self.notes.as_ref().map(|s| s.trim().to_string()),
            vaccine_type: self.vaccine_type.as_deref().and_then(|s| non_empty(s)),
            treatment_type: self.treatment_type.as_deref().and_then(|s| non_empty(s)),
            surgery_type: self.surgery_type.as_deref().and_then(|s| non_empty(s)),
        })
    }
}

impl Validate for AppointmentUpdateForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self == &Self::default() {
            errors.add("status", "Nothing to update");
        }
        if let Some(notes) = &self.notes {
            if notes.chars().count() > MAX_NOTES {
                errors.add("notes", format!("Notes must be at most {MAX_NOTES} characters"));
            }
        }
        errors.into_result()
    }
}

/// Parse an appointment time. Offset-less inputs are interpreted as UTC.
pub fn parse_appointment_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    LOCAL_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

// ── Shared rules ────────────────────────────────────────────────────────

fn type_field(kind: AppointmentType) -> Option<(&'static str, &'static str)> {
    match kind {
        AppointmentType::Vaccination => Some(("vaccineType", "Vaccine type")),
        AppointmentType::Treatment => Some(("treatmentType", "Treatment type")),
        AppointmentType::Surgery => Some(("surgeryType", "Surgery type")),
        AppointmentType::Checkup => None,
    }
}

fn past_date(errors: &mut FieldErrors, field: &str, label: &str, value: &str, today: NaiveDate) {
    if let Some(parsed) = date(errors, field, label, value) {
        if parsed > today {
            errors.add(field, format!("{label} cannot be in the future"));
        }
    }
}

fn allergies(errors: &mut FieldErrors, value: &str) {
    if value.chars().count() > MAX_ALLERGIES {
        errors.add(
            "allergies",
            format!("Allergies must be at most {MAX_ALLERGIES} characters"),
        );
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PET_ID: &str = "ec4ed2cd-7e4a-4f49-833f-82c4cb9693ec";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2026-06-01T12:00:00Z".parse().unwrap()
    }

    fn appointment(kind: AppointmentType) -> AppointmentForm {
        AppointmentForm {
            pet_id: PET_ID.into(),
            appointment_type: kind,
            title: "Annual visit".into(),
            appointment_date: "2026-06-10T09:30".into(),
            ..Default::default()
        }
    }

    #[test]
    fn pet_form_rules() {
        let form = PetForm {
            name: "B".into(),
            breed: "Tabby".into(),
            birth_date: "2027-01-01".into(),
            color: "".into(),
            allergies: "x".repeat(501),
            ..Default::default()
        };
        let errors = form.validate_on(today()).unwrap_err();
        assert_eq!(errors.get("name"), Some("Name must be at least 2 characters"));
        assert_eq!(errors.get("birthDate"), Some("Birth date cannot be in the future"));
        assert_eq!(errors.get("color"), Some("Color is required"));
        assert!(errors.contains("allergies"));
        assert!(!errors.contains("breed"));
    }

    #[test]
    fn pet_request_drops_blank_allergies() {
        let form = PetForm {
            name: "Tekir".into(),
            pet_type: PetType::Cat,
            breed: "Van".into(),
            birth_date: "2020-02-02".into(),
            gender: PetGender::Female,
            color: "white".into(),
            allergies: "   ".into(),
        };
        let request = form.to_request().unwrap();
        assert!(request.allergies.is_none());
        assert_eq!(request.pet_type, PetType::Cat);
    }

    #[test]
    fn pet_update_checks_only_provided_fields() {
        let update = PetUpdateForm {
            color: Some("black".into()),
            ..Default::default()
        };
        assert!(update.validate_on(today()).is_ok());

        let update = PetUpdateForm {
            name: Some("".into()),
            ..Default::default()
        };
        assert_eq!(
            update.validate_on(today()).unwrap_err().get("name"),
            Some("Name is required")
        );
        assert!(PetUpdateForm::default().is_empty());
    }

    #[test]
    fn microchip_needs_fifteen_digits() {
        let form = MicrochipForm {
            chip_number: "98511234567890".into(),
            chip_date: "2026-05-01".into(),
        };
        let errors = form.validate_on(today()).unwrap_err();
        assert_eq!(errors.get("chipNumber"), Some("Chip number must be 15 digits"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn vaccination_requires_vaccine_type() {
        let form = appointment(AppointmentType::Vaccination);
        let errors = form.validate_at(now()).unwrap_err();
        assert_eq!(errors.get("vaccineType"), Some("Vaccine type is required"));

        let mut form = form;
        form.vaccine_type = "  ".into();
        assert!(form.validate_at(now()).unwrap_err().contains("vaccineType"));
        form.vaccine_type = "Rabies".into();
        assert!(form.validate_at(now()).is_ok());
    }

    #[test]
    fn checkup_needs_no_type_field() {
        assert!(appointment(AppointmentType::Checkup).validate_at(now()).is_ok());
    }

    #[test]
    fn appointment_must_be_in_future() {
        let mut form = appointment(AppointmentType::Checkup);
        form.appointment_date = "2026-05-31T09:00".into();
        assert_eq!(
            form.validate_at(now()).unwrap_err().get("appointmentDate"),
            Some("Appointment date must be in the future")
        );
        form.appointment_date = "next tuesday".into();
        assert_eq!(
            form.validate_at(now()).unwrap_err().get("appointmentDate"),
            Some("Appointment date must be a valid date")
        );
    }

    #[test]
    fn appointment_rejects_bad_pet_id() {
        let mut form = appointment(AppointmentType::Checkup);
        form.pet_id = "pet-1".into();
        assert_eq!(
            form.validate_at(now()).unwrap_err().get("petId"),
            Some("Select a valid pet")
        );
    }

    #[test]
    fn request_carries_only_matching_type_field() {
        let mut form = appointment(AppointmentType::Surgery);
        form.surgery_type = "Spay".into();
        form.vaccine_type = "Rabies".into();
        let request = form.to_request_at(now()).unwrap();
        assert_eq!(request.surgery_type.as_deref(), Some("Spay"));
        assert!(request.vaccine_type.is_none());
        assert!(request.treatment_type.is_none());
        assert_eq!(request.appointment_date.to_rfc3339(), "2026-06-10T09:30:00+00:00");
    }

    #[test]
    fn parses_offset_timestamps_to_utc() {
        let parsed = parse_appointment_date("2026-06-10T12:30:00+03:00").unwrap();
        assert_eq!(parsed, "2026-06-10T09:30:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(AppointmentUpdateForm::default().validate().is_err());
        let update = AppointmentUpdateForm {
            status: Some(AppointmentStatus::Completed),
            ..Default::default()
        };
        assert_eq!(update.to_request().unwrap().status, Some(AppointmentStatus::Completed));
    }
}
