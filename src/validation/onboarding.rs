//! Veterinarian onboarding forms: personal, company, and clinic info.
//!
//! Each form prefills from the record the backend returns and converts back
//! into the same record for saving, so a save followed by a reload yields the
//! values that were submitted.

use chrono::{Datelike, NaiveDate, Utc};

use super::{FieldErrors, Validate, date, email, exact_digits, person_name, phone, selection, text};
use crate::model::date_part;
use crate::model::vet::{ClinicInfo, CompanyInfo, CompanyType, Gender, PersonalInfo, PhoneNumber};

const MIN_AGE: i32 = 18;
const MAX_AGE: i32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalInfoForm {
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`.
    pub birth_date: String,
    pub gender: Gender,
    pub tc_identity_no: String,
    pub phone: PhoneNumber,
}

impl PersonalInfoForm {
    /// Validate against a fixed "today".
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        person_name(&mut errors, "firstName", "First name", &self.first_name);
        person_name(&mut errors, "lastName", "Last name", &self.last_name);
        if let Some(birth) = date(&mut errors, "birthDate", "Birth date", &self.birth_date) {
            // Calendar-year difference, the same coarse check the sign-up page shows.
            let age = today.year() - birth.year();
            if !(MIN_AGE..=MAX_AGE).contains(&age) {
                errors.add("birthDate", format!("Age must be between {MIN_AGE} and {MAX_AGE}"));
            }
        }
        exact_digits(&mut errors, "tcIdentityNo", "Identity number", &self.tc_identity_no, 11);
        phone(&mut errors, "phone", "Phone number", &self.phone);
        errors.into_result()
    }

    pub fn to_request(&self) -> Result<PersonalInfo, FieldErrors> {
        self.validate()?;
        Ok(PersonalInfo {
            id: None,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            birth_date: date_part(self.birth_date.trim()).to_string(),
            gender: self.gender,
            tc_identity_no: self.tc_identity_no.trim().to_string(),
            phone: PhoneNumber::new(self.phone.country_code, self.phone.number.trim()),
        })
    }
}

impl Validate for PersonalInfoForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        self.validate_on(Utc::now().date_naive())
    }
}

impl From<&PersonalInfo> for PersonalInfoForm {
    fn from(info: &PersonalInfo) -> Self {
        Self {
            first_name: info.first_name.clone(),
            last_name: info.last_name.clone(),
            birth_date: date_part(&info.birth_date).to_string(),
            gender: info.gender,
            tc_identity_no: info.tc_identity_no.clone(),
            phone: info.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyInfoForm {
    pub company_name: String,
    pub company_type: CompanyType,
    pub tax_office: String,
    pub tax_number: String,
    /// 0 until a city is chosen.
    pub city_id: u32,
    /// 0 until a district is chosen.
    pub district_id: u32,
    pub address: String,
}

impl CompanyInfoForm {
    /// Choosing a different city clears the district.
    pub fn select_city(&mut self, city_id: u32) {
        if self.city_id != city_id {
            self.city_id = city_id;
            self.district_id = 0;
        }
    }

    pub fn to_request(&self) -> Result<CompanyInfo, FieldErrors> {
        self.validate()?;
        Ok(CompanyInfo {
            id: None,
            company_name: self.company_name.trim().to_string(),
            company_type: self.company_type,
            tax_office: self.tax_office.trim().to_string(),
            tax_number: self.tax_number.trim().to_string(),
            city_id: self.city_id,
            district_id: self.district_id,
            address: self.address.trim().to_string(),
        })
    }
}

impl Validate for CompanyInfoForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        text(&mut errors, "companyName", "Company name", &self.company_name, 3, 100);
        text(&mut errors, "taxOffice", "Tax office", &self.tax_office, 2, 50);
        exact_digits(&mut errors, "taxNumber", "Tax number", &self.tax_number, 10);
        selection(&mut errors, "cityId", "city", self.city_id);
        selection(&mut errors, "districtId", "district", self.district_id);
        text(&mut errors, "address", "Address", &self.address, 10, 200);
        errors.into_result()
    }
}

impl From<&CompanyInfo> for CompanyInfoForm {
    fn from(info: &CompanyInfo) -> Self {
        Self {
            company_name: info.company_name.clone(),
            company_type: info.company_type,
            tax_office: info.tax_office.clone(),
            tax_number: info.tax_number.clone(),
            city_id: info.city_id,
            district_id: info.district_id,
            address: info.address.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClinicInfoForm {
    pub clinic_name: String,
    pub clinic_email: String,
    pub clinic_phone: PhoneNumber,
    pub city_id: u32,
    pub district_id: u32,
    pub address: String,
}

impl ClinicInfoForm {
    /// Choosing a different city clears the district.
    pub fn select_city(&mut self, city_id: u32) {
        if self.city_id != city_id {
            self.city_id = city_id;
            self.district_id = 0;
        }
    }

    pub fn to_request(&self) -> Result<ClinicInfo, FieldErrors> {
        self.validate()?;
        Ok(ClinicInfo {
            id: None,
            clinic_name: self.clinic_name.trim().to_string(),
            clinic_photo: None,
            clinic_email: self.clinic_email.trim().to_string(),
            clinic_phone: PhoneNumber::new(
                self.clinic_phone.country_code,
                self.clinic_phone.number.trim(),
            ),
            city_id: self.city_id,
            district_id: self.district_id,
            address: self.address.trim().to_string(),
        })
    }
}

impl Validate for ClinicInfoForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        text(&mut errors, "clinicName", "Clinic name", &self.clinic_name, 3, 100);
        email(&mut errors, "clinicEmail", "Clinic e-mail", &self.clinic_email);
        phone(&mut errors, "clinicPhone", "Clinic phone", &self.clinic_phone);
        selection(&mut errors, "cityId", "city", self.city_id);
        selection(&mut errors, "districtId", "district", self.district_id);
        text(&mut errors, "address", "Address", &self.address, 10, 200);
        errors.into_result()
    }
}

impl From<&ClinicInfo> for ClinicInfoForm {
    fn from(info: &ClinicInfo) -> Self {
        Self {
            clinic_name: info.clinic_name.clone(),
            clinic_email: info.clinic_email.clone(),
            clinic_phone: info.clinic_phone.clone(),
            city_id: info.city_id,
            district_id: info.district_id,
            address: info.address.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn personal() -> PersonalInfoForm {
        PersonalInfoForm {
            first_name: "Ayşe".into(),
            last_name: "Yılmaz".into(),
            birth_date: "1988-04-12".into(),
            gender: Gender::Female,
            tc_identity_no: "12345678901".into(),
            phone: PhoneNumber::new(90, "5321234567"),
        }
    }

    fn company() -> CompanyInfoForm {
        CompanyInfoForm {
            company_name: "Pati Veteriner Ltd".into(),
            company_type: CompanyType::Corporate,
            tax_office: "Kadıköy".into(),
            tax_number: "1234567890".into(),
            city_id: 34,
            district_id: 7,
            address: "Moda Caddesi No 12 Kadıköy".into(),
        }
    }

    #[test]
    fn valid_personal_info() {
        assert!(personal().validate_on(today()).is_ok());
    }

    #[test]
    fn personal_info_age_bounds() {
        let mut form = personal();
        form.birth_date = "2010-01-01".into();
        let errors = form.validate_on(today()).unwrap_err();
        assert_eq!(errors.get("birthDate"), Some("Age must be between 18 and 100"));

        form.birth_date = "1920-01-01".into();
        assert!(form.validate_on(today()).unwrap_err().contains("birthDate"));

        form.birth_date = "2008-12-31".into();
        assert!(form.validate_on(today()).is_ok(), "year difference of 18 is accepted");
    }

    #[test]
    fn personal_info_identity_and_phone() {
        let mut form = personal();
        form.tc_identity_no = "1234".into();
        form.phone = PhoneNumber::new(90, "532");
        let errors = form.validate_on(today()).unwrap_err();
        assert_eq!(errors.get("tcIdentityNo"), Some("Identity number must be 11 digits"));
        assert!(errors.contains("phone"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn personal_info_prefill_round_trip() {
        let form = personal();
        let mut saved = form.to_request().unwrap();
        // The backend echoes dates as timestamps.
        saved.birth_date = format!("{}T00:00:00.000Z", saved.birth_date);
        saved.id = Some("p-1".into());
        assert_eq!(PersonalInfoForm::from(&saved), form);
    }

    #[test]
    fn company_info_rules() {
        assert!(company().validate().is_ok());

        let mut form = company();
        form.tax_number = "123".into();
        form.address = "short".into();
        form.city_id = 0;
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("taxNumber"), Some("Tax number must be 10 digits"));
        assert_eq!(errors.get("address"), Some("Address must be at least 10 characters"));
        assert_eq!(errors.get("cityId"), Some("Select a valid city"));
    }

    #[test]
    fn changing_city_clears_district() {
        let mut form = company();
        form.select_city(34);
        assert_eq!(form.district_id, 7);
        form.select_city(6);
        assert_eq!(form.city_id, 6);
        assert_eq!(form.district_id, 0);
    }

    #[test]
    fn clinic_info_rules() {
        let form = ClinicInfoForm {
            clinic_name: "Pati Klinik".into(),
            clinic_email: "info@pati".into(),
            clinic_phone: PhoneNumber::new(90, "2165550000"),
            city_id: 34,
            district_id: 7,
            address: "Moda Caddesi No 12 Kadıköy".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("clinicEmail"), Some("Enter a valid e-mail address"));
        assert_eq!(errors.len(), 1);
    }
}
