//! Sign-in, registration, and e-mail verification forms.

use super::{FieldErrors, Validate, email, exact_digits};
use crate::model::{LoginRequest, RegisterRequest, ResendOtpRequest, Role, VerifyEmailRequest};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn to_request(&self) -> Result<LoginRequest, FieldErrors> {
        self.validate()?;
        Ok(LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        email(&mut errors, "email", "E-mail", &self.email);
        password_length(&mut errors, &self.password);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Option<Role>,
}

impl RegisterForm {
    pub fn to_request(&self) -> Result<RegisterRequest, FieldErrors> {
        self.validate()?;
        let role = self.role.ok_or_else(FieldErrors::new)?;
        Ok(RegisterRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            role,
        })
    }
}

impl Validate for RegisterForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        email(&mut errors, "email", "E-mail", &self.email);
        password_length(&mut errors, &self.password);

        let has_lower = self.password.chars().any(|c| c.is_lowercase());
        let has_upper = self.password.chars().any(|c| c.is_uppercase());
        let has_digit = self.password.chars().any(|c| c.is_ascii_digit());
        if !(has_lower && has_upper && has_digit) {
            errors.add(
                "password",
                "Password must contain an upper-case letter, a lower-case letter and a digit",
            );
        }

        if self.confirm_password.is_empty() {
            errors.add("confirmPassword", "Please repeat the password");
        } else if self.confirm_password != self.password {
            errors.add("confirmPassword", "Passwords do not match");
        }

        if self.role.is_none() {
            errors.add("role", "Select a valid role");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct VerifyEmailForm {
    pub email: String,
    pub otp: String,
}

impl VerifyEmailForm {
    pub fn to_request(&self) -> Result<VerifyEmailRequest, FieldErrors> {
        self.validate()?;
        Ok(VerifyEmailRequest {
            email: self.email.trim().to_string(),
            otp: self.otp.trim().to_string(),
        })
    }
}

impl Validate for VerifyEmailForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        email(&mut errors, "email", "E-mail", &self.email);
        exact_digits(&mut errors, "otp", "Verification code", &self.otp, 6);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResendOtpForm {
    pub email: String,
}

impl ResendOtpForm {
    pub fn to_request(&self) -> Result<ResendOtpRequest, FieldErrors> {
        self.validate()?;
        Ok(ResendOtpRequest {
            email: self.email.trim().to_string(),
        })
    }
}

impl Validate for ResendOtpForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        email(&mut errors, "email", "E-mail", &self.email);
        errors.into_result()
    }
}

fn password_length(errors: &mut FieldErrors, password: &str) {
    if password.is_empty() {
        errors.add("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            email: "owner@example.com".into(),
            password: password.into(),
            confirm_password: confirm.into(),
            role: Some(Role::User),
        }
    }

    #[test]
    fn login_requires_email_and_long_password() {
        let errors = LoginForm::new("", "short").validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("E-mail is required"));
        assert_eq!(errors.get("password"), Some("Password must be at least 8 characters"));

        let request = LoginForm::new("  vet@example.com ", "Secret123").to_request().unwrap();
        assert_eq!(request.email, "vet@example.com");
    }

    #[test]
    fn register_password_complexity() {
        let errors = register("alllowercase1", "alllowercase1").validate().unwrap_err();
        assert!(errors.get("password").unwrap().contains("upper-case"));
        assert!(register("Secret123", "Secret123").validate().is_ok());
    }

    #[test]
    fn register_confirm_must_match() {
        let errors = register("Secret123", "Secret124").validate().unwrap_err();
        assert_eq!(errors.get("confirmPassword"), Some("Passwords do not match"));
        assert!(!errors.contains("password"));
    }

    #[test]
    fn register_requires_role() {
        let mut form = register("Secret123", "Secret123");
        form.role = None;
        let errors = form.to_request().unwrap_err();
        assert_eq!(errors.get("role"), Some("Select a valid role"));
    }

    #[test]
    fn verify_email_otp_is_six_digits() {
        let form = VerifyEmailForm {
            email: "vet@example.com".into(),
            otp: "12a456".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("otp"), Some("Verification code must contain digits only"));

        let form = VerifyEmailForm {
            email: "vet@example.com".into(),
            otp: "123456".into(),
        };
        assert_eq!(form.to_request().unwrap().otp, "123456");
    }

    #[test]
    fn resend_otp_needs_valid_email() {
        let form = ResendOtpForm { email: "nope".into() };
        assert_eq!(
            form.validate().unwrap_err().get("email"),
            Some("Enter a valid e-mail address")
        );
    }
}
