//! Account flows: registration, e-mail verification, sign-in and sign-out.
//!
//! Each flow validates its form first, calls the backend once, applies the
//! result to the session, and returns the page to open next.

use percent_encoding::utf8_percent_encode;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::{Result, SessionError, SubmitError};
use crate::guard::LOGIN_PATH;
use crate::model::User;
use crate::onboarding::landing_route;
use crate::session::cookie::URI_COMPONENT;
use crate::validation::{LoginForm, RegisterForm, ResendOtpForm, VerifyEmailForm};

pub const VERIFY_EMAIL_PATH: &str = "/auth/verify-email";

pub struct Account<'a> {
    api: &'a ApiClient,
}

impl<'a> Account<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Register and return the verification page for the new address.
    pub async fn register(&self, form: &RegisterForm) -> std::result::Result<String, SubmitError> {
        let request = form.to_request()?;
        let email = self.api.auth().register(&request).await?;
        info!(email = %email, role = %request.role, "Registered, awaiting verification");
        Ok(verify_email_route(&email))
    }

    /// Verify the OTP, sign in with the returned token, and land.
    pub async fn verify_email(&self, form: &VerifyEmailForm) -> std::result::Result<&'static str, SubmitError> {
        let request = form.to_request()?;
        let auth = self.api.auth().verify_email(&request).await?;
        let target = landing_route(&auth.user);
        self.api.session().login(auth.user, auth.access_token).await?;
        Ok(target)
    }

    pub async fn resend_otp(&self, form: &ResendOtpForm) -> std::result::Result<(), SubmitError> {
        let request = form.to_request()?;
        self.api.auth().resend_otp(&request).await?;
        Ok(())
    }

    /// Sign in. A rejected sign-in also drops whatever session was left.
    pub async fn login(&self, form: &LoginForm) -> std::result::Result<&'static str, SubmitError> {
        let request = form.to_request()?;
        let auth = match self.api.auth().login(&request).await {
            Ok(auth) => auth,
            Err(e) => {
                if let Err(clear) = self.api.session().logout().await {
                    warn!(error = %clear, "Could not clear session after failed sign-in");
                }
                return Err(e.into());
            }
        };
        let target = landing_route(&auth.user);
        self.api.session().login(auth.user, auth.access_token).await?;
        Ok(target)
    }

    /// Sign out, drop cached queries, and return the login page.
    pub async fn logout(&self) -> std::result::Result<&'static str, SessionError> {
        self.api.cache().clear().await;
        self.api.session().logout().await?;
        Ok(LOGIN_PATH)
    }

    /// Refresh the signed-in user from `/auth/me`.
    pub async fn refresh_user(&self) -> Result<User> {
        let user = self.api.auth().me().await?;
        self.api.session().set_user(user.clone()).await?;
        Ok(user)
    }
}

/// `/auth/verify-email?email=<address>`.
pub fn verify_email_route(email: &str) -> String {
    format!(
        "{VERIFY_EMAIL_PATH}?email={}",
        utf8_percent_encode(email, URI_COMPONENT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_route_encodes_address() {
        assert_eq!(
            verify_email_route("dr.ayse+vet@example.com"),
            "/auth/verify-email?email=dr.ayse%2Bvet%40example.com"
        );
        assert_eq!(
            verify_email_route("o'neil@example.com"),
            "/auth/verify-email?email=o'neil%40example.com"
        );
    }
}
