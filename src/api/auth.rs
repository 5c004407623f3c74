//! `/auth` endpoints.

use super::client::ApiClient;
use crate::error::ApiError;
use crate::model::auth::{MeResponse, RegisteredEmail};
use crate::model::{
    AuthResponse, LoginRequest, RegisterRequest, ResendOtpRequest, User, VerifyEmailRequest,
};

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Create an account; the backend e-mails an OTP.
    pub async fn register(&self, request: &RegisterRequest) -> Result<String, ApiError> {
        let registered: RegisteredEmail = self.client.post("/auth/register", request).await?;
        Ok(registered.email)
    }

    pub async fn verify_email(&self, request: &VerifyEmailRequest) -> Result<AuthResponse, ApiError> {
        self.client.post("/auth/verify-email", request).await
    }

    pub async fn resend_otp(&self, request: &ResendOtpRequest) -> Result<(), ApiError> {
        let _: Option<serde_json::Value> = self.client.post("/auth/resend-otp", request).await?;
        Ok(())
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.client.post("/auth/login", request).await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        let me: MeResponse = self.client.get("/auth/me").await?;
        Ok(me.user)
    }
}
