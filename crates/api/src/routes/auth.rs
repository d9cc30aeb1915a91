//! Authentication routes: registration with OTP, login and password management.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::ValidatedJson,
    middleware::AuthUser,
    response::ApiResponse,
};
use tripdesk_core::auth::{
    AuthError, OneTimeCode, generate_otp, generate_reset_token, hash_password, hash_reset_token,
    verify_password,
};
use tripdesk_db::{
    PartnerRepository,
    entities::{partners, sea_orm_active_enums::PartnerStatus},
    repositories::NewPartner,
};
use tripdesk_shared::AppError;

/// Public auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/resend-otp", post(resend_otp))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
}

/// Auth routes that need a signed-in partner.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/profile", get(profile))
        .route("/auth/change-password", post(change_password))
        .route("/auth/logout", post(logout))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    name: String,
    #[validate(email(message = "A valid email is required"))]
    email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    password: String,
    phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
struct VerifyOtpRequest {
    #[validate(email(message = "A valid email is required"))]
    email: String,
    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    otp: String,
}

#[derive(Debug, Deserialize, Validate)]
struct EmailRequest {
    #[validate(email(message = "A valid email is required"))]
    email: String,
}

#[derive(Debug, Deserialize, Validate)]
struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    token: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Old password is required"))]
    old_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    new_password: String,
}

/// Signed-in partner with a bearer token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    partner: partners::Model,
    token: String,
    expires_in: i64,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register - Create an unverified partner and email an OTP.
async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> ApiResult<ApiResponse<()>> {
    let repo = PartnerRepository::new((*state.db).clone());

    if let Some(existing) = repo.find_by_email(&payload.email).await?
        && existing.is_verified
    {
        return Err(AuthError::EmailTaken.into());
    }

    let password_hash = hash_password(&payload.password)?;
    let otp = generate_otp(Utc::now());
    let partner = repo
        .register(NewPartner {
            name: payload.name,
            email: payload.email,
            password_hash,
            phone: payload.phone,
            otp: otp.code.clone(),
            otp_expires_at: otp.expires_at,
        })
        .await?;

    if let Err(e) = state
        .email_service
        .send_otp(&partner.email, &partner.name, &otp.code)
        .await
    {
        warn!(error = %e, partner_id = %partner.id, "Failed to send verification code");
    }

    info!(partner_id = %partner.id, "Partner registered");

    Ok(ApiResponse::created(
        "Registration successful. Please verify OTP sent to your email.",
        (),
    ))
}

/// POST /auth/verify-otp - Verify the emailed code and sign in.
async fn verify_otp(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyOtpRequest>,
) -> ApiResult<ApiResponse<SessionResponse>> {
    let repo = PartnerRepository::new((*state.db).clone());
    let partner = repo
        .find_by_email(&payload.email)
        .await?
        .ok_or(AuthError::AccountNotFound)?;

    if partner.is_verified {
        return Err(AuthError::AlreadyVerified.into());
    }
    if partner.status == PartnerStatus::Blocked {
        return Err(AuthError::Blocked.into());
    }
    if !OneTimeCode::matches(partner.otp.as_deref(), &payload.otp) {
        return Err(AuthError::InvalidOtp.into());
    }
    if partner
        .otp_expires_at
        .is_none_or(|expiry| expiry.to_utc() < Utc::now())
    {
        return Err(AuthError::OtpExpired.into());
    }

    let partner = repo.mark_verified(partner).await?;
    info!(partner_id = %partner.id, "Partner verified");

    let session = session(&state, partner)?;
    Ok(ApiResponse::with_message("Account verified successfully", session))
}

/// POST /auth/resend-otp - Issue a fresh code.
async fn resend_otp(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EmailRequest>,
) -> ApiResult<ApiResponse<()>> {
    let repo = PartnerRepository::new((*state.db).clone());
    let partner = repo
        .find_by_email(&payload.email)
        .await?
        .ok_or(AuthError::AccountNotFound)?;

    if partner.is_verified {
        return Err(AuthError::AlreadyVerified.into());
    }

    let otp = generate_otp(Utc::now());
    let partner = repo.set_otp(partner, otp.code.clone(), otp.expires_at).await?;

    state
        .email_service
        .send_otp(&partner.email, &partner.name, &otp.code)
        .await
        .map_err(|e| ApiError(AppError::ExternalService(e.to_string())))?;

    Ok(ApiResponse::<()>::message("OTP resent successfully"))
}

/// POST /auth/login - Password login.
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> ApiResult<ApiResponse<SessionResponse>> {
    let repo = PartnerRepository::new((*state.db).clone());

    let Some(partner) = repo.find_by_email(&payload.email).await? else {
        info!(email = %payload.email, "Login attempt for unknown email");
        return Err(AuthError::InvalidCredentials.into());
    };

    if !partner.is_verified {
        return Err(AuthError::NotVerified.into());
    }
    if partner.status == PartnerStatus::Blocked {
        return Err(AuthError::Blocked.into());
    }
    if !verify_password(&payload.password, &partner.password_hash)? {
        info!(partner_id = %partner.id, "Failed login attempt - invalid password");
        return Err(AuthError::InvalidCredentials.into());
    }

    info!(partner_id = %partner.id, "Partner logged in");

    let session = session(&state, partner)?;
    Ok(ApiResponse::with_message("Login successful", session))
}

/// POST /auth/forgot-password - Email a reset link.
async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EmailRequest>,
) -> ApiResult<ApiResponse<()>> {
    let repo = PartnerRepository::new((*state.db).clone());
    let partner = repo
        .find_by_email(&payload.email)
        .await?
        .ok_or(AuthError::AccountNotFound)?;

    if partner.status == PartnerStatus::Blocked {
        return Err(AuthError::Blocked.into());
    }

    let reset = generate_reset_token(Utc::now());
    let partner = repo
        .set_reset_token(partner, reset.digest.clone(), reset.expires_at)
        .await?;

    if let Err(e) = state
        .email_service
        .send_password_reset(&partner.email, &partner.name, &reset.token)
        .await
    {
        warn!(error = %e, partner_id = %partner.id, "Failed to send reset email");
        repo.clear_reset_token(partner).await?;
        return Err(ApiError(AppError::ExternalService(
            "Email could not be sent".to_string(),
        )));
    }

    Ok(ApiResponse::<()>::message("Reset email sent"))
}

/// POST /auth/reset-password - Set a new password with an emailed token.
async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<ApiResponse<()>> {
    let repo = PartnerRepository::new((*state.db).clone());
    let partner = repo
        .find_by_reset_token(&hash_reset_token(&payload.token), Utc::now())
        .await?
        .ok_or(AuthError::InvalidResetToken)?;

    let password_hash = hash_password(&payload.new_password)?;
    let partner = repo.update_password(partner, password_hash).await?;

    info!(partner_id = %partner.id, "Password reset");

    Ok(ApiResponse::<()>::message("Password reset successful"))
}

/// GET /auth/profile - The signed-in partner.
async fn profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<partners::Model>> {
    let partner = PartnerRepository::new((*state.db).clone())
        .find_by_id(auth.partner_id())
        .await?
        .ok_or_else(|| ApiError::not_found("Partner not found"))?;

    Ok(ApiResponse::ok(partner))
}

/// POST /auth/change-password - Change password after checking the old one.
async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<ApiResponse<()>> {
    let repo = PartnerRepository::new((*state.db).clone());
    let partner = repo
        .find_by_id(auth.partner_id())
        .await?
        .ok_or(AuthError::AccountNotFound)?;

    if !verify_password(&payload.old_password, &partner.password_hash)? {
        return Err(AuthError::WrongPassword.into());
    }

    let password_hash = hash_password(&payload.new_password)?;
    repo.update_password(partner, password_hash).await?;

    Ok(ApiResponse::<()>::message("Password updated successfully"))
}

/// POST /auth/logout - Tokens are stateless; the client drops its copy.
async fn logout(auth: AuthUser) -> ApiResponse<()> {
    info!(partner_id = %auth.partner_id(), "Partner logged out");
    ApiResponse::<()>::message("Logged out successfully")
}

fn session(state: &AppState, partner: partners::Model) -> ApiResult<SessionResponse> {
    let token = state
        .jwt_service
        .generate_access_token(partner.id, &partner.email)
        .map_err(|e| ApiError(AppError::Internal(e.to_string())))?;

    Ok(SessionResponse {
        partner,
        token,
        expires_in: state.jwt_service.access_token_expires_in(),
    })
}
