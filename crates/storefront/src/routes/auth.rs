//! Authentication route handlers.
//!
//! Handles login, signup with OTP verification, password reset, and
//! logout against the commerce API's auth endpoints. Handlers here are
//! deliberately not instrumented so credentials never reach the logs.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use fortynine_core::Email;
use fortynine_core::api::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, ResendOtpRequest, ResetPasswordRequest,
    SignupRequest, VerifyOtpRequest,
};

use crate::backend::ApiError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// OTP verification form data.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpForm {
    pub otp: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Reset password form data. Email and token ride along as hidden
/// fields, copied from the emailed link.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub email: String,
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Query parameters on the emailed password-reset link.
#[derive(Debug, Deserialize)]
pub struct ResetLinkQuery {
    pub email: Option<String>,
    pub token: Option<String>,
}

/// Map an auth error code from the URL to customer-facing text.
fn auth_error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "Incorrect email or password.",
        "try-later" => "Too many attempts. Please wait a minute and try again.",
        "session" => "Your session could not be saved. Please try again.",
        "password-mismatch" => "The passwords do not match.",
        "email" => "Enter a valid email address.",
        "password-short" => "Use at least 8 characters for your password.",
        "email-taken" => "An account with this email already exists.",
        "signup" => "Could not create your account. Please try again.",
        "otp" => "That code is incorrect or has expired.",
        "otp-resend" => "Could not resend the code. Please try again.",
        "invalid-reset-link" => "That reset link is invalid or incomplete.",
        _ => "Something went wrong. Please try again.",
    }
}

/// Map an auth success code from the URL to customer-facing text.
fn auth_success_message(code: &str) -> &'static str {
    match code {
        "email-sent" => "If that email has an account, a reset link is on its way.",
        "otp-sent" => "We've emailed you a fresh code.",
        "password-reset" => "Your password has been changed. Log in with the new one.",
        _ => "Done.",
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: Option<CurrentUser>,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub user: Option<CurrentUser>,
    pub error: Option<&'static str>,
}

/// OTP verification page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/verify_otp.html")]
pub struct VerifyOtpTemplate {
    pub user: Option<CurrentUser>,
    /// Email the code was sent to, shown for reassurance.
    pub email: String,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub user: Option<CurrentUser>,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub user: Option<CurrentUser>,
    pub email: String,
    pub token: String,
    pub error: Option<&'static str>,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Log the customer in: store the identity in the session and tag Sentry.
async fn establish_session(
    session: &Session,
    auth: AuthResponse,
) -> Result<(), tower_sessions::session::Error> {
    let user = CurrentUser {
        id: auth.user.id,
        name: auth.user.name,
        email: auth.user.email,
        token: auth.token,
    };
    set_current_user(session, &user).await?;
    set_sentry_user(&user.id, Some(&user.email));
    Ok(())
}

/// The email parked in the session between signup and OTP verification.
async fn pending_signup_email(session: &Session) -> Option<String> {
    session
        .get::<String>(session_keys::PENDING_SIGNUP_EMAIL)
        .await
        .ok()
        .flatten()
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        user: None,
        error: query.error.as_deref().map(auth_error_message),
        success: query.success.as_deref().map(auth_success_message),
    }
    .into_response()
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let request = LoginRequest {
        email: form.email.trim().to_lowercase(),
        password: form.password,
    };

    match state.api().login(&request).await {
        Ok(auth) => {
            if let Err(e) = establish_session(&session, auth).await {
                tracing::error!("Failed to set session: {e}");
                return Redirect::to("/auth/login?error=session").into_response();
            }
            Redirect::to("/").into_response()
        }
        Err(ApiError::Unauthorized) => {
            Redirect::to("/auth/login?error=credentials").into_response()
        }
        Err(ApiError::RateLimited(_)) => {
            Redirect::to("/auth/login?error=try-later").into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            Redirect::to("/auth/login?error=server").into_response()
        }
    }
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    SignupTemplate {
        user: None,
        error: query.error.as_deref().map(auth_error_message),
    }
    .into_response()
}

/// Handle signup form submission.
///
/// The backend emails an OTP; the customer lands on the verification
/// page with their email parked in the session.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    if form.password != form.password_confirm {
        return Redirect::to("/auth/signup?error=password-mismatch").into_response();
    }
    if form.password.len() < 8 {
        return Redirect::to("/auth/signup?error=password-short").into_response();
    }
    let Ok(email) = Email::parse(&form.email) else {
        return Redirect::to("/auth/signup?error=email").into_response();
    };

    let request = SignupRequest {
        name: form.name.trim().to_string(),
        email: email.as_str().to_lowercase(),
        password: form.password,
    };

    match state.api().signup(&request).await {
        Ok(user) => {
            if let Err(e) = session
                .insert(session_keys::PENDING_SIGNUP_EMAIL, &user.email)
                .await
            {
                tracing::error!("Failed to park signup email in session: {e}");
                return Redirect::to("/auth/signup?error=session").into_response();
            }
            Redirect::to("/auth/verify-otp").into_response()
        }
        Err(ApiError::Status { status: 409, .. }) => {
            Redirect::to("/auth/signup?error=email-taken").into_response()
        }
        Err(e) => {
            tracing::warn!("Signup failed: {e}");
            Redirect::to("/auth/signup?error=signup").into_response()
        }
    }
}

// =============================================================================
// OTP Verification Routes
// =============================================================================

/// Display the OTP verification page.
///
/// Only reachable with a signup in flight; otherwise back to signup.
pub async fn verify_otp_page(session: Session, Query(query): Query<MessageQuery>) -> Response {
    let Some(email) = pending_signup_email(&session).await else {
        return Redirect::to("/auth/signup").into_response();
    };

    VerifyOtpTemplate {
        user: None,
        email,
        error: query.error.as_deref().map(auth_error_message),
        success: query.success.as_deref().map(auth_success_message),
    }
    .into_response()
}

/// Handle OTP form submission. A correct code verifies the account and
/// logs the customer straight in.
pub async fn verify_otp(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<VerifyOtpForm>,
) -> Response {
    let Some(email) = pending_signup_email(&session).await else {
        return Redirect::to("/auth/signup").into_response();
    };

    let request = VerifyOtpRequest {
        email,
        otp: form.otp.trim().to_string(),
    };

    match state.api().verify_otp(&request).await {
        Ok(auth) => {
            if let Err(e) = establish_session(&session, auth).await {
                tracing::error!("Failed to set session after OTP verification: {e}");
                return Redirect::to("/auth/login?error=session").into_response();
            }
            if let Err(e) = session
                .remove::<String>(session_keys::PENDING_SIGNUP_EMAIL)
                .await
            {
                tracing::error!("Failed to clear pending signup email: {e}");
            }
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("OTP verification failed: {e}");
            Redirect::to("/auth/verify-otp?error=otp").into_response()
        }
    }
}

/// Send a fresh OTP to the email parked in the session.
pub async fn resend_otp(State(state): State<AppState>, session: Session) -> Response {
    let Some(email) = pending_signup_email(&session).await else {
        return Redirect::to("/auth/signup").into_response();
    };

    match state.api().resend_otp(&ResendOtpRequest { email }).await {
        Ok(()) => Redirect::to("/auth/verify-otp?success=otp-sent").into_response(),
        Err(e) => {
            tracing::warn!("OTP resend failed: {e}");
            Redirect::to("/auth/verify-otp?error=otp-resend").into_response()
        }
    }
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(Query(query): Query<MessageQuery>) -> ForgotPasswordTemplate {
    ForgotPasswordTemplate {
        user: None,
        error: query.error.as_deref().map(auth_error_message),
        success: query.success.as_deref().map(auth_success_message),
    }
}

/// Handle forgot password form submission.
///
/// Always reports success so the form cannot be used to probe which
/// emails have accounts.
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Redirect {
    let request = ForgotPasswordRequest {
        email: form.email.trim().to_lowercase(),
    };

    if let Err(e) = state.api().forgot_password(&request).await {
        tracing::warn!("Password reset request failed: {e}");
    }

    Redirect::to("/auth/forgot-password?success=email-sent")
}

/// Display the reset password page, reached from the emailed link.
pub async fn reset_password_page(Query(query): Query<ResetLinkQuery>) -> Response {
    let (Some(email), Some(token)) = (query.email, query.token) else {
        return Redirect::to("/auth/forgot-password?error=invalid-reset-link").into_response();
    };

    ResetPasswordTemplate {
        user: None,
        email,
        token,
        error: None,
    }
    .into_response()
}

/// Handle reset password form submission.
///
/// Validation failures re-render the form so the link's email and token
/// survive the round trip.
pub async fn reset_password(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    if form.password != form.password_confirm {
        return ResetPasswordTemplate {
            user: None,
            email: form.email,
            token: form.token,
            error: Some(auth_error_message("password-mismatch")),
        }
        .into_response();
    }
    if form.password.len() < 8 {
        return ResetPasswordTemplate {
            user: None,
            email: form.email,
            token: form.token,
            error: Some(auth_error_message("password-short")),
        }
        .into_response();
    }

    let request = ResetPasswordRequest {
        email: form.email.trim().to_lowercase(),
        token: form.token.clone(),
        new_password: form.password,
    };

    match state.api().reset_password(&request).await {
        Ok(()) => Redirect::to("/auth/login?success=password-reset").into_response(),
        Err(e) => {
            tracing::warn!("Password reset failed: {e}");
            ResetPasswordTemplate {
                user: None,
                email: request.email,
                token: request.token,
                error: Some("Could not reset your password. The link may have expired."),
            }
            .into_response()
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout: clear the identity, destroy the session, untag Sentry.
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session user: {e}");
    }
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }
    clear_sentry_user();

    Redirect::to("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(auth_error_message("credentials"), "Incorrect email or password.");
        assert_eq!(
            auth_error_message("unknown-code"),
            "Something went wrong. Please try again."
        );
    }

    #[test]
    fn test_auth_success_messages() {
        assert!(auth_success_message("email-sent").contains("reset link"));
        assert!(auth_success_message("password-reset").contains("changed"));
    }
}
