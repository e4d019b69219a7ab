//! Staff authentication route handlers.
//!
//! Login goes through the same commerce API credentials endpoint the
//! storefront uses, but only accounts flagged as admin get a session
//! here. Handlers are deliberately not instrumented so credentials
//! never reach the logs.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use fortynine_core::api::LoginRequest;

use crate::backend::ApiError;
use crate::filters;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Map an auth error code from the URL to staff-facing text.
fn auth_error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "Incorrect email or password.",
        "not-admin" => "This account does not have admin access.",
        "session" => "Your session could not be saved. Please try again.",
        _ => "Something went wrong. Please try again.",
    }
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub admin: Option<CurrentAdmin>,
    pub error: Option<&'static str>,
}

/// Display the login page.
pub async fn login_page(session: Session, Query(query): Query<MessageQuery>) -> Response {
    let logged_in = session
        .get::<CurrentAdmin>(crate::models::session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
        .is_some();
    if logged_in {
        return Redirect::to("/orders").into_response();
    }

    LoginTemplate {
        admin: None,
        error: query.error.as_deref().map(auth_error_message),
    }
    .into_response()
}

/// Handle login form submission.
///
/// Non-admin accounts are rejected even with valid credentials; the
/// backend would refuse their token on every staff endpoint anyway.
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
            if !auth.user.is_admin {
                tracing::warn!(email = %auth.user.email, "Non-admin login refused");
                return Redirect::to("/auth/login?error=not-admin").into_response();
            }

            let admin = CurrentAdmin {
                id: auth.user.id,
                name: auth.user.name,
                email: auth.user.email,
                token: auth.token,
            };
            if let Err(e) = set_current_admin(&session, &admin).await {
                tracing::error!("Failed to set session: {e}");
                return Redirect::to("/auth/login?error=session").into_response();
            }

            sentry::configure_scope(|scope| {
                scope.set_user(Some(sentry::User {
                    id: Some(admin.id.to_string()),
                    email: Some(admin.email.clone()),
                    ..Default::default()
                }));
            });

            Redirect::to("/orders").into_response()
        }
        Err(ApiError::Unauthorized) => {
            Redirect::to("/auth/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            Redirect::to("/auth/login?error=server").into_response()
        }
    }
}

/// Handle logout.
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::error!("Failed to clear session on logout: {e}");
    }
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
    Redirect::to("/auth/login")
}
