//! Account route handlers.
//!
//! Profile overview plus saved-address management. The address forms
//! mirror the checkout ones, but land back on `/account` and each edit
//! form ships with its dropdowns already narrowed to the saved state
//! and city.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use fortynine_core::api::{Address, CreateAddressRequest, UpdateUserRequest};
use fortynine_core::location::{AddressDraft, LocationDirectory};
use fortynine_core::types::AddressId;

use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

use super::checkout::address_error_code;
pub use super::checkout::AddressView;

// =============================================================================
// Query Parameters
// =============================================================================

/// Flash message codes carried on the account page URL.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Map an account error code from the URL to customer-facing text.
fn account_error_message(code: &str) -> &'static str {
    match code {
        "address-missing" => "Please fill in every address field.",
        "phone" => "Enter a valid 10-digit mobile number.",
        "location" => "We don't deliver to that state, city and PIN code combination yet.",
        "address-save" => "Could not save the address. Please try again.",
        "address-update" => "Could not update the address. Please try again.",
        "address-delete" => "Could not delete the address. Please try again.",
        "name" => "Enter your name.",
        "profile" => "Could not update your profile. Please try again.",
        _ => "Something went wrong. Please try again.",
    }
}

/// Map an account success code from the URL to customer-facing text.
fn account_success_message(code: &str) -> &'static str {
    match code {
        "address-saved" => "Address saved.",
        "address-updated" => "Address updated.",
        "address-deleted" => "Address deleted.",
        "profile-updated" => "Profile updated.",
        _ => "Done.",
    }
}

/// Profile form data. Only the display name is editable.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
}

// =============================================================================
// View Types
// =============================================================================

/// A saved address plus the dropdown options its edit form opens with.
pub struct AddressFormView {
    pub view: AddressView,
    /// Cities serviceable in the address's state.
    pub cities: Vec<String>,
    /// Postal codes serviceable in the address's city.
    pub postal_codes: Vec<String>,
}

impl AddressFormView {
    fn new(address: &Address, directory: &LocationDirectory) -> Self {
        Self {
            view: AddressView::from(address),
            cities: directory
                .cities(&address.state)
                .into_iter()
                .map(String::from)
                .collect(),
            postal_codes: directory
                .postal_codes(&address.state, &address.city)
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub user: Option<CurrentUser>,
    pub name: String,
    pub email: String,
    pub addresses: Vec<AddressFormView>,
    pub states: Vec<String>,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the account page with profile details and saved addresses.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<AccountTemplate> {
    // The profile is read fresh rather than from the session, so an
    // edit made on another device shows up here.
    let profile = state.api().get_user(&user.token, &user.id).await?;
    let addresses = state.api().get_addresses(&user.token, &user.id).await?;
    let directory = state.api().get_locations().await?;

    Ok(AccountTemplate {
        name: profile.name,
        email: profile.email,
        addresses: addresses
            .iter()
            .map(|address| AddressFormView::new(address, &directory))
            .collect(),
        states: directory.states().map(String::from).collect(),
        user: Some(user),
        error: query.error.as_deref().map(account_error_message),
        success: query.success.as_deref().map(account_success_message),
    })
}

/// Update the display name, refreshing the session copy on success.
#[instrument(skip(state, session, user, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Redirect {
    let name = form.name.trim();
    if name.is_empty() {
        return Redirect::to("/account?error=name");
    }

    let request = UpdateUserRequest {
        name: name.to_string(),
    };
    match state.api().update_user(&user.token, &user.id, &request).await {
        Ok(updated) => {
            let refreshed = CurrentUser {
                name: updated.name,
                ..user
            };
            if let Err(e) = set_current_user(&session, &refreshed).await {
                tracing::error!("Failed to refresh session after profile update: {e}");
            }
            Redirect::to("/account?success=profile-updated")
        }
        Err(e) => {
            tracing::error!("Failed to update profile: {e}");
            Redirect::to("/account?error=profile")
        }
    }
}

/// Save a new address from the account page.
#[instrument(skip(state, user, form))]
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressDraft>,
) -> Result<Redirect> {
    let directory = state.api().get_locations().await?;
    if let Err(e) = form.validate(&directory) {
        return Ok(Redirect::to(&format!(
            "/account?error={}",
            address_error_code(&e)
        )));
    }

    let request = CreateAddressRequest {
        user: user.id.clone(),
        address: form,
    };
    match state.api().create_address(&user.token, &request).await {
        Ok(_) => Ok(Redirect::to("/account?success=address-saved")),
        Err(e) => {
            tracing::error!("Failed to save address: {e}");
            Ok(Redirect::to("/account?error=address-save"))
        }
    }
}

/// Update a saved address in place.
#[instrument(skip(state, user, form))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(address_id): Path<AddressId>,
    Form(form): Form<AddressDraft>,
) -> Result<Redirect> {
    let directory = state.api().get_locations().await?;
    if let Err(e) = form.validate(&directory) {
        return Ok(Redirect::to(&format!(
            "/account?error={}",
            address_error_code(&e)
        )));
    }

    match state
        .api()
        .update_address(&user.token, &address_id, &form)
        .await
    {
        Ok(_) => Ok(Redirect::to("/account?success=address-updated")),
        Err(e) => {
            tracing::error!("Failed to update address {address_id}: {e}");
            Ok(Redirect::to("/account?error=address-update"))
        }
    }
}

/// Delete a saved address.
#[instrument(skip(state, user))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(address_id): Path<AddressId>,
) -> Redirect {
    match state.api().delete_address(&user.token, &address_id).await {
        Ok(()) => Redirect::to("/account?success=address-deleted"),
        Err(e) => {
            tracing::error!("Failed to delete address {address_id}: {e}");
            Redirect::to("/account?error=address-delete")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fortynine_core::types::UserId;

    fn directory() -> LocationDirectory {
        let mut directory = LocationDirectory::new();
        directory.insert(
            "Maharashtra".to_string(),
            "Ulwe".to_string(),
            vec!["410206".to_string(), "410207".to_string()],
        );
        directory.insert(
            "Maharashtra".to_string(),
            "Pune".to_string(),
            vec!["411001".to_string()],
        );
        directory.insert(
            "Karnataka".to_string(),
            "Bengaluru".to_string(),
            vec!["560001".to_string()],
        );
        directory
    }

    fn saved_address() -> Address {
        Address {
            id: AddressId::from("addr-1"),
            user: UserId::from("user-1"),
            label: "Home".to_string(),
            street: "12 Palm Beach Road".to_string(),
            country: "India".to_string(),
            phone_number: "9876543210".to_string(),
            state: "Maharashtra".to_string(),
            city: "Ulwe".to_string(),
            postal_code: "410206".to_string(),
        }
    }

    #[test]
    fn test_address_form_view_narrows_dropdowns() {
        let form = AddressFormView::new(&saved_address(), &directory());

        assert_eq!(form.view.city, "Ulwe");
        assert_eq!(form.cities, vec!["Pune", "Ulwe"]);
        assert_eq!(form.postal_codes, vec!["410206", "410207"]);
    }

    #[test]
    fn test_account_messages() {
        assert_eq!(account_success_message("address-deleted"), "Address deleted.");
        assert_eq!(
            account_error_message("phone"),
            "Enter a valid 10-digit mobile number."
        );
    }
}
