//! Serviceable-location management handlers.
//!
//! Checkout only accepts addresses on paths in this table, so this page
//! is where the delivery area actually gets defined. Records are flat
//! state/city/postal-code rows; the storefront consumes the same data
//! as a nested directory.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use fortynine_core::api::SaveLocationRequest;
use fortynine_core::location::LocationRecord;
use fortynine_core::types::LocationId;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentAdmin;
use crate::routes::orders::url_escape;
use crate::state::AppState;

// =============================================================================
// Query & form types
// =============================================================================

/// Filter and feedback parameters for the location list.
#[derive(Debug, Deserialize)]
pub struct LocationsQuery {
    pub state: Option<String>,
    pub city: Option<String>,
    pub error: Option<String>,
    pub saved: Option<String>,
}

/// New or edited location form data. Postal codes arrive as one
/// comma-separated field.
#[derive(Debug, Deserialize)]
pub struct LocationForm {
    pub state: String,
    pub city: String,
    pub postal_codes: String,
}

impl LocationForm {
    /// Parse the form into a request payload.
    ///
    /// Returns `None` when a field is blank or no postal codes survive
    /// trimming.
    fn into_request(self) -> Option<SaveLocationRequest> {
        let state = self.state.trim().to_string();
        let city = self.city.trim().to_string();
        let postal_codes: Vec<String> = self
            .postal_codes
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(String::from)
            .collect();

        if state.is_empty() || city.is_empty() || postal_codes.is_empty() {
            return None;
        }

        Some(SaveLocationRequest {
            state,
            city,
            postal_codes,
        })
    }
}

/// Map an error code from the URL to staff-facing text.
fn error_message(code: &str) -> &'static str {
    match code {
        "fields" => "State, city, and at least one postal code are required.",
        _ => "Something went wrong. Please try again.",
    }
}

// =============================================================================
// Views & templates
// =============================================================================

/// One location row, with the postal codes joined for display and for
/// pre-filling the edit form.
pub struct LocationRowView {
    pub id: String,
    pub state: String,
    pub city: String,
    pub postal_codes: String,
}

impl From<&LocationRecord> for LocationRowView {
    fn from(record: &LocationRecord) -> Self {
        Self {
            id: record.id.to_string(),
            state: record.state.clone(),
            city: record.city.clone(),
            postal_codes: record.postal_codes.join(", "),
        }
    }
}

/// Location manager template.
#[derive(Template, WebTemplate)]
#[template(path = "locations/index.html")]
pub struct LocationsTemplate {
    pub admin: CurrentAdmin,
    pub records: Vec<LocationRowView>,
    /// All states with at least one record, for the filter dropdown.
    pub states: Vec<String>,
    pub state_value: String,
    pub city_value: String,
    pub error: Option<&'static str>,
    pub saved: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Trim a filter value to `None` when blank.
fn filter_value(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Display the location manager, optionally filtered by state and city.
#[instrument(skip(state, admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<LocationsQuery>,
) -> Result<LocationsTemplate> {
    let state_filter = filter_value(query.state.as_deref());
    let city_filter = filter_value(query.city.as_deref());

    let records = state
        .api()
        .filter_locations(&admin.token, state_filter, city_filter)
        .await?;

    // The filter dropdown always shows every state, not just the
    // filtered ones.
    let directory = state.api().get_locations().await?;
    let states: Vec<String> = directory.states().map(String::from).collect();

    Ok(LocationsTemplate {
        records: records.iter().map(LocationRowView::from).collect(),
        states,
        state_value: state_filter.unwrap_or_default().to_string(),
        city_value: city_filter.unwrap_or_default().to_string(),
        error: query.error.as_deref().map(error_message),
        saved: query.saved,
        admin,
    })
}

/// Add a serviceable city.
#[instrument(skip(state, admin, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<LocationForm>,
) -> Result<Redirect> {
    let Some(request) = form.into_request() else {
        return Ok(Redirect::to("/locations?error=fields"));
    };

    let record = state.api().create_location(&admin.token, &request).await?;
    tracing::info!(state = %record.state, city = %record.city, "Location added");

    Ok(Redirect::to(&format!(
        "/locations?saved={}",
        url_escape(&record.city)
    )))
}

/// Replace a location record.
#[instrument(skip(state, admin, form), fields(location = %location_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(location_id): Path<LocationId>,
    Form(form): Form<LocationForm>,
) -> Result<Redirect> {
    let Some(request) = form.into_request() else {
        return Ok(Redirect::to("/locations?error=fields"));
    };

    let record = state
        .api()
        .update_location(&admin.token, &location_id, &request)
        .await?;
    tracing::info!(state = %record.state, city = %record.city, "Location updated");

    Ok(Redirect::to(&format!(
        "/locations?saved={}",
        url_escape(&record.city)
    )))
}

/// Remove a location record. Addresses already saved against it are
/// untouched; only new checkouts are affected.
#[instrument(skip(state, admin), fields(location = %location_id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(location_id): Path<LocationId>,
) -> Result<Redirect> {
    state
        .api()
        .delete_location(&admin.token, &location_id)
        .await?;
    tracing::info!("Location removed");

    Ok(Redirect::to("/locations"))
}
