//! Custom Askama template filters.

use std::fmt::Display;

use chrono::{DateTime, Utc};

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a timestamp for the dashboard, e.g. "01 Aug 2026 10:15".
///
/// Usage in templates: `{{ order.placed_at|dashboard_date }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn dashboard_date(value: &DateTime<Utc>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.format("%d %b %Y %H:%M").to_string())
}
