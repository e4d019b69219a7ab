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

/// Formats a timestamp as a short order date, e.g. "01 Aug 2026".
///
/// Usage in templates: `{{ order.created_at|order_date }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn order_date(value: &DateTime<Utc>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.format("%d %b %Y").to_string())
}

