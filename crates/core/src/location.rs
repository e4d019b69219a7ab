//! Serviceable locations and address validation.
//!
//! The store only delivers to an admin-curated set of (state, city,
//! postal code) paths. The backend serves that set in two shapes: flat
//! [`LocationRecord`] rows for admin management, and a nested
//! state → city → postal-codes map for checkout, which deserializes
//! straight into [`LocationDirectory`].
//!
//! The checkout form narrows its dropdowns from the directory, but the
//! narrowing is a convenience only. [`AddressDraft::validate`] is the
//! authoritative check and runs server-side on every new address.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::LocationId;

/// One serviceable city as managed in the admin panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    #[serde(rename = "_id")]
    pub id: LocationId,
    pub state: String,
    pub city: String,
    pub postal_codes: Vec<String>,
}

/// The full serviceable-location table, keyed state → city → postal codes.
///
/// Serializes as the nested JSON map the backend's public locations
/// endpoint returns. Sorted maps keep dropdown ordering stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationDirectory {
    states: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl LocationDirectory {
    /// An empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from admin records.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = LocationRecord>,
    {
        let mut directory = Self::new();
        for record in records {
            directory.insert(record.state, record.city, record.postal_codes);
        }
        directory
    }

    /// Add a city and its postal codes, merging into any existing entry.
    pub fn insert(&mut self, state: String, city: String, postal_codes: Vec<String>) {
        self.states
            .entry(state)
            .or_default()
            .entry(city)
            .or_default()
            .extend(postal_codes);
    }

    /// Whether the table has no serviceable locations at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All serviceable states, sorted.
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    /// Cities serviceable within a state, sorted. Empty for unknown states.
    #[must_use]
    pub fn cities(&self, state: &str) -> Vec<&str> {
        self.states
            .get(state)
            .map(|cities| cities.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Postal codes serviceable within a city, sorted. Empty for unknown
    /// state/city pairs.
    #[must_use]
    pub fn postal_codes(&self, state: &str, city: &str) -> Vec<&str> {
        self.states
            .get(state)
            .and_then(|cities| cities.get(city))
            .map(|codes| codes.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether (state, city, postal code) is a serviceable path.
    #[must_use]
    pub fn contains(&self, state: &str, city: &str, postal_code: &str) -> bool {
        self.states
            .get(state)
            .and_then(|cities| cities.get(city))
            .is_some_and(|codes| codes.contains(postal_code))
    }
}

/// Errors from validating a new-address submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// A required field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The phone number is not a ten-digit mobile number.
    #[error("phone number must be 10 digits")]
    InvalidPhone,

    /// The (state, city, postal code) triple is not in the serviceable
    /// set, even if each value exists somewhere in the table.
    #[error("{city}, {state} {postal_code} is not a serviceable location")]
    InvalidLocation {
        state: String,
        city: String,
        postal_code: String,
    },
}

/// A new address as submitted from the checkout or profile form, before
/// the backend has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDraft {
    /// Address label ("Home", "Work", ...). Stored as `type` on the wire.
    #[serde(rename = "type")]
    pub label: String,
    pub street: String,
    pub country: String,
    pub phone_number: String,
    pub state: String,
    pub city: String,
    pub postal_code: String,
}

impl AddressDraft {
    /// Validate the draft against required fields and the serviceable
    /// location table.
    ///
    /// # Errors
    ///
    /// Returns the first failure found: a blank field, a malformed phone
    /// number, or a location path the store does not deliver to.
    pub fn validate(&self, locations: &LocationDirectory) -> Result<(), AddressError> {
        for (value, name) in [
            (&self.label, "address type"),
            (&self.street, "street"),
            (&self.country, "country"),
            (&self.phone_number, "phone number"),
            (&self.state, "state"),
            (&self.city, "city"),
            (&self.postal_code, "postal code"),
        ] {
            if value.trim().is_empty() {
                return Err(AddressError::MissingField(name));
            }
        }

        let phone = self.phone_number.trim();
        if phone.len() != 10 || !phone.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AddressError::InvalidPhone);
        }

        if !locations.contains(
            self.state.trim(),
            self.city.trim(),
            self.postal_code.trim(),
        ) {
            return Err(AddressError::InvalidLocation {
                state: self.state.trim().to_owned(),
                city: self.city.trim().to_owned(),
                postal_code: self.postal_code.trim().to_owned(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn directory() -> LocationDirectory {
        LocationDirectory::from_records([
            LocationRecord {
                id: LocationId::new("loc1"),
                state: "Maharashtra".to_string(),
                city: "Ulwe".to_string(),
                postal_codes: vec!["410206".to_string()],
            },
            LocationRecord {
                id: LocationId::new("loc2"),
                state: "Maharashtra".to_string(),
                city: "Panvel".to_string(),
                postal_codes: vec!["410221".to_string()],
            },
            LocationRecord {
                id: LocationId::new("loc3"),
                state: "Gujarat".to_string(),
                city: "Surat".to_string(),
                postal_codes: vec!["395003".to_string(), "395007".to_string()],
            },
        ])
    }

    fn valid_draft() -> AddressDraft {
        AddressDraft {
            label: "Home".to_string(),
            street: "14 Palm Avenue".to_string(),
            country: "India".to_string(),
            phone_number: "9876543210".to_string(),
            state: "Maharashtra".to_string(),
            city: "Ulwe".to_string(),
            postal_code: "410206".to_string(),
        }
    }

    #[test]
    fn test_state_narrows_cities() {
        let dir = directory();
        assert_eq!(dir.cities("Maharashtra"), vec!["Panvel", "Ulwe"]);
        assert_eq!(dir.cities("Gujarat"), vec!["Surat"]);
        assert!(dir.cities("Kerala").is_empty());
    }

    #[test]
    fn test_city_narrows_postal_codes() {
        let dir = directory();
        assert_eq!(dir.postal_codes("Maharashtra", "Ulwe"), vec!["410206"]);
        assert_eq!(
            dir.postal_codes("Gujarat", "Surat"),
            vec!["395003", "395007"]
        );
        // City exists, but under a different state.
        assert!(dir.postal_codes("Gujarat", "Ulwe").is_empty());
    }

    #[test]
    fn test_contains_requires_full_path() {
        let dir = directory();
        assert!(dir.contains("Maharashtra", "Ulwe", "410206"));
        // Every value exists somewhere, but not as one path.
        assert!(!dir.contains("Maharashtra", "Surat", "395003"));
        assert!(!dir.contains("Maharashtra", "Ulwe", "395003"));
    }

    #[test]
    fn test_merge_duplicate_city_records() {
        let mut dir = directory();
        dir.insert(
            "Maharashtra".to_string(),
            "Ulwe".to_string(),
            vec!["410207".to_string(), "410206".to_string()],
        );
        assert_eq!(
            dir.postal_codes("Maharashtra", "Ulwe"),
            vec!["410206", "410207"]
        );
    }

    #[test]
    fn test_nested_wire_shape() {
        let dir = directory();
        let json = serde_json::to_value(&dir).unwrap();
        assert_eq!(json["Maharashtra"]["Ulwe"][0], "410206");

        let back: LocationDirectory = serde_json::from_value(json).unwrap();
        assert_eq!(back, dir);
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(valid_draft().validate(&directory()).is_ok());
    }

    #[test]
    fn test_blank_fields_rejected() {
        let mut draft = valid_draft();
        draft.street = "   ".to_string();
        assert_eq!(
            draft.validate(&directory()),
            Err(AddressError::MissingField("street"))
        );
    }

    #[test]
    fn test_phone_must_be_ten_digits() {
        let mut draft = valid_draft();
        draft.phone_number = "12345".to_string();
        assert_eq!(draft.validate(&directory()), Err(AddressError::InvalidPhone));

        draft.phone_number = "98765O3210".to_string();
        assert_eq!(draft.validate(&directory()), Err(AddressError::InvalidPhone));
    }

    #[test]
    fn test_unknown_location_rejected_despite_valid_fields() {
        let mut draft = valid_draft();
        draft.city = "Pune".to_string();
        assert!(matches!(
            draft.validate(&directory()),
            Err(AddressError::InvalidLocation { .. })
        ));
    }

    #[test]
    fn test_draft_wire_field_names() {
        let json = serde_json::to_value(valid_draft()).unwrap();
        assert_eq!(json["type"], "Home");
        assert_eq!(json["phoneNumber"], "9876543210");
        assert_eq!(json["postalCode"], "410206");
    }
}
