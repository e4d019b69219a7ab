//! Bulk-import serviceable locations.
//!
//! Reads a YAML file of states, cities and postal codes, authenticates
//! against the commerce API with a staff account, and creates one
//! location record per city. Cities that already exist are skipped
//! unless `--replace` is passed, in which case their postal-code lists
//! are overwritten.

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use fortynine_core::api::{AuthResponse, LoginRequest, SaveLocationRequest};
use fortynine_core::location::LocationRecord;

/// Shape of the import file.
///
/// ```yaml
/// locations:
///   - state: Maharashtra
///     city: Panvel
///     postalCodes: ["410206", "410207"]
/// ```
#[derive(Debug, Deserialize)]
struct ImportFile {
    locations: Vec<ImportEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportEntry {
    state: String,
    city: String,
    postal_codes: Vec<String>,
}

#[derive(Debug, Error)]
enum ImportError {
    #[error("{0} not set")]
    MissingEnv(&'static str),
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("invalid import file: {0}")]
    Invalid(String),
    #[error("login succeeded but the account is not a staff account")]
    NotAdmin,
    #[error("commerce API answered with {0}")]
    Status(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Parse(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Import serviceable cities from a YAML file.
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot
/// be read or validated, or the backend rejects a request.
pub async fn import(file_path: &str, replace: bool) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let base = std::env::var("COMMERCE_API_URL")
        .map_err(|_| ImportError::MissingEnv("COMMERCE_API_URL"))?;
    let base = base.trim_end_matches('/').to_owned();
    let email =
        std::env::var("ADMIN_EMAIL").map_err(|_| ImportError::MissingEnv("ADMIN_EMAIL"))?;
    let password = std::env::var("ADMIN_PASSWORD")
        .map(SecretString::from)
        .map_err(|_| ImportError::MissingEnv("ADMIN_PASSWORD"))?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(ImportError::FileNotFound(file_path.to_owned()).into());
    }

    info!(path = %file_path, "Loading locations from file");

    let content = tokio::fs::read_to_string(path).await?;
    let file: ImportFile = serde_yaml::from_str(&content)?;
    validate(&file)?;

    info!(cities = file.locations.len(), "Parsed import file");

    let client = reqwest::Client::new();
    let token = login(&client, &base, &email, &password).await?;
    let existing = fetch_existing(&client, &base, &token).await?;

    let mut created = 0usize;
    let mut replaced = 0usize;
    let mut skipped = 0usize;

    for entry in file.locations {
        let request = SaveLocationRequest {
            state: entry.state,
            city: entry.city,
            postal_codes: entry.postal_codes,
        };

        let current = existing.iter().find(|record| {
            record.state.eq_ignore_ascii_case(&request.state)
                && record.city.eq_ignore_ascii_case(&request.city)
        });

        match current {
            Some(record) if replace => {
                let response = client
                    .put(format!("{base}/api/locations/{}", record.id))
                    .bearer_auth(&token)
                    .json(&request)
                    .send()
                    .await?;
                ensure_success(&response)?;
                replaced += 1;
            }
            Some(_) => {
                warn!(city = %request.city, "City already exists, skipping (use --replace to overwrite)");
                skipped += 1;
            }
            None => {
                let response = client
                    .post(format!("{base}/api/locations"))
                    .bearer_auth(&token)
                    .json(&request)
                    .send()
                    .await?;
                ensure_success(&response)?;
                created += 1;
            }
        }
    }

    info!("Import complete!");
    info!("  Created: {created}");
    info!("  Replaced: {replaced}");
    info!("  Skipped (already exist): {skipped}");

    Ok(())
}

fn validate(file: &ImportFile) -> Result<(), ImportError> {
    if file.locations.is_empty() {
        return Err(ImportError::Invalid("no locations listed".into()));
    }
    for entry in &file.locations {
        if entry.state.trim().is_empty() || entry.city.trim().is_empty() {
            return Err(ImportError::Invalid(format!(
                "entry with empty state or city: {entry:?}"
            )));
        }
        if entry.postal_codes.is_empty() {
            return Err(ImportError::Invalid(format!(
                "{} lists no postal codes",
                entry.city
            )));
        }
        if let Some(code) = entry
            .postal_codes
            .iter()
            .find(|code| code.trim().is_empty() || !code.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(ImportError::Invalid(format!(
                "{} has a malformed postal code: {code:?}",
                entry.city
            )));
        }
    }
    Ok(())
}

async fn login(
    client: &reqwest::Client,
    base: &str,
    email: &str,
    password: &SecretString,
) -> Result<String, ImportError> {
    let response = client
        .post(format!("{base}/auth/login"))
        .json(&LoginRequest {
            email: email.to_owned(),
            password: password.expose_secret().to_owned(),
        })
        .send()
        .await?;
    ensure_success(&response)?;

    let auth: AuthResponse = response.json().await?;
    if !auth.user.is_admin {
        return Err(ImportError::NotAdmin);
    }

    info!(user = %auth.user.email, "Authenticated");
    Ok(auth.token)
}

async fn fetch_existing(
    client: &reqwest::Client,
    base: &str,
    token: &str,
) -> Result<Vec<LocationRecord>, ImportError> {
    let response = client
        .get(format!("{base}/api/locations/filter"))
        .bearer_auth(token)
        .send()
        .await?;
    ensure_success(&response)?;
    Ok(response.json().await?)
}

fn ensure_success(response: &reqwest::Response) -> Result<(), ImportError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ImportError::Status(status))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ImportFile {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn parses_camel_case_entries() {
        let file = parse(
            "locations:\n  - state: Maharashtra\n    city: Panvel\n    postalCodes: [\"410206\", \"410207\"]\n",
        );
        assert_eq!(file.locations.len(), 1);
        let entry = file.locations.first().unwrap();
        assert_eq!(entry.city, "Panvel");
        assert_eq!(entry.postal_codes, vec!["410206", "410207"]);
    }

    #[test]
    fn rejects_empty_file() {
        let file = parse("locations: []\n");
        assert!(validate(&file).is_err());
    }

    #[test]
    fn rejects_non_numeric_postal_code() {
        let file = parse(
            "locations:\n  - state: Maharashtra\n    city: Panvel\n    postalCodes: [\"41020a\"]\n",
        );
        assert!(validate(&file).is_err());
    }

    #[test]
    fn accepts_well_formed_entries() {
        let file = parse(
            "locations:\n  - state: Haryana\n    city: Gurugram\n    postalCodes: [\"122001\"]\n",
        );
        assert!(validate(&file).is_ok());
    }
}
