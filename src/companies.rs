use crate::models::Company;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

pub const VALID_BOOKING_URL: &str = "https://www.booking.com/hotel/es";

#[derive(Debug, Deserialize)]
struct CompanyRecord {
    #[serde(rename = "Código NIF")]
    nif: String,
    #[serde(rename = "Dirección web", default)]
    web: Option<String>,
    #[serde(rename = "BOOKING", default)]
    booking: Option<String>,
    #[serde(rename = "GOOGLE", default)]
    google: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn load_companies(input_path: &Path) -> Result<Vec<Company>> {
    let file = File::open(input_path)
        .with_context(|| format!("Failed to open company listing: {}", input_path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut companies = Vec::new();
    for (line, result) in reader.deserialize::<CompanyRecord>().enumerate() {
        let record = result.with_context(|| {
            format!("Invalid row {} in {}", line + 2, input_path.display())
        })?;
        companies.push(Company {
            nif: record.nif.trim().to_string(),
            web: non_empty(record.web),
            booking: non_empty(record.booking),
            google: non_empty(record.google),
        });
    }

    info!("Loaded {} companies from {}", companies.len(), input_path.display());
    Ok(companies)
}

/// Rejects duplicated NIFs, fixes up URLs and sorts the listing by NIF.
pub fn sanity_check(mut companies: Vec<Company>) -> Result<Vec<Company>> {
    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = companies
        .iter()
        .filter(|c| !seen.insert(c.nif.as_str()))
        .map(|c| c.nif.as_str())
        .collect();
    if !duplicates.is_empty() {
        bail!(
            "Duplicated NIFs in the company listing, please review it: {}",
            duplicates.join(", ")
        );
    }

    for company in companies.iter_mut() {
        if let Some(url) = &company.booking {
            if !url.starts_with(VALID_BOOKING_URL) {
                warn!("{} has an invalid Booking URL - removing it ({})", company.nif, url);
                company.booking = None;
            }
        }

        if let Some(url) = &company.web {
            if !url.starts_with("http") {
                warn!("{} has an invalid company URL - prefixing https://", company.nif);
                company.web = Some(format!("https://{}", url));
            }
        }
    }

    companies.sort_by(|a, b| a.nif.cmp(&b.nif));
    Ok(companies)
}
