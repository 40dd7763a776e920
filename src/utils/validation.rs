use crate::utils::error::{ConsultaError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Largest accepted `end - start` for a batch lookup.
pub const MAX_BATCH_SPAN: u64 = 50;

static DISPLAY_IUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}\s*-\s*\d+\s*/\s*\d{4}$").expect("static regex"));

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Boundary check for a single lookup, run before the fetcher sees the input.
/// Returns the trimmed input on success.
pub fn validate_iue_input(input: &str) -> Result<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ConsultaError::validation("an IUE is required"));
    }
    if !DISPLAY_IUE.is_match(trimmed) {
        return Err(ConsultaError::validation(
            "invalid IUE format, expected: Sede - NroRegistro / Año",
        ));
    }
    Ok(trimmed)
}

/// Boundary check for a batch lookup: `end >= start` and at most
/// [`MAX_BATCH_SPAN`] between them.
pub fn validate_batch_range(start: u64, end: u64) -> Result<()> {
    if end < start {
        return Err(ConsultaError::validation(
            "the final number must be greater than or equal to the initial one",
        ));
    }
    if end - start > MAX_BATCH_SPAN {
        return Err(ConsultaError::validation(format!(
            "at most {} case files can be queried at once",
            MAX_BATCH_SPAN
        )));
    }
    Ok(())
}

/// Boundary check for the venue of a batch lookup. The venue ends up in
/// upstream identifiers and export file names, so only letters and digits pass.
pub fn validate_venue(venue: &str) -> Result<&str> {
    let trimmed = venue.trim();
    if trimmed.is_empty() {
        return Err(ConsultaError::validation("a venue is required"));
    }
    if !trimmed.chars().all(char::is_alphanumeric) {
        return Err(ConsultaError::validation(format!(
            "invalid venue '{}', expected letters and digits only",
            trimmed
        )));
    }
    Ok(trimmed)
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ConsultaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ConsultaError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ConsultaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ConsultaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ConsultaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ConsultaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
