//! Turns a raw `consultaIUE` reply into a [`CaseRecord`].
//!
//! Missing data is never an error here. Absent fields become empty strings or
//! sentinels, and an absent reply is a valid "not found" record.

use crate::domain::model::{CaseIdentifier, CaseRecord, Movement, MovementLink};
use crate::domain::raw::{RawMovement, RawMovements, RawResponse};
use regex::Regex;
use std::sync::LazyLock;

pub const UNAVAILABLE: &str = "unavailable";
pub const NOT_FOUND_TITLE: &str = "no information found";
pub const NO_DATE: &str = "no date";
pub const NO_TYPE: &str = "no type";
pub const MOVEMENTS_ERROR: &str = "error processing movements";
const UNKNOWN_DATE: &str = "unknown date";
const LINK_SUFFIX: &str = " (Con enlace)";

static TOP_LEVEL_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"]+|www\.[^\s<>"]+"#).expect("static regex")
});

pub fn extract(identifier: &CaseIdentifier, response: Option<RawResponse>) -> CaseRecord {
    let Some(response) = response else {
        tracing::warn!("No data found for IUE {}", identifier);
        return CaseRecord {
            identifier: identifier.to_string(),
            origin: UNAVAILABLE.to_string(),
            title: NOT_FOUND_TITLE.to_string(),
            first_movement: UNAVAILABLE.to_string(),
            movement_urls: Vec::new(),
            movements: Vec::new(),
        };
    };

    let mut movement_urls = Vec::new();
    let (first_movement, movements) = match movement_list(response.movements.as_ref()) {
        Ok(raw_movements) => {
            let movements: Vec<Movement> =
                raw_movements.into_iter().map(Movement::from_raw).collect();
            for mov in &movements {
                let date = if mov.date.is_empty() { UNKNOWN_DATE } else { mov.date.as_str() };
                movement_urls.extend(mov.links.iter().map(|l| format!("{}: {}", date, l.url)));
            }
            (first_movement_summary(&movements), movements)
        }
        Err(payload) => {
            tracing::error!(
                "Error processing movements for IUE {}: unreadable payload {:?}",
                identifier,
                payload
            );
            (MOVEMENTS_ERROR.to_string(), Vec::new())
        }
    };

    for (name, value) in response.string_fields() {
        for url in TOP_LEVEL_URL.find_iter(value) {
            let url = url.as_str().trim_end_matches(['\'', '"', '>', '<']);
            movement_urls.push(format!("{}: {}", name, url));
        }
    }

    CaseRecord {
        identifier: identifier.to_string(),
        origin: response.origin.unwrap_or_default(),
        title: response.title.unwrap_or_default(),
        first_movement,
        movement_urls,
        movements,
    }
}

/// Flattens the single/list shapes. `Err` carries an unreadable payload.
fn movement_list(movements: Option<&RawMovements>) -> Result<Vec<&RawMovement>, &str> {
    match movements {
        None => Ok(Vec::new()),
        Some(RawMovements::Single(mov)) => Ok(vec![mov]),
        Some(RawMovements::Many(list)) => Ok(list.iter().collect()),
        Some(RawMovements::Malformed(payload)) => Err(payload.as_str()),
    }
}

impl Movement {
    pub fn from_raw(raw: &RawMovement) -> Self {
        let mut links = Vec::new();
        let mut decree_link = None;
        for (name, value) in raw.string_fields() {
            if !(value.contains("http://") || value.contains("https://")) {
                continue;
            }
            links.push(MovementLink {
                kind: name.to_string(),
                url: value.to_string(),
            });
            if is_decree_field(name) {
                decree_link = Some(value.to_string());
            }
        }

        Movement {
            date: raw.date.clone().unwrap_or_default(),
            kind: raw.kind.clone().unwrap_or_default(),
            decree: raw.decree.clone().unwrap_or_default(),
            expiry: raw.expiry.clone().unwrap_or_default(),
            venue: raw.venue.clone().unwrap_or_default(),
            links,
            decree_link,
        }
    }
}

fn is_decree_field(name: &str) -> bool {
    let name = name.to_lowercase();
    matches!(name.as_str(), "resolucion" | "sentencia") || name.contains("decreto")
}

/// Earliest movement with links, else earliest overall. Dates compare as raw
/// strings, so non-ISO formats may order unexpectedly.
fn first_movement_summary(movements: &[Movement]) -> String {
    let earliest = |linked_only: bool| {
        movements
            .iter()
            .filter(|m| !linked_only || m.has_links())
            .min_by(|a, b| a.date.cmp(&b.date))
    };

    if let Some(mov) = earliest(true) {
        return format!("{}{}", summarize(mov), LINK_SUFFIX);
    }
    match earliest(false) {
        Some(mov) => summarize(mov),
        None => UNAVAILABLE.to_string(),
    }
}

fn summarize(mov: &Movement) -> String {
    let date = if mov.date.is_empty() { NO_DATE } else { mov.date.as_str() };
    let kind = if mov.kind.is_empty() { NO_TYPE } else { mov.kind.as_str() };
    if mov.decree.is_empty() {
        format!("{}: {}", date, kind)
    } else {
        format!("{}: {} - Decreto: {}", date, kind, mov.decree)
    }
}
