use serde::{Deserialize, Serialize};
use std::fmt;

/// A case identifier (IUE) in canonical form. Build it with
/// [`crate::core::iue::normalize`] or [`CaseIdentifier::new`].
///
/// Tokens keep the digits exactly as the user typed them, so `2-007/2024`
/// stays `2-007/2024` when sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CaseIdentifier {
    venue: String,
    sequence: String,
    year: String,
}

impl CaseIdentifier {
    pub fn new(venue: impl Into<String>, sequence: u64, year: u16) -> Self {
        Self {
            venue: venue.into(),
            sequence: sequence.to_string(),
            year: year.to_string(),
        }
    }

    /// Caller guarantees `sequence` and `year` are ASCII digits.
    pub(crate) fn from_tokens(venue: &str, sequence: &str, year: &str) -> Self {
        Self {
            venue: venue.to_string(),
            sequence: sequence.to_string(),
            year: year.to_string(),
        }
    }

    pub fn venue(&self) -> &str {
        &self.venue
    }

    /// `u64::MAX` when the sequence is too wide to fit.
    pub fn sequence_number(&self) -> u64 {
        self.sequence.parse().unwrap_or(u64::MAX)
    }

    pub fn year(&self) -> &str {
        &self.year
    }
}

impl fmt::Display for CaseIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}/{}", self.venue, self.sequence, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementLink {
    /// Name of the upstream field the URL was found in.
    pub kind: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub decree: String,
    pub expiry: String,
    pub venue: String,
    pub links: Vec<MovementLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decree_link: Option<String>,
}

impl Movement {
    pub fn has_links(&self) -> bool {
        !self.links.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub identifier: String,
    pub origin: String,
    pub title: String,
    pub first_movement: String,
    pub movement_urls: Vec<String>,
    pub movements: Vec<Movement>,
}

/// One row of a batch lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntry {
    Found(CaseRecord),
    Failed { identifier: String, message: String },
}

impl BatchEntry {
    pub fn identifier(&self) -> &str {
        match self {
            BatchEntry::Found(record) => &record.identifier,
            BatchEntry::Failed { identifier, .. } => identifier,
        }
    }

    pub fn origin(&self) -> &str {
        match self {
            BatchEntry::Found(record) => &record.origin,
            BatchEntry::Failed { .. } => "error",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            BatchEntry::Found(record) => &record.title,
            BatchEntry::Failed { message, .. } => message,
        }
    }

    pub fn first_movement(&self) -> &str {
        match self {
            BatchEntry::Found(record) => &record.first_movement,
            BatchEntry::Failed { .. } => "",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BatchEntry::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub venue: String,
    pub start: u64,
    pub end: u64,
    pub year: u16,
    pub entries: Vec<BatchEntry>,
}

impl BatchResult {
    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_failed()).count()
    }
}
