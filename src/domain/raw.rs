//! Typed view of a `consultaIUE` reply before normalization.
//!
//! Every field is optional because the upstream omits whatever it has no
//! value for. Leaf elements without a known meaning are kept in `extra`
//! under their element name so link discovery still sees them.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    pub origin: Option<String>,
    pub title: Option<String>,
    pub movements: Option<RawMovements>,
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawMovements {
    /// A single entry delivered without a wrapping collection.
    Single(RawMovement),
    Many(Vec<RawMovement>),
    /// The payload could not be read as movements at all.
    Malformed(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMovement {
    pub date: Option<String>,
    pub kind: Option<String>,
    pub decree: Option<String>,
    pub expiry: Option<String>,
    pub venue: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl RawResponse {
    /// Present string fields as `(upstream name, value)`, ascending by name.
    pub fn string_fields(&self) -> Vec<(&str, &str)> {
        let known = [("caratula", &self.title), ("origen", &self.origin)];
        sorted_fields(&known, &self.extra)
    }
}

impl RawMovement {
    /// Present string fields as `(upstream name, value)`, ascending by name.
    pub fn string_fields(&self) -> Vec<(&str, &str)> {
        let known = [
            ("decreto", &self.decree),
            ("fecha", &self.date),
            ("sede", &self.venue),
            ("tipo", &self.kind),
            ("vencimiento", &self.expiry),
        ];
        sorted_fields(&known, &self.extra)
    }
}

fn sorted_fields<'a>(
    known: &[(&'a str, &'a Option<String>)],
    extra: &'a BTreeMap<String, String>,
) -> Vec<(&'a str, &'a str)> {
    let mut fields: Vec<(&str, &str)> = known
        .iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (*name, v)))
        .chain(extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));
    fields
}
