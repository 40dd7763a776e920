use crate::domain::model::CaseIdentifier;
use crate::utils::error::{ConsultaError, Result};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[-/]\s*").expect("static regex"));

const PARSE_FAILURE: &str = "could not parse identifier";

/// Parses free-form IUE text into its canonical `<venue>-<sequence>/<year>` form.
///
/// Either separator is accepted in either position and whitespace around the
/// tokens is dropped. This is looser than the display pattern checked at the
/// boundary.
pub fn normalize(raw: &str) -> Result<CaseIdentifier> {
    let tokens: Vec<&str> = SEPARATOR.split(raw.trim()).map(str::trim).collect();
    let [venue, sequence, year] = tokens.as_slice() else {
        tracing::error!("Could not split IUE '{}' into three tokens", raw);
        return Err(ConsultaError::format(PARSE_FAILURE));
    };

    let venue_ok = !venue.is_empty() && venue.chars().all(char::is_alphanumeric);
    if !venue_ok || !is_number(sequence) || !is_number(year) {
        tracing::error!("Malformed token in IUE '{}'", raw);
        return Err(ConsultaError::format(PARSE_FAILURE));
    }

    Ok(CaseIdentifier::from_tokens(venue, sequence, year))
}

fn is_number(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for CaseIdentifier {
    type Err = ConsultaError;

    fn from_str(s: &str) -> Result<Self> {
        normalize(s)
    }
}
