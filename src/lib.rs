//! Client for the judicial case-tracking service: looks up case files by
//! IUE, one at a time or over a numeric range, and exports the results.
//!
//! Exports are HTML, JSON and CSV, optionally bundled into a ZIP. There is no
//! PDF output; the HTML export is self-contained and is the one meant for
//! printing.

pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, Command};
pub use config::Settings;

pub use adapters::{LocalStorage, SoapCaseService};
pub use app::{ConsultaEngine, Outcome};
pub use core::{batch::BatchOrchestrator, fetcher::CaseFetcher, iue::normalize};
pub use domain::model::{
    BatchEntry, BatchResult, CaseIdentifier, CaseRecord, Movement, MovementLink,
};
pub use utils::error::{ConsultaError, Result};
