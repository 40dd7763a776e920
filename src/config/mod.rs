#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::soap::DEFAULT_WSDL;
use crate::core::batch::DEFAULT_MAX_PARALLEL;
use crate::core::ConfigProvider;
use crate::report::ExportFormat;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_range, validate_url, Validate};
use toml_config::TomlConfig;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_OUTPUT_PATH: &str = "./output";

/// Effective settings: defaults, then the TOML file, then command line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub wsdl_url: String,
    pub timeout_seconds: u64,
    pub max_parallel: usize,
    pub output_path: String,
    pub formats: Vec<ExportFormat>,
    pub bundle: bool,
    pub json_logs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wsdl_url: DEFAULT_WSDL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_parallel: DEFAULT_MAX_PARALLEL,
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            formats: vec![ExportFormat::Text],
            bundle: false,
            json_logs: false,
        }
    }
}

impl Settings {
    pub fn apply_toml(&mut self, toml: &TomlConfig) -> Result<()> {
        if let Some(wsdl) = &toml.service.wsdl {
            self.wsdl_url = wsdl.clone();
        }
        if let Some(timeout) = toml.service.timeout_seconds {
            self.timeout_seconds = timeout;
        }
        if let Some(max_parallel) = toml.batch.max_parallel {
            self.max_parallel = max_parallel;
        }
        if let Some(path) = &toml.output.path {
            self.output_path = path.clone();
        }
        if let Some(formats) = &toml.output.formats {
            self.formats = parse_formats(formats)?;
        }
        if let Some(bundle) = toml.output.bundle {
            self.bundle = bundle;
        }
        if let Some(json) = toml.logging.json {
            self.json_logs = json;
        }
        Ok(())
    }

    pub fn writes_files(&self) -> bool {
        self.formats.iter().any(|f| *f != ExportFormat::Text)
    }
}

pub fn parse_formats(formats: &[String]) -> Result<Vec<ExportFormat>> {
    formats.iter().map(|f| f.parse()).collect()
}

impl ConfigProvider for Settings {
    fn wsdl_url(&self) -> &str {
        &self.wsdl_url
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("service.wsdl", &self.wsdl_url)?;
        validate_range("service.timeout_seconds", self.timeout_seconds, 1, 600)?;
        validate_range("batch.max_parallel", self.max_parallel, 1, 50)?;
        validate_path("output.path", &self.output_path)?;
        Ok(())
    }
}
