use crate::config::toml_config::TomlConfig;
use crate::config::{parse_formats, Settings};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "consulta-iue")]
#[command(about = "Query the judicial case-tracking service by IUE")]
pub struct CliConfig {
    /// WSDL of the case-tracking SOAP service
    #[arg(long)]
    pub wsdl: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Output formats: text, json, html, csv
    #[arg(long = "format", value_delimiter = ',')]
    pub formats: Vec<String>,

    /// Write a single ZIP with every export instead of loose files
    #[arg(long)]
    pub bundle: bool,

    #[arg(long)]
    pub max_parallel: Option<usize>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Look up one case file, e.g. `consultar "2-12345/2024"`
    Consultar { iue: String },

    /// Look up a range of case numbers for one venue and year
    Lote {
        #[arg(long)]
        sede: String,
        #[arg(long, default_value_t = 1)]
        desde: u64,
        #[arg(long, default_value_t = 30)]
        hasta: u64,
        #[arg(long, default_value_t = 2024)]
        anio: u16,
    },
}

impl CliConfig {
    /// Defaults, overlaid by the TOML file (if any), overlaid by flags.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::default();
        if let Some(path) = &self.config {
            settings.apply_toml(&TomlConfig::from_file(path)?)?;
        }

        if let Some(wsdl) = &self.wsdl {
            settings.wsdl_url = wsdl.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.timeout_seconds = timeout;
        }
        if let Some(max_parallel) = self.max_parallel {
            settings.max_parallel = max_parallel;
        }
        if let Some(path) = &self.output_path {
            settings.output_path = path.clone();
        }
        if !self.formats.is_empty() {
            settings.formats = parse_formats(&self.formats)?;
        }
        settings.bundle |= self.bundle;
        settings.json_logs |= self.json_logs;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ExportFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_single_lookup() {
        let cli = CliConfig::parse_from(["consulta-iue", "consultar", "2-12345/2024"]);
        assert!(matches!(cli.command, Command::Consultar { ref iue } if iue == "2-12345/2024"));
        assert_eq!(cli.settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_parse_batch_defaults() {
        let cli = CliConfig::parse_from(["consulta-iue", "lote", "--sede", "2"]);
        match cli.command {
            Command::Lote {
                sede,
                desde,
                hasta,
                anio,
            } => {
                assert_eq!(sede, "2");
                assert_eq!((desde, hasta, anio), (1, 30, 2024));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_flags_override_toml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[batch]\nmax_parallel = 8\n[output]\nformats = [\"html\"]\n")
            .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = CliConfig::parse_from([
            "consulta-iue",
            "--config",
            path.as_str(),
            "--format",
            "json,csv",
            "lote",
            "--sede",
            "2",
        ]);
        let settings = cli.settings().unwrap();

        assert_eq!(settings.max_parallel, 8);
        assert_eq!(settings.formats, vec![ExportFormat::Json, ExportFormat::Csv]);
    }
}
