use crate::domain::model::{BatchResult, CaseRecord};
use crate::domain::ports::Storage;
use crate::report::html;
use crate::utils::error::{ConsultaError, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;
use zip::write::{FileOptions, ZipWriter};

/// Output formats. For a printable document use `Html`; PDF is not produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Printed to stdout, never written.
    Text,
    Json,
    Html,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
            ExportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ConsultaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            "html" => Ok(ExportFormat::Html),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ConsultaError::InvalidConfigValueError {
                field: "output.formats".to_string(),
                value: other.to_string(),
                reason: "Allowed formats: text, json, html, csv".to_string(),
            }),
        }
    }
}

/// `expediente_2-12345-2024` for `2-12345/2024`.
pub fn case_file_stem(iue: &str) -> String {
    format!("expediente_{}", file_safe(&iue.replace('/', "-").replace(' ', "")))
}

pub fn batch_file_stem(venue: &str, start: u64, end: u64, year: u16) -> String {
    format!("expedientes_{}_{}_a_{}_{}", file_safe(venue), start, end, year)
}

/// Stems are joined onto the output directory, so they must stay a single
/// path component.
fn file_safe(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// Something that can be exported: one case or a whole batch.
pub enum Report<'a> {
    Case(&'a CaseRecord),
    Batch(&'a BatchResult),
}

impl Report<'_> {
    pub fn file_stem(&self) -> String {
        match self {
            Report::Case(record) => case_file_stem(&record.identifier),
            Report::Batch(batch) => {
                batch_file_stem(&batch.venue, batch.start, batch.end, batch.year)
            }
        }
    }

    pub fn render(&self, format: ExportFormat, generated_at: &str) -> Result<Vec<u8>> {
        let bytes = match (format, self) {
            (ExportFormat::Text, report) => report.render_text().into_bytes(),
            (ExportFormat::Json, Report::Case(record)) => serde_json::to_vec_pretty(record)?,
            (ExportFormat::Json, Report::Batch(batch)) => serde_json::to_vec_pretty(batch)?,
            (ExportFormat::Html, Report::Case(record)) => {
                html::render_case(record, generated_at).into_bytes()
            }
            (ExportFormat::Html, Report::Batch(batch)) => {
                html::render_batch(batch, generated_at).into_bytes()
            }
            (ExportFormat::Csv, report) => report.render_csv()?,
        };
        Ok(bytes)
    }

    pub fn render_text(&self) -> String {
        match self {
            Report::Case(record) => {
                let mut out = format!(
                    "Expediente:        {}\nOrigen:            {}\nCarátula:          {}\nPrimer movimiento: {}\n",
                    record.identifier, record.origin, record.title, record.first_movement
                );
                if !record.movements.is_empty() {
                    out.push_str(&format!("Movimientos:       {}\n", record.movements.len()));
                }
                for url in &record.movement_urls {
                    out.push_str(&format!("  - {}\n", url));
                }
                out
            }
            Report::Batch(batch) => {
                let mut out = String::new();
                for entry in &batch.entries {
                    out.push_str(&format!(
                        "{:<16} | {:<30} | {:<40} | {}\n",
                        entry.identifier(),
                        entry.origin(),
                        entry.title(),
                        entry.first_movement()
                    ));
                }
                out.push_str(&format!(
                    "{} case files, {} failed\n",
                    batch.entries.len(),
                    batch.failed_count()
                ));
                out
            }
        }
    }

    fn render_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["expediente", "origen", "caratula", "primer_movimiento", "estado"])?;
        match self {
            Report::Case(record) => {
                writer.write_record([
                    record.identifier.as_str(),
                    record.origin.as_str(),
                    record.title.as_str(),
                    record.first_movement.as_str(),
                    "ok",
                ])?;
            }
            Report::Batch(batch) => {
                for entry in &batch.entries {
                    let status = if entry.is_failed() { "error" } else { "ok" };
                    writer.write_record([
                        entry.identifier(),
                        entry.origin(),
                        entry.title(),
                        entry.first_movement(),
                        status,
                    ])?;
                }
            }
        }
        writer
            .into_inner()
            .map_err(|e| ConsultaError::IoError(e.into_error()))
    }
}

/// Writes the report in every non-text format, or a single ZIP holding all of
/// them when `bundle` is set. Returns the written file names.
pub async fn write_exports<S: Storage>(
    storage: &S,
    report: &Report<'_>,
    formats: &[ExportFormat],
    bundle: bool,
    generated_at: &str,
) -> Result<Vec<String>> {
    let stem = report.file_stem();
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    for format in formats.iter().copied().filter(|f| *f != ExportFormat::Text) {
        let name = format!("{}.{}", stem, format.extension());
        if files.iter().any(|(n, _)| *n == name) {
            continue;
        }
        files.push((name, report.render(format, generated_at)?));
    }

    if files.is_empty() {
        return Ok(Vec::new());
    }

    if bundle {
        let name = format!("{}.zip", stem);
        let data = zip_files(&files)?;
        tracing::debug!("Writing ZIP bundle {} ({} bytes)", name, data.len());
        storage.write_file(&name, &data).await?;
        return Ok(vec![name]);
    }

    let mut written = Vec::with_capacity(files.len());
    for (name, data) in files {
        storage.write_file(&name, &data).await?;
        written.push(name);
    }
    Ok(written)
}

fn zip_files(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in files {
        zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
        zip.write_all(data)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
