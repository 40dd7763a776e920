use crate::core::batch::BatchOrchestrator;
use crate::core::fetcher::CaseFetcher;
use crate::core::{BatchResult, CaseRecord, CaseService, Storage};
use crate::report::{write_exports, ExportFormat, Report};
use crate::utils::error::Result;
use crate::utils::validation::{validate_batch_range, validate_iue_input, validate_venue};
use std::sync::Arc;

/// Result of a lookup plus the export files written for it.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub written: Vec<String>,
}

/// Runs lookups the way a user-facing boundary does: input checks first,
/// then the core, then exports.
pub struct ConsultaEngine<S: CaseService + ?Sized + 'static, St: Storage> {
    fetcher: CaseFetcher<S>,
    max_parallel: usize,
    storage: St,
    formats: Vec<ExportFormat>,
    bundle: bool,
}

impl<S: CaseService + ?Sized + 'static, St: Storage> ConsultaEngine<S, St> {
    pub fn new(service: Arc<S>, storage: St) -> Self {
        Self {
            fetcher: CaseFetcher::new(service),
            max_parallel: crate::core::batch::DEFAULT_MAX_PARALLEL,
            storage,
            formats: vec![ExportFormat::Text],
            bundle: false,
        }
    }

    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel;
        self
    }

    pub fn with_exports(mut self, formats: Vec<ExportFormat>, bundle: bool) -> Self {
        self.formats = formats;
        self.bundle = bundle;
        self
    }

    pub async fn consultar(&self, input: &str) -> Result<Outcome<CaseRecord>> {
        let iue = validate_iue_input(input)?;
        let record = self.fetcher.fetch(iue).await?;
        tracing::info!("✅ Case file {} retrieved", record.identifier);

        let written = self.export(&Report::Case(&record)).await?;
        Ok(Outcome {
            value: record,
            written,
        })
    }

    pub async fn lote(
        &self,
        venue: &str,
        start: u64,
        end: u64,
        year: u16,
    ) -> Result<Outcome<BatchResult>> {
        let venue = validate_venue(venue)?;
        validate_batch_range(start, end)?;

        let orchestrator =
            BatchOrchestrator::with_max_parallel(self.fetcher.clone(), self.max_parallel);
        let batch = orchestrator.fetch_range(venue, start, end, year).await?;

        let written = self.export(&Report::Batch(&batch)).await?;
        Ok(Outcome {
            value: batch,
            written,
        })
    }

    async fn export(&self, report: &Report<'_>) -> Result<Vec<String>> {
        let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
        let written = write_exports(
            &self.storage,
            report,
            &self.formats,
            self.bundle,
            &generated_at,
        )
        .await?;
        for name in &written {
            tracing::info!("📁 Export written: {}", name);
        }
        Ok(written)
    }
}
