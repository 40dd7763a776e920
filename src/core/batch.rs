use crate::core::fetcher::CaseFetcher;
use crate::domain::model::{BatchEntry, BatchResult};
use crate::domain::ports::CaseService;
use crate::utils::error::{ConsultaError, Result};
use crate::utils::validation::validate_batch_range;
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const DEFAULT_MAX_PARALLEL: usize = 5;

static SEQUENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\s*(\d+)\s*/").expect("static regex"));

/// Fetches a contiguous range of identifiers with bounded parallelism.
pub struct BatchOrchestrator<S: CaseService + ?Sized + 'static> {
    fetcher: CaseFetcher<S>,
    max_parallel: usize,
}

impl<S: CaseService + ?Sized + 'static> BatchOrchestrator<S> {
    pub fn new(fetcher: CaseFetcher<S>) -> Self {
        Self::with_max_parallel(fetcher, DEFAULT_MAX_PARALLEL)
    }

    pub fn with_max_parallel(fetcher: CaseFetcher<S>, max_parallel: usize) -> Self {
        Self {
            fetcher,
            max_parallel: max_parallel.max(1),
        }
    }

    /// One entry per number in `start..=end`, sorted by sequence number.
    /// Per-item failures become [`BatchEntry::Failed`]; only an invalid range
    /// fails the whole call.
    pub async fn fetch_range(
        &self,
        venue: &str,
        start: u64,
        end: u64,
        year: u16,
    ) -> Result<BatchResult> {
        validate_batch_range(start, end)?;

        let started = Instant::now();
        let total = (end - start + 1) as usize;
        tracing::info!(
            "🔎 Batch lookup {}-[{}..{}]/{} ({} files, {} in parallel)",
            venue,
            start,
            end,
            year,
            total,
            self.max_parallel
        );

        let sem = Arc::new(Semaphore::new(self.max_parallel));
        let mut join_set = JoinSet::new();
        let requested: Vec<String> = (start..=end)
            .map(|n| format!("{}-{}/{}", venue, n, year))
            .collect();

        for iue in requested.iter().cloned() {
            let permit = Arc::clone(&sem)
                .acquire_owned()
                .await
                .map_err(|e| ConsultaError::Unexpected {
                    detail: e.to_string(),
                })?;
            let fetcher = self.fetcher.clone();
            join_set.spawn(async move {
                let _permit = permit;
                match fetcher.fetch(&iue).await {
                    Ok(record) => BatchEntry::Found(record),
                    Err(e) => {
                        tracing::error!("Error querying {}: {}", iue, e);
                        BatchEntry::Failed {
                            identifier: iue,
                            message: e.to_string(),
                        }
                    }
                }
            });
        }

        let mut entries = Vec::with_capacity(total);
        while let Some(res) = join_set.join_next().await {
            match res {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::error!("Batch task did not finish: {}", e),
            }
        }

        // A task that panicked left no entry; give it a placeholder.
        if entries.len() < total {
            let seen: HashSet<String> = entries
                .iter()
                .map(|e| e.identifier().to_string())
                .collect();
            for iue in requested.into_iter().filter(|iue| !seen.contains(iue)) {
                entries.push(BatchEntry::Failed {
                    identifier: iue,
                    message: "the lookup task was aborted".to_string(),
                });
            }
        }

        entries.sort_by_key(|e| sequence_of(e.identifier()));

        let result = BatchResult {
            venue: venue.to_string(),
            start,
            end,
            year,
            entries,
        };
        tracing::info!(
            "✅ Batch finished in {:?}: {} found, {} failed",
            started.elapsed(),
            result.entries.len() - result.failed_count(),
            result.failed_count()
        );
        Ok(result)
    }
}

fn sequence_of(identifier: &str) -> u64 {
    SEQUENCE
        .captures(identifier)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::raw::RawResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fails for the listed identifiers and tracks peak concurrency.
    struct MockService {
        failing: Vec<&'static str>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl MockService {
        fn new(failing: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                failing,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CaseService for MockService {
        async fn consulta_iue(&self, iue: &str) -> Result<Option<RawResponse>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            // Later numbers finish first so completion order differs from range order.
            let n = sequence_of(iue);
            tokio::time::sleep(Duration::from_millis(40u64.saturating_sub(n * 3))).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.iter().any(|f| *f == iue) {
                return Err(ConsultaError::ServiceFault {
                    message: format!("no such file {}", iue),
                });
            }
            Ok(Some(RawResponse {
                origin: Some("Juzgado".to_string()),
                title: Some(format!("Caso {}", iue)),
                ..Default::default()
            }))
        }
    }

    #[tokio::test]
    async fn test_failures_become_placeholders_in_sorted_order() {
        let service = MockService::new(vec!["1-2/2024", "1-4/2024"]);
        let orchestrator = BatchOrchestrator::new(CaseFetcher::new(service));

        let result = orchestrator.fetch_range("1", 1, 5, 2024).await.unwrap();

        let ids: Vec<&str> = result.entries.iter().map(|e| e.identifier()).collect();
        assert_eq!(
            ids,
            vec!["1-1/2024", "1-2/2024", "1-3/2024", "1-4/2024", "1-5/2024"]
        );
        assert_eq!(result.failed_count(), 2);
        assert_eq!(result.entries[1].origin(), "error");
        assert_eq!(result.entries[1].title(), "query failed: no such file 1-2/2024");
        assert_eq!(result.entries[2].title(), "Caso 1-3/2024");
    }

    #[tokio::test]
    async fn test_parallelism_is_bounded() {
        let service = MockService::new(vec![]);
        let orchestrator =
            BatchOrchestrator::with_max_parallel(CaseFetcher::new(service.clone()), 3);

        let result = orchestrator.fetch_range("7", 1, 12, 2023).await.unwrap();

        assert_eq!(result.entries.len(), 12);
        assert_eq!(service.calls.load(Ordering::SeqCst), 12);
        assert!(service.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_span_of_fifty_is_accepted() {
        let service = MockService::new(vec![]);
        let orchestrator = BatchOrchestrator::with_max_parallel(CaseFetcher::new(service), 10);

        let result = orchestrator.fetch_range("3", 100, 150, 2024).await.unwrap();

        assert_eq!(result.entries.len(), 51);
        assert_eq!(result.entries[0].identifier(), "3-100/2024");
        assert_eq!(result.entries[50].identifier(), "3-150/2024");
    }

    #[tokio::test]
    async fn test_invalid_range_dispatches_nothing() {
        let service = MockService::new(vec![]);
        let orchestrator = BatchOrchestrator::new(CaseFetcher::new(service.clone()));

        assert!(orchestrator.fetch_range("3", 100, 151, 2024).await.is_err());
        assert!(orchestrator.fetch_range("3", 10, 9, 2024).await.is_err());
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_parallelism_is_raised_to_one() {
        let service = MockService::new(vec![]);
        let orchestrator =
            BatchOrchestrator::with_max_parallel(CaseFetcher::new(service.clone()), 0);
        let result = orchestrator.fetch_range("1", 1, 3, 2024).await.unwrap();
        assert_eq!(result.entries.len(), 3);
        assert_eq!(service.peak.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sequence_of() {
        assert_eq!(sequence_of("2-345/2024"), 345);
        assert_eq!(sequence_of("2 - 7 / 2024"), 7);
        assert_eq!(sequence_of("garbage"), u64::MAX);
    }
}
