use crate::core::extractor::extract;
use crate::core::iue::normalize;
use crate::domain::model::CaseRecord;
use crate::domain::ports::CaseService;
use crate::utils::error::{ConsultaError, Result};
use std::sync::Arc;

/// Looks up one case: normalize, call upstream, extract.
pub struct CaseFetcher<S: CaseService + ?Sized> {
    service: Arc<S>,
}

impl<S: CaseService + ?Sized> Clone for CaseFetcher<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S: CaseService + ?Sized> CaseFetcher<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Errors are always one of Format, ServiceFault or Unexpected. Connection
    /// errors happen earlier, when the service itself is built.
    pub async fn fetch(&self, raw_identifier: &str) -> Result<CaseRecord> {
        let identifier = normalize(raw_identifier).inspect_err(|e| {
            tracing::error!("Format error in IUE '{}': {}", raw_identifier, e);
        })?;

        let iue = identifier.to_string();
        tracing::debug!("Querying case file with IUE: {}", iue);

        match self.service.consulta_iue(&iue).await {
            Ok(response) => {
                tracing::debug!("Response for {}: {:?}", iue, response);
                Ok(extract(&identifier, response))
            }
            Err(ConsultaError::ServiceFault { message }) => {
                tracing::error!("SOAP fault for IUE '{}': {}", iue, message);
                Err(ConsultaError::ServiceFault { message })
            }
            Err(other) => {
                tracing::error!("Unexpected error querying IUE '{}': {}", iue, other);
                Err(ConsultaError::Unexpected {
                    detail: other.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extractor::NOT_FOUND_TITLE;
    use crate::domain::raw::RawResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    enum Reply {
        Found,
        NotFound,
        Fault,
        Broken,
    }

    struct StubService {
        reply: Reply,
        seen: Mutex<Vec<String>>,
    }

    impl StubService {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CaseService for StubService {
        async fn consulta_iue(&self, iue: &str) -> Result<Option<RawResponse>> {
            self.seen.lock().unwrap().push(iue.to_string());
            match self.reply {
                Reply::Found => Ok(Some(RawResponse {
                    origin: Some("Juzgado Letrado de Primera Instancia".to_string()),
                    title: Some("AA c/ BB - Daños".to_string()),
                    ..Default::default()
                })),
                Reply::NotFound => Ok(None),
                Reply::Fault => Err(ConsultaError::ServiceFault {
                    message: "IUE inexistente".to_string(),
                }),
                Reply::Broken => Err(ConsultaError::IoError(std::io::Error::other(
                    "connection reset by 10.1.2.3",
                ))),
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_sends_normalized_identifier() {
        let service = StubService::new(Reply::Found);
        let fetcher = CaseFetcher::new(service.clone());

        let record = fetcher.fetch(" 2 - 345 / 2024").await.unwrap();

        assert_eq!(service.seen.lock().unwrap().as_slice(), ["2-345/2024"]);
        assert_eq!(record.identifier, "2-345/2024");
        assert_eq!(record.title, "AA c/ BB - Daños");
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_a_record() {
        let fetcher = CaseFetcher::new(StubService::new(Reply::NotFound));
        let record = fetcher.fetch("2-345/2024").await.unwrap();
        assert_eq!(record.title, NOT_FOUND_TITLE);
    }

    #[tokio::test]
    async fn test_fetch_bad_identifier_never_reaches_service() {
        let service = StubService::new(Reply::Found);
        let fetcher = CaseFetcher::new(service.clone());

        let err = fetcher.fetch("2-345").await.unwrap_err();

        assert!(matches!(err, ConsultaError::Format { .. }));
        assert!(service.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_propagates_service_fault() {
        let fetcher = CaseFetcher::new(StubService::new(Reply::Fault));
        let err = fetcher.fetch("2-345/2024").await.unwrap_err();
        assert_eq!(err.to_string(), "query failed: IUE inexistente");
    }

    #[tokio::test]
    async fn test_fetch_hides_unexpected_detail() {
        let fetcher = CaseFetcher::new(StubService::new(Reply::Broken));
        let err = fetcher.fetch("2-345/2024").await.unwrap_err();
        match &err {
            ConsultaError::Unexpected { detail } => assert!(detail.contains("10.1.2.3")),
            other => panic!("expected unexpected error, got {:?}", other),
        }
        assert!(!err.to_string().contains("10.1.2.3"));
        assert!(err.to_string().contains("try again later"));
    }
}
