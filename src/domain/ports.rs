use crate::domain::raw::RawResponse;
use crate::utils::error::Result;
use async_trait::async_trait;

/// The remote `consultaIUE` operation.
///
/// `Ok(None)` means the service answered but has nothing for that identifier.
/// Implementations must tolerate concurrent calls from several tasks.
#[async_trait]
pub trait CaseService: Send + Sync {
    async fn consulta_iue(&self, iue: &str) -> Result<Option<RawResponse>>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn wsdl_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn max_parallel(&self) -> usize;
    fn output_path(&self) -> &str;
}
