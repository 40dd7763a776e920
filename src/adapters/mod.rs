// Adapters layer: concrete implementations for external systems (SOAP service, local storage).

pub mod soap;
pub mod storage;
pub mod xml;

pub use soap::SoapCaseService;
pub use storage::LocalStorage;
