pub mod batch;
pub mod extractor;
pub mod fetcher;
pub mod iue;

pub use crate::domain::model::{BatchEntry, BatchResult, CaseIdentifier, CaseRecord};
pub use crate::domain::ports::{CaseService, ConfigProvider, Storage};
pub use crate::utils::error::Result;
