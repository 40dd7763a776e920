pub mod export;
pub mod html;

pub use export::{write_exports, ExportFormat, Report};
