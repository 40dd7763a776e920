// Application layer: the user-facing lookup flows built on the core.

pub mod engine;

pub use engine::{ConsultaEngine, Outcome};
