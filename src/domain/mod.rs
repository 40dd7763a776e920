// Domain layer: case models, the raw upstream schema and ports (interfaces).

pub mod model;
pub mod ports;
pub mod raw;
