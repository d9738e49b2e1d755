// Domain layer: reference records, payload types and ports (interfaces).

pub mod model;
pub mod ports;
