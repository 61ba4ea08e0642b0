// Domain layer: the record model, field enumeration and the ports the core depends on.

pub mod model;
pub mod ports;
