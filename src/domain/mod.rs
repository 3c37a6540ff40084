// Domain layer: records, summaries and the ports the exporter depends on.

pub mod model;
pub mod ports;
