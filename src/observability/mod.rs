// Observability: metrics recorder and per-stage recording functions

pub mod metrics;

pub use metrics::init;
