// Data processing pipeline

pub mod processing;

pub use processing::coverage;
pub use processing::normalize;
pub use processing::quality_gate;
