pub mod ports;
pub mod normalize_use_case;
pub mod quality_gate_use_case;
pub mod clean_use_case;
pub mod coverage_use_case;
pub mod export_use_case;
