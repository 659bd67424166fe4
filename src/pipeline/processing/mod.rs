// Record processing: field normalization, quality gate, coverage, export projection, and verification

pub mod coverage;
pub mod export;
pub mod normalize;
pub mod quality_gate;
pub mod verify;
