//! Geospatial correlation core for the Rust cell traffic analysis platform.
//!
//! The modules mirror the investigative traffic-audit workflow while
//! providing typed records, WGS84 geometry helpers, and well-defined
//! correlation steps.

pub mod geodesy;
pub mod prelude;
pub mod processing;
pub mod telemetry;
pub mod traffic;

pub use prelude::{PipelineStep, StepInput, StepOutput};
