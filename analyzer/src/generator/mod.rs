pub mod sample;

pub use sample::{build_sample_dataset, SampleConfig};
