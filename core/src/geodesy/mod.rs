pub mod azimuth;
pub mod coord;
pub mod sector;

pub use azimuth::{azimuth, normalize_degrees};
pub use coord::{BoundingBox, Coordinate};
pub use sector::{is_within_arc, DEFAULT_SECTOR_ARC_DEG};

/// Errors from coordinate geometry.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("coordinate out of range: lat {latitude}, lon {longitude}")]
    MalformedCoordinate { latitude: f64, longitude: f64 },
    #[error("could not parse position {0:?}, expected lat,lon")]
    UnparseablePosition(String),
    #[error("bounding box undefined at polar latitude {0}")]
    PolarLatitude(f64),
    #[error("bounding box area must be positive, got {0} km^2")]
    InvalidArea(f64),
}
