pub mod google;
pub mod opencellid;
pub mod resolve;

pub use google::GoogleGeocoder;
pub use opencellid::OpenCellIdClient;
pub use resolve::resolve_addresses;

use anyhow::Context;
use celltracecore::geodesy::Coordinate;

/// Address-lookup boundary. The production implementation talks to the
/// Google Maps geocoding API; tests substitute a fake so the live service
/// is never touched.
pub trait Geocoder {
    /// `Ok(None)` means the service answered but knows no such address.
    fn resolve(&self, address: &str) -> anyhow::Result<Option<Coordinate>>;
    /// Reverse lookup of a coordinate to a printable address.
    fn reverse(&self, coord: Coordinate) -> anyhow::Result<Option<String>>;
}

/// API credentials, loaded once at startup. A missing key is fatal before
/// any external call is attempted, not a per-call surprise.
pub struct Credentials {
    pub geocoding_key: String,
    pub tower_db_key: String,
}

impl Credentials {
    pub fn from_env() -> anyhow::Result<Self> {
        let geocoding_key =
            std::env::var("GOOGLE_MAPS_KEY").context("GOOGLE_MAPS_KEY is not set")?;
        let tower_db_key =
            std::env::var("OPENCELLID_KEY").context("OPENCELLID_KEY is not set")?;
        Ok(Self {
            geocoding_key,
            tower_db_key,
        })
    }
}
