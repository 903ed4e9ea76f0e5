pub mod dataset;
pub mod record;
pub mod tower;

pub use dataset::{apply_coordinates, unique_tower_addresses, AddressBook};
pub use record::TrafficRecord;
pub use tower::Tower;
