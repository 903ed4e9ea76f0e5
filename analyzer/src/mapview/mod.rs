pub mod map;

pub use map::TrafficMap;
