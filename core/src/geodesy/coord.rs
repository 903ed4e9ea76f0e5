use super::GeoError;
use geo::{GeodesicDistance, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius in meters (IUGG derived geometric constant).
const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Kilometers per degree of latitude, the constant the flat-earth
/// bounding-box approximation is built on.
const KM_PER_DEGREE: f64 = 111.3;

/// A latitude/longitude pair on the WGS84 ellipsoid.
///
/// Immutable value type with no identity beyond its two fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Parses the `lat,lon` position format used on the command line.
    pub fn parse(text: &str) -> Result<Self, GeoError> {
        let mut parts = text.splitn(2, ',');
        let latitude = parts.next().unwrap_or("").trim().parse::<f64>();
        let longitude = parts.next().unwrap_or("").trim().parse::<f64>();
        match (latitude, longitude) {
            (Ok(latitude), Ok(longitude)) => {
                let coord = Self::new(latitude, longitude);
                coord.validate()?;
                Ok(coord)
            }
            _ => Err(GeoError::UnparseablePosition(text.to_string())),
        }
    }

    /// Checks the WGS84 value ranges.
    pub fn validate(&self) -> Result<(), GeoError> {
        let lat_ok = self.latitude.is_finite() && self.latitude.abs() <= 90.0;
        let lon_ok = self.longitude.is_finite() && self.longitude.abs() <= 180.0;
        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(GeoError::MalformedCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// WGS84 geodesic distance to `other` in meters.
    ///
    /// Symmetric in its arguments; malformed coordinates fail instead of
    /// producing a number.
    pub fn distance_m(&self, other: &Coordinate) -> Result<f64, GeoError> {
        self.validate()?;
        other.validate()?;
        let origin = Point::new(self.longitude, self.latitude);
        let target = Point::new(other.longitude, other.latitude);
        Ok(origin.geodesic_distance(&target))
    }

    /// Destination point `distance_m` meters away along `bearing_deg`.
    ///
    /// Spherical direct formula over the mean Earth radius; used for map
    /// wedge geometry where sub-meter precision does not matter.
    pub fn destination(&self, bearing_deg: f64, distance_m: f64) -> Coordinate {
        let angular = distance_m / MEAN_EARTH_RADIUS_M;
        let bearing = bearing_deg.to_radians();
        let lat1 = self.latitude.to_radians();
        let lon1 = self.longitude.to_radians();

        let lat2 =
            (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
        let lon2 = lon1
            + (bearing.sin() * angular.sin() * lat1.cos())
                .atan2(angular.cos() - lat1.sin() * lat2.sin());

        Coordinate::new(lat2.to_degrees(), lon2.to_degrees())
    }
}

impl fmt::Display for Coordinate {
    /// `lat,lon` with five decimals, the form the tower catalog's BBOX
    /// parameter expects.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

/// Corner pair of a square area centered on a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl BoundingBox {
    /// Builds the square of `area_km2` around `center` using the local
    /// flat-earth approximation (1 degree of latitude is 111.3 km,
    /// longitude scaled by cos(latitude)).
    ///
    /// Undefined at the poles where cos(latitude) vanishes; that case is
    /// an error rather than a silently collapsed box.
    pub fn from_center_area(center: Coordinate, area_km2: f64) -> Result<Self, GeoError> {
        center.validate()?;
        if !(area_km2 > 0.0) {
            return Err(GeoError::InvalidArea(area_km2));
        }
        let cos_lat = center.latitude.to_radians().cos();
        if cos_lat.abs() < 1e-6 {
            return Err(GeoError::PolarLatitude(center.latitude));
        }

        let half_side_km = area_km2.sqrt() / 2.0;
        let lat_delta = half_side_km / KM_PER_DEGREE;
        let lon_delta = half_side_km / (KM_PER_DEGREE * cos_lat);

        Ok(Self {
            min: Coordinate::new(center.latitude - lat_delta, center.longitude - lon_delta),
            max: Coordinate::new(center.latitude + lat_delta, center.longitude + lon_delta),
        })
    }

    /// `minlat,minlon,maxlat,maxlon` for the catalog query string.
    pub fn to_query(&self) -> String {
        format!("{},{}", self.min, self.max)
    }
}
