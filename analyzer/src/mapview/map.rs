use anyhow::Context;
use celltracecore::geodesy::{normalize_degrees, Coordinate};
use celltracecore::prelude::TowerCount;
use celltracecore::traffic::TrafficRecord;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Share of the busiest tower's traffic above which a tower marker is
/// drawn highlighted.
const HOT_TOWER_SHARE: f64 = 0.3;
/// Polygon vertices swept across one sector wedge.
const WEDGE_STEPS: usize = 24;

const HIGHLIGHT_COLOR: &str = "#d43b2a";
const NORMAL_COLOR: &str = "#2a61d4";

/// Builder for the standalone interactive map document: subscriber
/// marker, tower markers, one translucent sector wedge per matched
/// connection. The output is a self-contained HTML page pulling Leaflet
/// from its CDN; tile rendering stays someone else's problem.
pub struct TrafficMap {
    center: Coordinate,
    zoom: u32,
    wedge_radius_m: f64,
    features: Vec<String>,
}

impl TrafficMap {
    pub fn new(center: Coordinate, zoom: u32, wedge_radius_m: f64) -> Self {
        Self {
            center,
            zoom,
            wedge_radius_m,
            features: Vec::new(),
        }
    }

    pub fn add_subscriber_marker(&mut self, location: Coordinate, label: &str) {
        self.features.push(format!(
            "L.marker([{:.7}, {:.7}]).addTo(map).bindPopup('<h4>{}</h4>');",
            location.latitude,
            location.longitude,
            escape(label)
        ));
    }

    pub fn add_tower_marker(
        &mut self,
        location: Coordinate,
        label: &str,
        connections: usize,
        highlighted: bool,
    ) {
        let color = if highlighted {
            HIGHLIGHT_COLOR
        } else {
            NORMAL_COLOR
        };
        self.features.push(format!(
            "L.circleMarker([{:.7}, {:.7}], {{radius: 8, color: '{}'}}).addTo(map)\
             .bindPopup('<h4>{}</h4><h5>{} connections</h5>');",
            location.latitude,
            location.longitude,
            color,
            escape(label),
            connections
        ));
    }

    /// Fans a polygon from the tower across `sector_azimuth ± arc` at the
    /// configured radius.
    pub fn add_sector_wedge(
        &mut self,
        tower: Coordinate,
        sector_azimuth_deg: f64,
        arc_deg: f64,
        label: &str,
    ) {
        let mut vertices = String::new();
        let _ = write!(vertices, "[{:.7}, {:.7}]", tower.latitude, tower.longitude);
        for step in 0..=WEDGE_STEPS {
            let fraction = step as f64 / WEDGE_STEPS as f64;
            let bearing = sector_azimuth_deg - arc_deg + fraction * 2.0 * arc_deg;
            let point = tower.destination(bearing, self.wedge_radius_m);
            let _ = write!(vertices, ", [{:.7}, {:.7}]", point.latitude, point.longitude);
        }
        self.features.push(format!(
            "L.polygon([{}], {{color: '#FF0000', fillColor: '#FFA500', \
             fillOpacity: 0.5, weight: 1}}).addTo(map).bindPopup('<h5>{}</h5>');",
            vertices,
            escape(label)
        ));
    }

    /// Adds the markers and wedges for a screened result set.
    pub fn add_traffic(
        &mut self,
        matched: &[TrafficRecord],
        tower_counts: &[TowerCount],
        arc_deg: f64,
    ) {
        let busiest = tower_counts
            .iter()
            .map(|count| count.connections)
            .max()
            .unwrap_or(0);

        let mut seen = BTreeSet::new();
        for record in matched {
            let Some(coord) = record.tower_coord else {
                continue;
            };
            if seen.insert(record.tower_address.clone()) {
                let connections = tower_counts
                    .iter()
                    .find(|count| count.address == record.tower_address)
                    .map(|count| count.connections)
                    .unwrap_or(0);
                let highlighted =
                    busiest > 0 && connections as f64 > HOT_TOWER_SHARE * busiest as f64;
                self.add_tower_marker(coord, &record.tower_address, connections, highlighted);
            }
            self.add_sector_wedge(
                coord,
                normalize_degrees(record.sector_azimuth_deg),
                arc_deg,
                &record.timestamp.to_string(),
            );
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            "<!DOCTYPE html>\n\
             <html>\n<head>\n<meta charset=\"utf-8\"/>\n\
             <title>Traffic correlation map</title>\n\
             <link rel=\"stylesheet\" href=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.css\"/>\n\
             <script src=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.js\"></script>\n\
             <style>html, body, #map {{ height: 100%; margin: 0; }}</style>\n\
             </head>\n<body>\n<div id=\"map\"></div>\n<script>\n\
             var map = L.map('map').setView([{:.7}, {:.7}], {});\n\
             L.tileLayer('https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{maxZoom: 19}}).addTo(map);\n\
             {}\n\
             </script>\n</body>\n</html>\n",
            self.center.latitude,
            self.center.longitude,
            self.zoom,
            self.features.join("\n")
        )
    }

    /// Writes the map as a standalone document.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path_ref = path.as_ref();
        fs::write(path_ref, self.to_html())
            .with_context(|| format!("writing map {}", path_ref.display()))
    }
}

fn escape(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn center() -> Coordinate {
        Coordinate::new(50.4686032, 30.6030372)
    }

    #[test]
    fn document_embeds_center_and_markers() {
        let mut map = TrafficMap::new(center(), 12, 1000.0);
        map.add_subscriber_marker(center(), "O'Neill's house");
        let html = map.to_html();

        assert!(html.contains("leaflet.js"));
        assert!(html.contains("setView([50.4686032, 30.6030372], 12)"));
        assert!(html.contains("O\\'Neill\\'s house"));
        assert!(html.contains("{z}/{x}/{y}.png"));
    }

    #[test]
    fn wedge_polygon_fans_across_the_arc() {
        let mut map = TrafficMap::new(center(), 12, 1000.0);
        map.add_sector_wedge(center(), 290.0, 60.0, "01.01.2020 00:28");
        let html = map.to_html();

        let polygon = html
            .lines()
            .find(|line| line.contains("L.polygon"))
            .unwrap();
        // Tower vertex plus the swept arc.
        assert_eq!(polygon.matches('[').count(), WEDGE_STEPS + 3);
    }

    #[test]
    fn hot_towers_are_highlighted() {
        let timestamp = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap();
        let mut hot = TrafficRecord::new(timestamp, "hot site", 290.0);
        hot.tower_coord = Some(Coordinate::new(50.4662097, 30.6152663));
        let mut cold = TrafficRecord::new(timestamp, "cold site", 120.0);
        cold.tower_coord = Some(Coordinate::new(50.4700000, 30.6200000));

        let counts = vec![
            TowerCount {
                address: "cold site".to_string(),
                connections: 1,
            },
            TowerCount {
                address: "hot site".to_string(),
                connections: 9,
            },
        ];

        let mut map = TrafficMap::new(center(), 12, 1000.0);
        map.add_traffic(&[hot, cold], &counts, 60.0);
        let html = map.to_html();

        assert!(html.contains(HIGHLIGHT_COLOR));
        assert!(html.contains(NORMAL_COLOR));
        assert_eq!(html.matches("L.polygon").count(), 2);
    }

    #[test]
    fn save_writes_the_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("map.html");
        let map = TrafficMap::new(center(), 12, 1000.0);
        map.save(&path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("<!DOCTYPE html>"));
    }
}
