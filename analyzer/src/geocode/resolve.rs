use super::Geocoder;
use celltracecore::telemetry::MetricsRecorder;
use celltracecore::traffic::AddressBook;
use log::{info, warn};

/// Resolves tower addresses one at a time, sequentially.
///
/// A lookup failure leaves a hole for that address and moves on: partial
/// results beat a dead batch. Holes stay in the book so the caller can
/// report which addresses need operator review.
pub fn resolve_addresses<G: Geocoder>(geocoder: &G, addresses: &[String]) -> AddressBook {
    let metrics = MetricsRecorder::new();
    let mut book = AddressBook::new();

    for address in addresses {
        match geocoder.resolve(address) {
            Ok(Some(coord)) => {
                metrics.record_resolved();
                book.insert(address.clone(), Some(coord));
            }
            Ok(None) => {
                metrics.record_unresolved();
                warn!("no coordinates for address {:?}", address);
                book.insert(address.clone(), None);
            }
            Err(err) => {
                metrics.record_unresolved();
                warn!("geocoding {:?} failed: {}", address, err);
                book.insert(address.clone(), None);
            }
        }
    }

    let (resolved, unresolved) = metrics.snapshot();
    info!(
        "geocoding finished: {} resolved, {} unresolved",
        resolved, unresolved
    );
    book
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::fake::FakeGeocoder;
    use celltracecore::geodesy::Coordinate;

    #[test]
    fn failures_leave_holes_and_do_not_abort() {
        let mut geocoder = FakeGeocoder::new()
            .with("14-B Voskresenska st., Kyiv", Coordinate::new(50.4686032, 30.6030372));
        geocoder.fail_on = Some("flaky address".to_string());

        let addresses = vec![
            "14-B Voskresenska st., Kyiv".to_string(),
            "flaky address".to_string(),
            "unknown address".to_string(),
        ];
        let book = resolve_addresses(&geocoder, &addresses);

        assert_eq!(
            book.get("14-B Voskresenska st., Kyiv"),
            Some(&Some(Coordinate::new(50.4686032, 30.6030372)))
        );
        assert_eq!(book.get("flaky address"), Some(&None));
        assert_eq!(book.get("unknown address"), Some(&None));
    }
}
