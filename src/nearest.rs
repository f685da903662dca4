use crate::{distance_miles, Error, TransitStop};

/// The result of a nearest stop search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestStop<'a> {
    /// Position of the stop in the searched slice
    pub index: usize,
    pub stop: &'a TransitStop,
    /// Distance in miles between the stop and the searched position
    pub distance: f64,
}

/// Finds the stop serving `direction` that is the closest to `(lat, lon)`
///
/// Only the stops whose direction label is exactly `direction` are candidates.
/// When several stops are at the same distance, the first one in `stops` wins.
///
/// Fails with [Error::NoDirectionMatch] if no stop serves `direction`
pub fn find_nearest<'a>(
    stops: &'a [TransitStop],
    direction: &str,
    lat: f64,
    lon: f64,
) -> Result<NearestStop<'a>, Error> {
    let mut best: Option<NearestStop<'a>> = None;
    for (index, stop) in stops.iter().enumerate() {
        if stop.direction != direction {
            continue;
        }
        let distance = distance_miles(stop.latitude, stop.longitude, lat, lon);
        // strictly closer, so that ties keep the earlier stop
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(NearestStop {
                index,
                stop,
                distance,
            });
        }
    }

    best.ok_or_else(|| {
        log::warn!("no {} bus stop among {} stops", direction, stops.len());
        Error::NoDirectionMatch(direction.to_owned())
    })
}
