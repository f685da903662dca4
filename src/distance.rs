//! Distance between two geographic positions.
//!
//! Uses the Haversine formula, good enough at the scale of a campus.

use geo::{HaversineDistance, Point};

const METERS_PER_MILE: f64 = 1609.344;

/// Great-circle distance in miles between two `(latitude, longitude)` positions, in degrees
pub fn distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let p1 = Point::new(lon1, lat1);
    let p2 = Point::new(lon2, lat2);
    p1.haversine_distance(&p2) / METERS_PER_MILE
}
