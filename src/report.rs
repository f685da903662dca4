use crate::{
    Building, Error, MalformedRecord, NearestStop, PointStore, PredictionSource, Predictions,
    TransitStopDirectory,
};
use std::fmt;

/// The directions reported for a building, in order
pub const DEFAULT_DIRECTIONS: [&str; 2] = ["Southbound", "Northbound"];

/// The closest stop in one direction and its live predictions
#[derive(Debug)]
pub struct StopPredictions<'a> {
    pub nearest: NearestStop<'a>,
    pub predictions: Predictions,
}

#[derive(Debug)]
pub struct DirectionReport<'a> {
    pub direction: String,
    /// None if no stop serves this direction
    pub found: Option<StopPredictions<'a>>,
}

/// Everything shown to someone looking for a building
///
/// ```no_run
///use campus_transit::*;
///let points: PointStore = vec![(1i64, 42.0576, -87.6742, true), (2, 42.0580, -87.6736, false)]
///    .into_iter()
///    .collect();
///let mut building = Building::new(1, "Mudd Library", "2233 Tech Drive");
///building.add(1);
///building.add(2);
///let stops = TransitStopDirectory::from_path("bus-stops.txt")?;
///let client = PredictionClient::new(PredictionConfig::from_env()?)?;
///println!("{}", BuildingReport::build(&building, &points, &stops, &client)?);
/// # Ok::<(), campus_transit::Error>(())
///```
#[derive(Debug)]
pub struct BuildingReport<'a> {
    pub building: &'a Building,
    /// `(latitude, longitude)` of the building
    pub location: (f64, f64),
    pub directions: Vec<DirectionReport<'a>>,
}

impl<'a> BuildingReport<'a> {
    /// Locates the building, then for each of the [DEFAULT_DIRECTIONS] finds the
    /// closest stop and requests its predictions
    ///
    /// Fails only if the building cannot be located
    pub fn build(
        building: &'a Building,
        points: &PointStore,
        stops: &'a TransitStopDirectory,
        source: &impl PredictionSource,
    ) -> Result<Self, Error> {
        Self::build_for_directions(building, points, stops, source, &DEFAULT_DIRECTIONS)
    }

    /// The predictions are requested one direction after the other
    pub fn build_for_directions(
        building: &'a Building,
        points: &PointStore,
        stops: &'a TransitStopDirectory,
        source: &impl PredictionSource,
        directions: &[&str],
    ) -> Result<Self, Error> {
        let (lat, lon) = building.centroid(points)?;
        let directions = directions
            .iter()
            .map(|direction| {
                let found = stops.nearest(direction, lat, lon).ok().map(|nearest| {
                    log::debug!(
                        "closest {} stop of building {} is {} at {} miles",
                        direction,
                        building.id,
                        nearest.stop.id,
                        nearest.distance
                    );
                    StopPredictions {
                        predictions: source.get_predictions(nearest.stop),
                        nearest,
                    }
                });
                DirectionReport {
                    direction: direction.to_string(),
                    found,
                }
            })
            .collect();

        Ok(Self {
            building,
            location: (lat, lon),
            directions,
        })
    }
}

impl fmt::Display for Predictions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Predictions::Unavailable(_) => {
                writeln!(f, "  <<bus predictions unavailable, call failed>>")
            }
            Predictions::NoPredictions { .. } => writeln!(f, "  <<no predictions available>>"),
            Predictions::Received { records, malformed } => {
                // each element is shown at its position in the answer
                let count = records.len() + malformed.len();
                let mut records = records.iter();
                let mut malformed = malformed.iter().peekable();
                for index in 0..count {
                    match malformed.next_if(|m| m.index == index) {
                        Some(m) => write_malformed(f, m)?,
                        None => {
                            if let Some(p) = records.next() {
                                writeln!(f, "  {}", p)?;
                            }
                        }
                    }
                }
                for m in malformed {
                    write_malformed(f, m)?;
                }
                Ok(())
            }
        }
    }
}

fn write_malformed(f: &mut fmt::Formatter, m: &MalformedRecord) -> fmt::Result {
    writeln!(f, "  error")?;
    writeln!(
        f,
        "  malformed CTA response, prediction unavailable (error: {})",
        m.error
    )
}

impl<'a> fmt::Display for DirectionReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let direction = self.direction.to_lowercase();
        match &self.found {
            None => writeln!(f, "  no {} bus stop found", direction),
            Some(found) => {
                writeln!(f, "Closest {} bus stop:", direction)?;
                writeln!(f, "  {}, {:.3} miles", found.nearest.stop, found.nearest.distance)?;
                write!(f, "{}", found.predictions)
            }
        }
    }
}

impl<'a> fmt::Display for BuildingReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.building.name)?;
        writeln!(f, "Address: {}", self.building.street_address)?;
        writeln!(f, "Building ID: {}", self.building.id)?;
        writeln!(f, "# perimeter nodes: {}", self.building.perimeter().len())?;
        writeln!(f, "Location: ({:.6}, {:.6})", self.location.0, self.location.1)?;
        for d in &self.directions {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}
