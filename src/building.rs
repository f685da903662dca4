use crate::{Error, MapPoint, PointStore};
use std::fmt;

/// How the sum of the perimeter coordinates is divided when computing a location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divisor {
    /// Divide by the number of perimeter points, known or not.
    ///
    /// Unknown points count as `(0, 0)`, which pulls the location toward the origin
    PerimeterLength,
    /// Divide by the number of perimeter points found in the [PointStore]
    ResolvedPoints,
}

/// The divisor used by [Building::centroid]
pub const DEFAULT_DIVISOR: Divisor = Divisor::PerimeterLength;

/// A building of the map, with the ordered points of its perimeter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Building {
    pub id: i64,
    pub name: String,
    pub street_address: String,
    perimeter: Vec<i64>,
}

impl Building {
    pub fn new(id: i64, name: impl Into<String>, street_address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            street_address: street_address.into(),
            perimeter: Vec::new(),
        }
    }

    /// Adds the point at the end of the perimeter
    pub fn add(&mut self, point_id: i64) {
        self.perimeter.push(point_id);
    }

    pub fn perimeter(&self) -> &[i64] {
        &self.perimeter
    }

    /// The perimeter points marked as entrances, skipping the unknown ones
    pub fn entrances<'a>(&'a self, points: &'a PointStore) -> impl Iterator<Item = &'a MapPoint> {
        self.perimeter
            .iter()
            .filter_map(move |id| points.lookup(*id))
            .filter(|p| p.is_entrance)
    }

    /// The center `(latitude, longitude)` of the building, using [DEFAULT_DIVISOR]
    pub fn centroid(&self, points: &PointStore) -> Result<(f64, f64), Error> {
        self.centroid_with(points, DEFAULT_DIVISOR)
    }

    /// The mean of the perimeter coordinates
    ///
    /// This is not the area centroid of the polygon, every point weights the same.
    /// Fails with [Error::EmptyPerimeter] if the building has no perimeter points
    pub fn centroid_with(
        &self,
        points: &PointStore,
        divisor: Divisor,
    ) -> Result<(f64, f64), Error> {
        if self.perimeter.is_empty() {
            return Err(Error::EmptyPerimeter { building: self.id });
        }

        let mut lat_total = 0.0;
        let mut lon_total = 0.0;
        let mut resolved = 0usize;
        for id in &self.perimeter {
            match points.lookup(*id) {
                Some(p) => {
                    lat_total += p.latitude;
                    lon_total += p.longitude;
                    resolved += 1;
                }
                None => log::warn!("building {}: perimeter point {} not found", self.id, id),
            }
        }

        let count = match divisor {
            Divisor::PerimeterLength => self.perimeter.len(),
            Divisor::ResolvedPoints if resolved == 0 => {
                return Err(Error::UnresolvedPerimeter { building: self.id })
            }
            Divisor::ResolvedPoints => resolved,
        };

        Ok((lat_total / count as f64, lon_total / count as f64))
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}, {}", self.id, self.name, self.street_address)
    }
}
