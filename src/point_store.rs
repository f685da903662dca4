use crate::{Error, MapPoint};
use std::{collections::HashMap, iter::FromIterator};

/// All the known positions of the map, indexed by their identifier
///
/// The store can only be built at once from an iterator and is read-only afterwards
#[derive(Debug, Default, Clone)]
pub struct PointStore {
    points: HashMap<i64, MapPoint>,
}

impl PointStore {
    /// Returns the point, or None if the identifier is unknown
    pub fn lookup(&self, id: i64) -> Option<&MapPoint> {
        self.points.get(&id)
    }

    pub fn get_point(&self, id: i64) -> Result<&MapPoint, Error> {
        self.lookup(id)
            .ok_or_else(|| Error::ReferenceError(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over the points that are building entrances, in no particular order
    pub fn entrances(&self) -> impl Iterator<Item = &MapPoint> {
        self.points.values().filter(|p| p.is_entrance)
    }
}

impl FromIterator<MapPoint> for PointStore {
    fn from_iter<I: IntoIterator<Item = MapPoint>>(iter: I) -> Self {
        let mut points = HashMap::new();
        for p in iter {
            // The map loader already validated the points, the last one wins
            if points.insert(p.id, p).is_some() {
                log::warn!("point {} is defined more than once", p.id);
            }
        }
        PointStore { points }
    }
}

/// Build from the `(id, latitude, longitude, is_entrance)` tuples of the map loader
impl FromIterator<(i64, f64, f64, bool)> for PointStore {
    fn from_iter<I: IntoIterator<Item = (i64, f64, f64, bool)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(id, latitude, longitude, is_entrance)| MapPoint {
                id,
                latitude,
                longitude,
                is_entrance,
            })
            .collect()
    }
}
