use crate::serde_helpers::*;
use serde::de::{self, Deserialize, Deserializer};
use std::fmt;

/// A position of the map, as read from the map file
///
/// Points are owned by the [crate::PointStore]; buildings only keep their identifiers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPoint {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// The point is an entrance of the building it belongs to
    pub is_entrance: bool,
}

impl fmt::Display for MapPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)?;
        if self.is_entrance {
            write!(f, ", is entrance")?;
        }
        Ok(())
    }
}

/// A bus stop from the static stop file
///
/// The fields are in the column order of the file, which has no header
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct TransitStop {
    pub id: u32,
    /// The route designator, usually a small number
    pub route: String,
    pub name: String,
    /// Direction of travel served by the stop, e.g. `Northbound`
    pub direction: String,
    /// Free text position of the stop at the intersection, e.g. `NE corner`
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for TransitStop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {}, bus #{}, {}",
            self.id, self.name, self.route, self.location
        )
    }
}

/// Minutes before a vehicle reaches the stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Minutes(u32),
    /// The vehicle is approaching, reported as `DUE`
    Due,
    /// The vehicle is delayed, reported as `DLY`
    Delayed,
}

impl std::str::FromStr for Countdown {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "DUE" => Ok(Countdown::Due),
            "DLY" => Ok(Countdown::Delayed),
            m => m
                .parse()
                .map(Countdown::Minutes)
                .map_err(|_| crate::Error::InvalidCountdown(s.to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for Countdown {
    fn deserialize<D>(deserializer: D) -> Result<Countdown, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Countdown::Minutes(m) => write!(f, "{} mins", m),
            Countdown::Due => write!(f, "DUE"),
            Countdown::Delayed => write!(f, "DLY"),
        }
    }
}

/// A live arrival estimate, as sent by the bus tracker
///
/// The tracker sends every field as a string, numbers included
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Prediction {
    #[serde(rename = "vid", deserialize_with = "deserialize_numeric_str")]
    pub vehicle_id: u32,
    #[serde(rename = "rt", deserialize_with = "deserialize_numeric_str")]
    pub route: u32,
    /// Direction as written by the tracker, not necessarily the stop's direction
    #[serde(rename = "rtdir")]
    pub direction: String,
    #[serde(rename = "prdctdn")]
    pub countdown: Countdown,
    #[serde(rename = "stpnm", default)]
    pub stop_name: Option<String>,
    #[serde(rename = "des", default)]
    pub destination: Option<String>,
    #[serde(rename = "dly", deserialize_with = "deserialize_flag", default)]
    pub delayed: bool,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "vehicle #{} on route {} travelling {}",
            self.vehicle_id, self.route, self.direction
        )?;
        match self.countdown {
            Countdown::Minutes(m) => write!(f, " to arrive in {} mins", m),
            Countdown::Due => write!(f, " arriving now"),
            Countdown::Delayed => write!(f, ", delayed"),
        }
    }
}
