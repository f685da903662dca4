use crate::{Error, NearestStop, TransitStop};
use chrono::Utc;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// All the bus stops known from the static stop file
///
/// The stops keep the order of the file, which decides between equidistant stops
#[derive(Debug, Default, Clone)]
pub struct TransitStopDirectory {
    /// Time needed to read and parse the stop file in milliseconds
    pub read_duration: i64,
    stops: Vec<TransitStop>,
}

fn read_stops<T>(mut reader: T, file_name: &str) -> Result<Vec<TransitStop>, Error>
where
    T: std::io::Read,
{
    // a read can stop short, the 3 bytes are gathered before looking for a BOM
    let mut bom = [0; 3];
    let mut n = 0;
    while n < bom.len() {
        match reader.read(&mut bom[n..]) {
            Ok(0) => break,
            Ok(read) => n += read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(Error::NamedFileIO {
                    file_name: file_name.to_owned(),
                    source: e,
                })
            }
        }
    }

    let chained = if bom[..n] != [0xefu8, 0xbbu8, 0xbfu8] {
        bom[..n].chain(reader)
    } else {
        [].chain(reader)
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::Fields)
        .from_reader(chained);

    let mut res = Vec::new();
    for rec in reader.records() {
        let r = rec.map_err(|e| Error::CSVError {
            file_name: file_name.to_owned(),
            source: e,
            line_in_error: None,
        })?;
        if r.iter().all(str::is_empty) {
            continue;
        }
        let stop = r.deserialize(None).map_err(|e| Error::CSVError {
            file_name: file_name.to_owned(),
            source: e,
            line_in_error: Some(crate::error::LineError {
                values: r.iter().map(|s| s.to_owned()).collect(),
            }),
        })?;
        res.push(stop);
    }

    Ok(res)
}

impl TransitStopDirectory {
    /// Builds the directory from stops already loaded, keeping their order
    pub fn from_stops(stops: Vec<TransitStop>) -> Self {
        Self {
            read_duration: 0,
            stops,
        }
    }

    /// Reads the stop file
    ///
    /// It is a csv without headers, with the columns
    /// `stop id, route, stop name, direction, location, latitude, longitude`
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let p = path.as_ref();
        let file_name = p
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("invalid_file_name")
            .to_string();
        if !p.is_file() {
            return Err(Error::MissingFile(format!("{}", p.display())));
        }
        let file = File::open(p).map_err(|e| Error::NamedFileIO {
            file_name: file_name.clone(),
            source: e,
        })?;
        Self::read(file, &file_name)
    }

    /// Reads the stops from any reader, see [TransitStopDirectory::from_path] for the format
    pub fn from_reader<T: std::io::Read>(reader: T) -> Result<Self, Error> {
        Self::read(reader, "bus stops")
    }

    fn read<T: std::io::Read>(reader: T, file_name: &str) -> Result<Self, Error> {
        let now = Utc::now();
        let stops = read_stops(reader, file_name)?;
        let read_duration = Utc::now().signed_duration_since(now).num_milliseconds();
        log::info!("read {} bus stops in {} ms", stops.len(), read_duration);
        Ok(Self {
            read_duration,
            stops,
        })
    }

    /// Prints on stdout some basic statistics about the stops
    pub fn print_stats(&self) {
        println!("Bus stops:");
        println!("  Read in {} ms", self.read_duration);
        println!("  Stops: {}", self.stops.len());
        for direction in self.directions() {
            let n = self.iter().filter(|s| s.direction == direction).count();
            println!("  {}: {}", direction, n);
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransitStop> {
        self.stops.iter()
    }

    pub fn stops(&self) -> &[TransitStop] {
        &self.stops
    }

    pub fn get_stop(&self, id: u32) -> Result<&TransitStop, Error> {
        self.stops
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::ReferenceError(id.to_string()))
    }

    /// The distinct direction labels, in the order they first appear
    pub fn directions(&self) -> Vec<&str> {
        let mut res: Vec<&str> = Vec::new();
        for s in &self.stops {
            if !res.contains(&s.direction.as_str()) {
                res.push(&s.direction);
            }
        }
        res
    }

    /// The closest stop serving `direction`, see [crate::find_nearest]
    pub fn nearest(&self, direction: &str, lat: f64, lon: f64) -> Result<NearestStop<'_>, Error> {
        crate::find_nearest(&self.stops, direction, lat, lon)
    }
}
