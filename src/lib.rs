/*! Locate the buildings of a campus map and the bus stops around them.

The location of a building is the mean of the points of its perimeter. From this location,
the closest bus stop is searched for each direction of travel, and the live arrival
predictions of that stop are requested from the [CTA bus tracker](https://www.transitchicago.com/developers/bustracker/).

The points of the map and the stops are loaded once and never modified afterwards.

```no_run
use campus_transit::*;

let stops = TransitStopDirectory::from_path("bus-stops.txt")?;
let client = PredictionClient::new(PredictionConfig::from_env()?)?;
let nearest = stops.nearest("Southbound", 42.0576, -87.6742)?;
for p in client.get_predictions(nearest.stop).records() {
    println!("{}", p);
}
# Ok::<(), campus_transit::Error>(())
```
*/

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate serde_derive;

mod building;
mod distance;
pub mod error;
mod nearest;
mod objects;
mod point_store;
mod predictions;
mod report;
pub(crate) mod serde_helpers;
mod stops;


pub use building::{Building, Divisor, DEFAULT_DIVISOR};
pub use distance::distance_miles;
pub use error::Error;
pub use nearest::{find_nearest, NearestStop};
pub use objects::*;
pub use point_store::PointStore;
pub use predictions::{
    parse_response, MalformedRecord, PredictionClient, PredictionConfig, PredictionSource,
    Predictions, DEFAULT_ENDPOINT,
};
pub use report::{BuildingReport, DirectionReport, StopPredictions, DEFAULT_DIRECTIONS};
pub use stops::TransitStopDirectory;
