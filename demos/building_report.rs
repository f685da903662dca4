use campus_transit::{Building, BuildingReport, PointStore, PredictionClient, PredictionConfig};

fn main() {
    env_logger::init();

    let stops_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "fixtures/bus-stops.txt".to_owned());
    let stops = campus_transit::TransitStopDirectory::from_path(&stops_path)
        .expect("impossible to read the bus stops");
    stops.print_stats();

    // The perimeter of Mudd Library, as the map loader would give it
    let points: PointStore = vec![
        (2241401i64, 42.058475, -87.674423, true),
        (2241402, 42.058503, -87.673686, false),
        (2241403, 42.057761, -87.673634, false),
        (2241404, 42.057731, -87.674365, true),
    ]
    .into_iter()
    .collect();
    let mut building = Building::new(
        11071001,
        "Mudd Science and Engineering Library",
        "2233 Tech Drive",
    );
    for p in [2241401, 2241402, 2241403, 2241404, 2241401] {
        building.add(p);
    }

    let config = PredictionConfig::from_env().expect("set CTA_API_KEY to request predictions");
    let client = PredictionClient::new(config).expect("impossible to initialise the http client");

    match BuildingReport::build(&building, &points, &stops, &client) {
        Ok(report) => print!("{}", report),
        Err(e) => println!("{}: {}", building.name, e),
    }
}
