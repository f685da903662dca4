use thiserror::Error;

/// The line of a stop file that could not be read
#[derive(Debug)]
pub struct LineError {
    pub values: Vec<String>,
}

/// An error that can occur when locating a building or fetching its predictions.
#[derive(Error, Debug)]
pub enum Error {
    #[error("The id {0} is not known")]
    ReferenceError(String),
    #[error("cannot compute location of building {building}: no perimeter points")]
    EmptyPerimeter { building: i64 },
    #[error("cannot compute location of building {building}: none of its perimeter points are known")]
    UnresolvedPerimeter { building: i64 },
    #[error("no bus stop found with direction '{0}'")]
    NoDirectionMatch(String),
    #[error("Could not find file {0}")]
    MissingFile(String),
    #[error("impossible to read '{file_name}'")]
    NamedFileIO {
        file_name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("impossible to read csv file '{file_name}'")]
    CSVError {
        file_name: String,
        #[source]
        source: csv::Error,
        line_in_error: Option<LineError>,
    },
    #[error("impossible to build the http client")]
    Client(#[source] reqwest::Error),
    #[error("impossible to remotely access predictions")]
    Fetch(#[from] reqwest::Error),
    #[error("the prediction service answered {status} for {url}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("invalid json in prediction response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing field '{0}'")]
    MissingField(String),
    #[error("'{value}' is not a valid value for field '{field}'")]
    InvalidField { field: String, value: String },
    #[error("'{0}' is not a valid countdown")]
    InvalidCountdown(String),
}
