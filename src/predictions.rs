//! Live arrival predictions from the CTA bus tracker.
//!
//! One blocking request per stop, no retry. The outcome of a request is a [Predictions],
//! which tells apart a failed call, a call without predictions and the predictions received.
//! A malformed element of the answer is reported on its own and does not hide the other ones.

use crate::{Error, Prediction, TransitStop};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// The getpredictions endpoint of the bus tracker api
pub const DEFAULT_ENDPOINT: &str = "https://www.ctabustracker.com/bustime/api/v2/getpredictions";

/// Allows to parameterize how the predictions are requested
///
/// ```
///let config = campus_transit::PredictionConfig::default()
///    .with_api_key("my-key")
///    .with_max_predictions(3);
///assert_eq!(Some(3), config.max_predictions);
///```
#[derive(Derivative, Clone)]
#[derivative(Default, Debug)]
pub struct PredictionConfig {
    #[derivative(Default(value = "DEFAULT_ENDPOINT.to_owned()"))]
    pub endpoint: String,
    /// Key of the bus tracker api, it is sent with every request
    #[derivative(Debug = "ignore")]
    pub api_key: String,
    /// Maximum time for the whole request
    #[derivative(Default(value = "Duration::from_secs(10)"))]
    pub timeout: Duration,
    /// Maximum number of predictions returned by the service (the `top` parameter)
    pub max_predictions: Option<u32>,
}

impl PredictionConfig {
    /// Reads the configuration from the environment
    ///
    /// `CTA_API_KEY` is mandatory, `CTA_PREDICTIONS_URL` and `CTA_TIMEOUT_SECS` are optional
    pub fn from_env() -> Result<Self, Error> {
        let api_key =
            std::env::var("CTA_API_KEY").map_err(|_| Error::MissingField("CTA_API_KEY".into()))?;
        let mut config = Self::default().with_api_key(api_key);
        if let Ok(endpoint) = std::env::var("CTA_PREDICTIONS_URL") {
            config = config.with_endpoint(endpoint);
        }
        if let Ok(timeout) = std::env::var("CTA_TIMEOUT_SECS") {
            let secs = timeout.parse().map_err(|_| Error::InvalidField {
                field: "CTA_TIMEOUT_SECS".into(),
                value: timeout.clone(),
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_predictions(mut self, max: u32) -> Self {
        self.max_predictions = Some(max);
        self
    }
}

/// A prediction of the answer that could not be read
#[derive(Debug)]
pub struct MalformedRecord {
    /// Position of the element in the `prd` array
    pub index: usize,
    pub error: Error,
}

/// The outcome of a prediction request
#[derive(Debug)]
pub enum Predictions {
    /// The service could not be reached, or its answer could not be read at all
    Unavailable(Error),
    /// The service answered without any prediction, with the messages it gave if any
    NoPredictions { messages: Vec<String> },
    /// The predictions in the order of the service, and the elements that could not be read
    Received {
        records: Vec<Prediction>,
        malformed: Vec<MalformedRecord>,
    },
}

impl Predictions {
    /// The predictions received, empty if there are none
    pub fn records(&self) -> &[Prediction] {
        match self {
            Predictions::Received { records, .. } => records,
            _ => &[],
        }
    }

    pub fn malformed(&self) -> &[MalformedRecord] {
        match self {
            Predictions::Received { malformed, .. } => malformed,
            _ => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Predictions::Unavailable(_))
    }
}

/// Anything able to give the predictions of a stop
pub trait PredictionSource {
    fn get_predictions(&self, stop: &TransitStop) -> Predictions;
}

/// Blocking client of the bus tracker
#[derive(Debug, Clone)]
pub struct PredictionClient {
    config: PredictionConfig,
    client: reqwest::blocking::Client,
}

impl PredictionClient {
    /// Fails only if the http client cannot be initialised
    pub fn new(config: PredictionConfig) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::Client)?;
        Ok(Self::with_http_client(config, client))
    }

    /// Uses an already configured http client, the timeout of the config is then ignored
    pub fn with_http_client(config: PredictionConfig, client: reqwest::blocking::Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    /// `<endpoint>?key=<key>&rt=<route>&stpid=<stop id>&format=json`
    pub fn request_url(&self, stop: &TransitStop) -> Result<reqwest::Url, Error> {
        let stop_id = stop.id.to_string();
        let top = self.config.max_predictions.map(|t| t.to_string());
        let mut params = vec![
            ("key", self.config.api_key.as_str()),
            ("rt", stop.route.as_str()),
            ("stpid", stop_id.as_str()),
            ("format", "json"),
        ];
        if let Some(top) = &top {
            params.push(("top", top.as_str()));
        }
        reqwest::Url::parse_with_params(&self.config.endpoint, &params).map_err(|_| {
            Error::InvalidField {
                field: "endpoint".into(),
                value: self.config.endpoint.clone(),
            }
        })
    }

    fn fetch(&self, stop: &TransitStop) -> Result<String, Error> {
        let url = self.request_url(stop)?;
        // the url holds the api key, it must not end up in the logs
        let res = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::Fetch(e.without_url()))?;
        let status = res.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status,
                url: self.config.endpoint.clone(),
            });
        }
        res.text().map_err(|e| Error::Fetch(e.without_url()))
    }
}

impl PredictionSource for PredictionClient {
    fn get_predictions(&self, stop: &TransitStop) -> Predictions {
        match self.fetch(stop) {
            Ok(body) => parse_response(&body),
            Err(e) => {
                log::warn!("predictions unavailable for stop {}: {}", stop.id, e);
                Predictions::Unavailable(e)
            }
        }
    }
}

/// Reads the json answer of the getpredictions endpoint
///
/// ```json
/// {"bustime-response": {"prd": [{"vid": "1832", "rt": "201", "rtdir": "Southbound", "prdctdn": "7"}]}}
/// ```
pub fn parse_response(body: &str) -> Predictions {
    let json: Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("invalid prediction response: {}", e);
            return Predictions::Unavailable(e.into());
        }
    };

    let response = match json.get("bustime-response") {
        Some(response) => response,
        None => {
            log::warn!("prediction response without bustime-response");
            return Predictions::Unavailable(Error::MissingField("bustime-response".into()));
        }
    };

    let elements = match response.get("prd") {
        None => Vec::new(),
        Some(Value::Array(elements)) => elements.iter().collect(),
        Some(other) => {
            return Predictions::Unavailable(Error::InvalidField {
                field: "prd".into(),
                value: other.to_string(),
            })
        }
    };

    if elements.is_empty() {
        let messages = service_messages(response);
        log::info!("no predictions available: {:?}", messages);
        return Predictions::NoPredictions { messages };
    }

    let mut records = Vec::with_capacity(elements.len());
    let mut malformed = Vec::new();
    for (index, element) in elements.into_iter().enumerate() {
        match Prediction::deserialize(element) {
            Ok(p) => records.push(p),
            Err(e) => {
                log::warn!("malformed prediction {}: {}", index, e);
                malformed.push(MalformedRecord {
                    index,
                    error: e.into(),
                });
            }
        }
    }

    Predictions::Received { records, malformed }
}

// The service explains the absence of predictions with
// `"error": [{"stpid": "18152", "msg": "No service scheduled"}]`
fn service_messages(response: &Value) -> Vec<String> {
    response
        .get("error")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("msg").and_then(Value::as_str))
                .map(|s| s.to_owned())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Countdown;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("fixtures/predictions/{}", name))
            .expect("impossible to read fixture")
    }

    fn stop() -> TransitStop {
        TransitStop {
            id: 18152,
            route: "201".to_owned(),
            name: "Sheridan & Foster".to_owned(),
            direction: "Southbound".to_owned(),
            location: "NW corner".to_owned(),
            latitude: 42.0534,
            longitude: -87.6775,
        }
    }

    // Answers a single request with the given status and body, returns the endpoint url
    fn serve_once(status: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{}/bustime/api/v2/getpredictions", addr)
    }

    fn client(endpoint: String) -> PredictionClient {
        let http = reqwest::blocking::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let config = PredictionConfig::default()
            .with_api_key("secret")
            .with_endpoint(endpoint);
        PredictionClient::with_http_client(config, http)
    }

    #[test]
    fn default_config() {
        let config = PredictionConfig::default();
        assert_eq!(DEFAULT_ENDPOINT, config.endpoint);
        assert_eq!("", config.api_key);
        assert_eq!(Duration::from_secs(10), config.timeout);
        assert_eq!(None, config.max_predictions);
        assert!(!format!("{:?}", config.with_api_key("secret")).contains("secret"));
    }

    #[test]
    fn request_url() {
        let client = client(DEFAULT_ENDPOINT.to_owned());
        assert_eq!(
            "https://www.ctabustracker.com/bustime/api/v2/getpredictions?key=secret&rt=201&stpid=18152&format=json",
            client.request_url(&stop()).unwrap().as_str()
        );

        let config = PredictionConfig::default()
            .with_api_key("secret")
            .with_max_predictions(2);
        let client = PredictionClient::new(config).unwrap();
        assert!(client
            .request_url(&stop())
            .unwrap()
            .as_str()
            .ends_with("&format=json&top=2"));
    }

    #[test]
    fn invalid_endpoint() {
        let client = client("not a url".to_owned());
        assert!(matches!(
            client.request_url(&stop()),
            Err(Error::InvalidField { .. })
        ));
        assert!(client.get_predictions(&stop()).is_unavailable());
    }

    #[test]
    fn predictions() {
        let predictions = parse_response(&fixture("predictions.json"));
        assert!(predictions.malformed().is_empty());
        let records = predictions.records();
        assert_eq!(3, records.len());
        assert_eq!(1832, records[0].vehicle_id);
        assert_eq!(201, records[0].route);
        assert_eq!("Southbound", records[0].direction);
        assert_eq!(Countdown::Minutes(4), records[0].countdown);
        assert_eq!(Some("Sheridan & Foster".to_owned()), records[0].stop_name);
        assert_eq!(Some("Howard".to_owned()), records[0].destination);
        assert!(!records[0].delayed);
        assert_eq!(Countdown::Due, records[1].countdown);
        assert_eq!(Countdown::Minutes(17), records[2].countdown);
        assert!(records[2].delayed);
    }

    #[test]
    fn malformed_record_does_not_hide_the_others() {
        let predictions = parse_response(&fixture("malformed.json"));
        let records = predictions.records();
        assert_eq!(2, records.len());
        assert_eq!(1832, records[0].vehicle_id);
        assert_eq!(201, records[0].route);
        assert_eq!("Southbound", records[0].direction);
        assert_eq!(Countdown::Minutes(4), records[0].countdown);
        assert_eq!(1795, records[1].vehicle_id);
        assert_eq!(201, records[1].route);
        assert_eq!("Southbound", records[1].direction);
        assert_eq!(Countdown::Minutes(17), records[1].countdown);

        let malformed = predictions.malformed();
        assert_eq!(1, malformed.len());
        assert_eq!(1, malformed[0].index);
        assert!(matches!(malformed[0].error, Error::Json(_)));
    }

    #[test]
    fn every_kind_of_malformed_record() {
        let body = r#"{"bustime-response": {"prd": [
            {"rt": "201", "rtdir": "Southbound", "prdctdn": "4"},
            {"vid": 1832, "rt": "201", "rtdir": "Southbound", "prdctdn": "4"},
            {"vid": "1832", "rt": "201", "rtdir": "Southbound", "prdctdn": "soon"},
            "not an object",
            {"vid": "1833", "rt": "201", "rtdir": "Northbound", "prdctdn": "DLY"}
        ]}}"#;
        let predictions = parse_response(body);
        assert_eq!(1, predictions.records().len());
        assert_eq!(1833, predictions.records()[0].vehicle_id);
        let indexes: Vec<usize> = predictions.malformed().iter().map(|m| m.index).collect();
        assert_eq!(vec![0, 1, 2, 3], indexes);
    }

    #[test]
    fn no_predictions() {
        match parse_response(&fixture("empty.json")) {
            Predictions::NoPredictions { messages } => assert!(messages.is_empty()),
            other => panic!("unexpected result {:?}", other),
        }
        match parse_response(&fixture("no_service.json")) {
            Predictions::NoPredictions { messages } => {
                assert_eq!(vec!["No service scheduled".to_owned()], messages)
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn unreadable_response() {
        assert!(matches!(
            parse_response("<html>oops</html>"),
            Predictions::Unavailable(Error::Json(_))
        ));
        assert!(matches!(
            parse_response(r#"{"other": {}}"#),
            Predictions::Unavailable(Error::MissingField(_))
        ));
        assert!(matches!(
            parse_response(r#"{"bustime-response": {"prd": "none"}}"#),
            Predictions::Unavailable(Error::InvalidField { .. })
        ));
    }

    #[test]
    fn transport_failure() {
        // nothing listens on this port once the listener is dropped
        let addr = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let client = client(format!("http://{}/getpredictions", addr));
        let predictions = client.get_predictions(&stop());
        assert!(matches!(predictions, Predictions::Unavailable(Error::Fetch(_))));
        assert!(predictions.records().is_empty());
    }

    #[test]
    fn http_error() {
        let endpoint = serve_once("500 Internal Server Error", String::new());
        let predictions = client(endpoint).get_predictions(&stop());
        match predictions {
            Predictions::Unavailable(Error::HttpStatus { status, url }) => {
                assert_eq!(500, status.as_u16());
                assert!(!url.contains("secret"));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn fetch_predictions() {
        let endpoint = serve_once("200 OK", fixture("malformed.json"));
        let predictions = client(endpoint).get_predictions(&stop());
        assert_eq!(2, predictions.records().len());
        assert_eq!(1, predictions.malformed().len());
    }

    #[test]
    fn fetch_empty_predictions() {
        let endpoint = serve_once("200 OK", fixture("empty.json"));
        let predictions = client(endpoint).get_predictions(&stop());
        assert!(matches!(predictions, Predictions::NoPredictions { .. }));
    }
}
