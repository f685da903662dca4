use serde::de::{self, Deserialize, Deserializer};
use std::str::FromStr;

/// The bus tracker encodes numbers as strings, e.g. `"vid": "1832"`
pub fn deserialize_numeric_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let s = String::deserialize(deserializer)?;
    s.trim()
        .parse()
        .map_err(|_| de::Error::custom(format!("Invalid value `{s}`, expected an integer")))
}

/// Booleans are sometimes sent as json booleans, sometimes as strings
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Str(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Str(s) => match s.as_str() {
            "" | "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            _ => Err(de::Error::custom(format!(
                "Invalid value `{s}`, expected a boolean"
            ))),
        },
    }
}

#[test]
fn test_deserialize_numeric_str() {
    #[derive(Deserialize)]
    struct Test {
        #[serde(deserialize_with = "deserialize_numeric_str")]
        vid: u32,
        #[serde(deserialize_with = "deserialize_flag", default)]
        dly: bool,
    }
    let parsed: Test = serde_json::from_str(r#"{"vid": "1832"}"#).unwrap();
    assert_eq!(1832, parsed.vid);
    assert!(!parsed.dly);

    let parsed: Test = serde_json::from_str(r#"{"vid": " 8 ", "dly": true}"#).unwrap();
    assert_eq!(8, parsed.vid);
    assert!(parsed.dly);

    let parsed: Test = serde_json::from_str(r#"{"vid": "8", "dly": ""}"#).unwrap();
    assert!(!parsed.dly);

    assert!(serde_json::from_str::<Test>(r#"{"vid": "abc"}"#).is_err());
    assert!(serde_json::from_str::<Test>(r#"{"vid": 1832}"#).is_err());
    assert!(serde_json::from_str::<Test>(r#"{"dly": false}"#).is_err());
}
