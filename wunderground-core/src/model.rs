use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Top-level payload of the `conditions` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Observation {
    #[serde(rename = "current_observation", deserialize_with = "lenient")]
    pub conditions: Conditions,
}

/// Current conditions. Wind and temperature keys are siblings of
/// `display_location` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conditions {
    #[serde(rename = "display_location", deserialize_with = "lenient")]
    pub location: Location,
    #[serde(flatten)]
    pub wind: Wind,
    #[serde(flatten)]
    pub temperature: Temperature,
}

/// Upstream sends every location field as a string, coordinates included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    #[serde(deserialize_with = "lenient_string")]
    pub full: String,
    #[serde(deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(deserialize_with = "lenient_string")]
    pub state_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(deserialize_with = "lenient_string")]
    pub country_iso3166: String,
    #[serde(deserialize_with = "lenient_string")]
    pub zip: String,
    #[serde(deserialize_with = "lenient_string")]
    pub latitude: String,
    #[serde(deserialize_with = "lenient_string")]
    pub longitude: String,
    #[serde(deserialize_with = "lenient_string")]
    pub elevation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wind {
    #[serde(rename = "wind_string", deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(rename = "wind_dir", deserialize_with = "lenient_string")]
    pub direction: String,
    #[serde(rename = "wind_degrees", deserialize_with = "lenient_number")]
    pub degrees: f32,
    #[serde(rename = "wind_mph", deserialize_with = "lenient_number")]
    pub mph: f32,
    /// Kept as text: upstream may send a non-numeric placeholder here.
    #[serde(rename = "wind_gust_mph", deserialize_with = "lenient_string")]
    pub gust_mph: String,
    #[serde(rename = "wind_kph", deserialize_with = "lenient_number")]
    pub kph: f32,
    /// Kept as text, see [`Wind::gust_mph`].
    #[serde(rename = "wind_gust_kph", deserialize_with = "lenient_string")]
    pub gust_kph: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Temperature {
    #[serde(rename = "temperature_string", deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(rename = "temp_f", deserialize_with = "lenient_number")]
    pub fahrenheit: f32,
    #[serde(rename = "temp_c", deserialize_with = "lenient_number")]
    pub celsius: f32,
}

impl Observation {
    /// Decode a response body, falling back to a zero-valued observation
    /// when the body is not JSON at all.
    pub fn from_slice_lenient(body: &[u8]) -> Self {
        match Self::from_slice_strict(body) {
            Ok(observation) => observation,
            Err(err) => {
                tracing::warn!(error = %err, "response body is not valid JSON, using empty observation");
                Self::default()
            }
        }
    }

    /// Like [`Observation::from_slice_lenient`], but a body that is not a JSON
    /// document is an error. Individual mistyped fields are still zeroed.
    pub fn from_slice_strict(body: &[u8]) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        Ok(lenient_value(value))
    }
}

fn lenient_value<T: DeserializeOwned + Default>(value: Value) -> T {
    T::deserialize(value).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "unexpected shape, using default");
        T::default()
    })
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Value::deserialize(deserializer).map(lenient_value)
}

/// Also takes JSON numbers, kept as their decimal text.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Also takes numeric strings. Anything that is not a finite `f32` is zero.
fn lenient_number<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().map(|v| v as f32),
        Value::String(s) => s.trim().parse::<f32>().ok(),
        _ => None,
    };
    Ok(number.filter(|v| v.is_finite()).unwrap_or_default())
}
