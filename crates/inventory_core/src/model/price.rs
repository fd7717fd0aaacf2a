//! Serde adapter for monetary amounts on the JSON wire.
//!
//! Prices travel as decimal strings (`"12.5"`) so that clients never round
//! them through a float parser. Input accepts either a string or a number;
//! an empty string reads as zero. NaN and infinities are rejected.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PriceRepr {
        Text(String),
        Number(f64),
    }

    let value = match PriceRepr::deserialize(deserializer)? {
        PriceRepr::Number(value) => value,
        PriceRepr::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(0.0);
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("invalid price `{trimmed}`")))?
        }
    };

    if !value.is_finite() {
        return Err(D::Error::custom(format!(
            "invalid price `{value}`: must be a finite number"
        )));
    }
    Ok(value)
}
