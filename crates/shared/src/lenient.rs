//! Field deserializers that never fail the surrounding record.
//!
//! A malformed optional field is replaced with its default instead of
//! rejecting the whole measurement.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Deserialize `T`, substituting `T::default()` when the value is malformed.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
