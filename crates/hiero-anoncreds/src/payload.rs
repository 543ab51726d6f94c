use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::AnonCredsError;

/// JSON form of a registry model.
///
/// Decoding failures are reported under the model's `NAME` rather than as
/// raw serde errors.
pub trait JsonPayload: Serialize + DeserializeOwned {
    const NAME: &'static str;

    fn from_json_value(value: Value) -> Result<Self, AnonCredsError> {
        serde_json::from_value(value).map_err(|e| {
            tracing::debug!(model = Self::NAME, error = %e, "JSON payload rejected");
            AnonCredsError::InvalidJson(Self::NAME)
        })
    }

    fn from_json(bytes: &[u8]) -> Result<Self, AnonCredsError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|_| AnonCredsError::InvalidJson(Self::NAME))?;
        Self::from_json_value(value)
    }

    fn to_json_value(&self) -> Result<Value, AnonCredsError> {
        Ok(serde_json::to_value(self)?)
    }

    fn to_json(&self) -> Result<Vec<u8>, AnonCredsError> {
        Ok(serde_json::to_vec(self)?)
    }
}
