//! Structured results of registry operations.
//!
//! Resolution never fails outright: the value is absent and the metadata
//! carries `{error, message}`. Registration reports `finished` or `failed`
//! with a reason.

use serde::Serialize;

use hiero_core::ErrorKind;

use crate::cred_def::AnonCredsCredDef;
use crate::error::AnonCredsError;
use crate::revocation::{AnonCredsRevList, AnonCredsRevRegDef};
use crate::schema::AnonCredsSchema;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResolutionMetadata {
    pub fn from_error(error: &AnonCredsError) -> Self {
        Self {
            error: Some(error.kind()),
            message: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResult<T> {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    pub resolution_metadata: ResolutionMetadata,
}

impl<T> GetResult<T> {
    pub fn found(id: impl Into<String>, value: T) -> Self {
        Self {
            id: id.into(),
            value: Some(value),
            resolution_metadata: ResolutionMetadata::default(),
        }
    }

    pub fn from_error(id: impl Into<String>, error: &AnonCredsError) -> Self {
        Self {
            id: id.into(),
            value: None,
            resolution_metadata: ResolutionMetadata::from_error(error),
        }
    }

    pub(crate) fn from_outcome(id: &str, outcome: Result<T, AnonCredsError>) -> Self {
        match outcome {
            Ok(value) => Self::found(id, value),
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "AnonCreds resolution failed");
                Self::from_error(id, &e)
            }
        }
    }

    pub fn error(&self) -> Option<ErrorKind> {
        self.resolution_metadata.error
    }
}

pub type GetSchemaResult = GetResult<AnonCredsSchema>;
pub type GetCredDefResult = GetResult<AnonCredsCredDef>;
pub type GetRevRegDefResult = GetResult<AnonCredsRevRegDef>;
pub type GetRevListResult = GetResult<AnonCredsRevList>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationState {
    Finished,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResult<T> {
    pub state: RegistrationState,
    pub value: T,
    /// Identifier of the newly registered object, when one is created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl<T> RegistrationResult<T> {
    pub fn finished(value: T, id: Option<String>) -> Self {
        Self {
            state: RegistrationState::Finished,
            value,
            id,
            reason: None,
        }
    }

    pub fn failed(value: T, error: &AnonCredsError) -> Self {
        Self {
            state: RegistrationState::Failed,
            value,
            id: None,
            reason: Some(error.reason()),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == RegistrationState::Finished
    }
}

pub type RegisterSchemaResult = RegistrationResult<AnonCredsSchema>;
pub type RegisterCredDefResult = RegistrationResult<AnonCredsCredDef>;
pub type RegisterRevRegDefResult = RegistrationResult<AnonCredsRevRegDef>;
pub type RegisterRevListResult = RegistrationResult<AnonCredsRevList>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_result_serializes_code_and_message() {
        let err = AnonCredsError::NotFound("AnonCreds schema with id 'x' not found".into());
        let result: GetSchemaResult = GetResult::from_error("x", &err);
        assert_eq!(result.error(), Some(ErrorKind::NotFound));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "id": "x",
                "resolutionMetadata": {
                    "error": "notFound",
                    "message": "AnonCreds schema with id 'x' not found",
                },
            })
        );
    }

    #[test]
    fn test_registration_states() {
        let ok = RegistrationResult::finished(1u8, Some("id".into()));
        assert!(ok.is_finished());
        assert_eq!(serde_json::to_value(&ok).unwrap()["state"], "finished");

        let failed = RegistrationResult::failed(1u8, &AnonCredsError::Validation("bad".into()));
        assert!(!failed.is_finished());
        assert_eq!(failed.reason.as_deref(), Some("validationFailure: bad"));
        assert_eq!(serde_json::to_value(&failed).unwrap()["state"], "failed");
    }
}
