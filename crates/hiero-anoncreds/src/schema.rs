use serde::{Deserialize, Serialize};

use crate::payload::JsonPayload;

/// Credential schema: the attribute names a credential carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonCredsSchema {
    pub issuer_id: String,
    pub name: String,
    pub version: String,
    pub attr_names: Vec<String>,
}

impl JsonPayload for AnonCredsSchema {
    const NAME: &'static str = "AnonCredsSchema";
}
