use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::payload::JsonPayload;

/// Signature scheme of a credential definition. Only CL is defined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureType {
    #[default]
    #[serde(rename = "CL")]
    Cl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredDefValuePrimary {
    pub n: String,
    pub s: String,
    pub r: BTreeMap<String, String>,
    pub rctxt: String,
    pub z: String,
}

impl JsonPayload for CredDefValuePrimary {
    const NAME: &'static str = "CredDefValuePrimary";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredDefValueRevocation {
    pub g: String,
    pub g_dash: String,
    pub h: String,
    pub h0: String,
    pub h1: String,
    pub h2: String,
    pub htilde: String,
    pub h_cap: String,
    pub u: String,
    pub pk: String,
    pub y: String,
}

impl JsonPayload for CredDefValueRevocation {
    const NAME: &'static str = "CredDefValueRevocation";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredDefValue {
    pub primary: CredDefValuePrimary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation: Option<CredDefValueRevocation>,
}

impl JsonPayload for CredDefValue {
    const NAME: &'static str = "CredDefValue";
}

/// Public credential definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonCredsCredDef {
    pub issuer_id: String,
    pub schema_id: String,
    #[serde(rename = "type", default)]
    pub signature_type: SignatureType,
    pub tag: String,
    pub value: CredDefValue,
}

impl AnonCredsCredDef {
    pub fn new(
        issuer_id: impl Into<String>,
        schema_id: impl Into<String>,
        tag: impl Into<String>,
        value: CredDefValue,
    ) -> Self {
        Self {
            issuer_id: issuer_id.into(),
            schema_id: schema_id.into(),
            signature_type: SignatureType::Cl,
            tag: tag.into(),
            value,
        }
    }
}

impl JsonPayload for AnonCredsCredDef {
    const NAME: &'static str = "AnonCredsCredDef";
}
