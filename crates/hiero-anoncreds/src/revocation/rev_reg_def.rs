use serde::{Deserialize, Serialize};

use hiero_core::TopicId;

use crate::error::AnonCredsError;
use crate::payload::JsonPayload;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevocationType {
    #[default]
    #[serde(rename = "CL_ACCUM")]
    ClAccum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumKey {
    pub z: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevRegDefPublicKeys {
    pub accum_key: AccumKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevRegDefValue {
    pub public_keys: RevRegDefPublicKeys,
    pub max_cred_num: u32,
    pub tails_location: String,
    pub tails_hash: String,
}

impl JsonPayload for RevRegDefValue {
    const NAME: &'static str = "RevRegDefValue";
}

/// Revocation registry definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonCredsRevRegDef {
    pub issuer_id: String,
    #[serde(rename = "type", alias = "revocDefType", default)]
    pub revocation_type: RevocationType,
    pub cred_def_id: String,
    pub tag: String,
    pub value: RevRegDefValue,
}

impl AnonCredsRevRegDef {
    pub fn new(
        issuer_id: impl Into<String>,
        cred_def_id: impl Into<String>,
        tag: impl Into<String>,
        value: RevRegDefValue,
    ) -> Self {
        Self {
            issuer_id: issuer_id.into(),
            revocation_type: RevocationType::ClAccum,
            cred_def_id: cred_def_id.into(),
            tag: tag.into(),
            value,
        }
    }
}

impl JsonPayload for AnonCredsRevRegDef {
    const NAME: &'static str = "AnonCredsRevRegDef";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HcsMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries_topic_id: Option<TopicId>,
}

/// A definition as stored on HCS: the definition plus the topic its entries
/// are published to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevRegDefWithHcsMetadata {
    pub rev_reg_def: AnonCredsRevRegDef,
    #[serde(default)]
    pub hcs_metadata: HcsMetadata,
}

impl RevRegDefWithHcsMetadata {
    pub fn entries_topic_id(&self) -> Result<TopicId, AnonCredsError> {
        self.hcs_metadata.entries_topic_id.ok_or_else(|| {
            AnonCredsError::NotFound(
                "Entries topic ID is missing from revocation registry metadata".into(),
            )
        })
    }
}

impl JsonPayload for RevRegDefWithHcsMetadata {
    const NAME: &'static str = "RevRegDefWithHcsMetadata";
}
