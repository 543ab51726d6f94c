use std::fmt;
use std::str::FromStr;

use hiero_core::TopicId;
use hiero_did::HederaDidIdentifier;

use crate::error::AnonCredsError;

pub const ANONCREDS_IDENTIFIER_SEPARATOR: char = '/';
pub const ANONCREDS_OBJECT_FAMILY: &str = "anoncreds";
pub const ANONCREDS_VERSION: &str = "v0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnonCredsObjectType {
    Schema,
    PublicCredDef,
    RevReg,
    RevRegEntry,
}

impl AnonCredsObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schema => "SCHEMA",
            Self::PublicCredDef => "PUBLIC_CRED_DEF",
            Self::RevReg => "REV_REG",
            Self::RevRegEntry => "REV_REG_ENTRY",
        }
    }
}

impl FromStr for AnonCredsObjectType {
    type Err = AnonCredsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEMA" => Ok(Self::Schema),
            "PUBLIC_CRED_DEF" => Ok(Self::PublicCredDef),
            "REV_REG" => Ok(Self::RevReg),
            "REV_REG_ENTRY" => Ok(Self::RevRegEntry),
            _ => Err(AnonCredsError::InvalidIdentifier(
                "Invalid AnonCreds object type".into(),
            )),
        }
    }
}

impl fmt::Display for AnonCredsObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<publisher_did>/anoncreds/v0/<TYPE>/<topic_id>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonCredsIdentifier {
    pub publisher_did: String,
    pub object_type: AnonCredsObjectType,
    pub topic_id: TopicId,
}

impl AnonCredsIdentifier {
    pub fn new(
        publisher_did: impl Into<String>,
        topic_id: TopicId,
        object_type: AnonCredsObjectType,
    ) -> Self {
        Self {
            publisher_did: publisher_did.into(),
            object_type,
            topic_id,
        }
    }

    pub fn parse(identifier: &str) -> Result<Self, AnonCredsError> {
        let parts: Vec<&str> = identifier.split(ANONCREDS_IDENTIFIER_SEPARATOR).collect();
        let &[publisher_did, family, version, object_type, topic_id] = parts.as_slice() else {
            return Err(AnonCredsError::InvalidIdentifier(
                "Identifier has invalid structure".into(),
            ));
        };

        if family != ANONCREDS_OBJECT_FAMILY || version != ANONCREDS_VERSION {
            return Err(AnonCredsError::InvalidIdentifier(
                "Identifier contains invalid object definition".into(),
            ));
        }
        let object_type: AnonCredsObjectType = object_type.parse()?;

        HederaDidIdentifier::parse(publisher_did).map_err(|e| {
            AnonCredsError::InvalidIdentifier(format!("Cannot parse issuer identifier: {}", e))
        })?;
        let topic_id: TopicId = topic_id.parse().map_err(|_| {
            AnonCredsError::InvalidIdentifier(format!("Invalid topic ID '{}'", topic_id))
        })?;

        Ok(Self {
            publisher_did: publisher_did.to_string(),
            object_type,
            topic_id,
        })
    }
}

impl FromStr for AnonCredsIdentifier {
    type Err = AnonCredsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AnonCredsIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.publisher_did,
            ANONCREDS_OBJECT_FAMILY,
            ANONCREDS_VERSION,
            self.object_type,
            self.topic_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLISHER_DID_1: &str =
        "did:hedera:testnet:z87meAWt7t2zrDxo7qw3PVTjexKWReYWS75LH29THy8kb_0.0.29613327";
    const PUBLISHER_DID_2: &str =
        "did:hedera:testnet:z87meAWt7t2zrDxo7qw3PVTjexKWReYWS75LH29THy8kb_0.0.29613330";

    #[test]
    fn test_build_and_parse() {
        let cases = [
            (PUBLISHER_DID_1, AnonCredsObjectType::Schema, TopicId::new(0, 0, 29613330)),
            (PUBLISHER_DID_2, AnonCredsObjectType::PublicCredDef, TopicId::new(0, 0, 29613340)),
            (PUBLISHER_DID_1, AnonCredsObjectType::RevReg, TopicId::new(0, 0, 29613340)),
            (PUBLISHER_DID_2, AnonCredsObjectType::RevRegEntry, TopicId::new(0, 0, 29613340)),
        ];
        for (did, object_type, topic_id) in cases {
            let identifier = AnonCredsIdentifier::new(did, topic_id, object_type).to_string();
            assert_eq!(
                identifier,
                format!("{did}/anoncreds/v0/{}/{topic_id}", object_type.as_str())
            );

            let parsed = AnonCredsIdentifier::parse(&identifier).unwrap();
            assert_eq!(parsed.publisher_did, did);
            assert_eq!(parsed.object_type, object_type);
            assert_eq!(parsed.topic_id, topic_id);
        }
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            ("invalid_identifier".to_string(), "Identifier has invalid structure"),
            (
                format!("{PUBLISHER_DID_1}/non-anoncreds/v0/SCHEMA/0.0.29613330"),
                "Identifier contains invalid object definition",
            ),
            (
                format!("{PUBLISHER_DID_1}/anoncreds/v0/INVALID_TYPE/0.0.29613330"),
                "Invalid AnonCreds object type",
            ),
            (
                "invalid_did/anoncreds/v0/SCHEMA/0.0.29613330".to_string(),
                "Cannot parse issuer identifier",
            ),
        ];
        for (identifier, expected) in cases {
            let err = AnonCredsIdentifier::parse(&identifier).unwrap_err();
            assert_eq!(err.kind(), hiero_core::ErrorKind::InvalidIdentifier);
            assert!(err.to_string().contains(expected), "{identifier}: {err}");
        }
    }
}
