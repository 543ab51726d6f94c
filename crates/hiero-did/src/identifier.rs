//! The `did:hedera` identifier.
//!
//! `did:hedera:<network>:z<base58 public key>_<topic id>`

use std::fmt;
use std::str::FromStr;

use hiero_core::TopicId;
use hiero_crypto::{encoding, PublicKey};

use crate::error::DidError;

pub const DID_PREFIX: &str = "did";
pub const HEDERA_METHOD: &str = "hedera";
pub const ROOT_KEY_FRAGMENT: &str = "did-root-key";
pub const DOCUMENT_FRAGMENT: &str = "did-document";

const PUBLIC_KEY_LENGTH: usize = 32;

/// Ledger network a DID lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HederaNetwork {
    Mainnet,
    Testnet,
    Previewnet,
    LocalNode,
}

impl HederaNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Previewnet => "previewnet",
            Self::LocalNode => "local-node",
        }
    }
}

impl FromStr for HederaNetwork {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "previewnet" => Ok(Self::Previewnet),
            "local-node" => Ok(Self::LocalNode),
            _ => Err(DidError::UnknownNetwork(
                "DID string is invalid. Invalid Hedera network.".into(),
            )),
        }
    }
}

impl fmt::Display for HederaNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed Hedera DID.
///
/// The key segment is only checked for length here; it is decoded into a
/// curve point when a signature has to be verified against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HederaDidIdentifier {
    network: HederaNetwork,
    public_key: [u8; PUBLIC_KEY_LENGTH],
    topic_id: TopicId,
}

impl HederaDidIdentifier {
    pub fn new(network: HederaNetwork, public_key: &PublicKey, topic_id: TopicId) -> Self {
        Self {
            network,
            public_key: *public_key.as_bytes(),
            topic_id,
        }
    }

    pub fn parse(identifier: &str) -> Result<Self, DidError> {
        let invalid_format =
            || DidError::InvalidDid("DID string is invalid. ID holds incorrect format.".into());

        let (did_part, topic_part) = match identifier.split('_').collect::<Vec<_>>().as_slice() {
            [_] => {
                return Err(DidError::InvalidDid(
                    "DID string is invalid: topic ID is missing".into(),
                ))
            }
            [did_part, topic_part] => (*did_part, *topic_part),
            _ => return Err(invalid_format()),
        };

        let &[prefix, method, network, key] = did_part.split(':').collect::<Vec<_>>().as_slice() else {
            return Err(invalid_format());
        };
        if prefix != DID_PREFIX {
            return Err(invalid_format());
        }
        if method != HEDERA_METHOD {
            return Err(DidError::InvalidDid(format!(
                "DID string is invalid: invalid method name: {}",
                method
            )));
        }
        let network: HederaNetwork = network.parse()?;

        let public_key: [u8; PUBLIC_KEY_LENGTH] = encoding::multibase_decode(key)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(invalid_format)?;

        if !is_topic_id_pattern(topic_part) {
            return Err(DidError::InvalidDid(
                "DID string is invalid. Topic ID doesn't match pattern".into(),
            ));
        }
        let topic_id = topic_part.parse().map_err(|_| {
            DidError::InvalidDid("DID string is invalid. Topic ID doesn't match pattern".into())
        })?;

        Ok(Self {
            network,
            public_key,
            topic_id,
        })
    }

    pub fn network(&self) -> HederaNetwork {
        self.network
    }

    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    /// The key embedded in the identifier.
    pub fn public_key(&self) -> Result<PublicKey, DidError> {
        Ok(PublicKey::from_bytes(&self.public_key)?)
    }

    pub fn root_key_id(&self) -> String {
        format!("{}#{}", self, ROOT_KEY_FRAGMENT)
    }

    pub fn document_id(&self) -> String {
        format!("{}#{}", self, DOCUMENT_FRAGMENT)
    }
}

impl FromStr for HederaDidIdentifier {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HederaDidIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}_{}",
            DID_PREFIX,
            HEDERA_METHOD,
            self.network,
            encoding::multibase_encode(&self.public_key),
            self.topic_id
        )
    }
}

fn is_topic_id_pattern(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

/// Shape of the fragment an event id must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// `#service-<n>`
    Service,
    /// `#key-<n>`
    Key,
    /// `#did-root-key`
    RootKey,
    /// `#did-document`
    Document,
}

impl FragmentKind {
    fn matches(&self, fragment: &str) -> bool {
        let numbered = |prefix: &str| {
            fragment.strip_prefix(prefix).is_some_and(|n| {
                !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())
            })
        };
        match self {
            Self::Service => numbered("service-"),
            Self::Key => numbered("key-"),
            Self::RootKey => fragment == ROOT_KEY_FRAGMENT,
            Self::Document => fragment == DOCUMENT_FRAGMENT,
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            Self::Service => "{did}#service-{number}",
            Self::Key => "{did}#key-{number}",
            Self::RootKey => "{did}#did-root-key",
            Self::Document => "{did}#did-document",
        }
    }
}

/// Split `<did>#<fragment>` and check both halves.
pub fn parse_fragment_id(id: &str, kind: FragmentKind) -> Result<HederaDidIdentifier, DidError> {
    let invalid = || {
        DidError::InvalidEvent(format!(
            "Event ID is invalid. Expected format: {}",
            kind.expected()
        ))
    };
    let (did, fragment) = id.split_once('#').ok_or_else(invalid)?;
    if !kind.matches(fragment) {
        return Err(invalid());
    }
    HederaDidIdentifier::parse(did).map_err(|_| invalid())
}

/// The DID part of an id, with any fragment removed.
pub fn base_did(id: &str) -> &str {
    id.split_once('#').map_or(id, |(did, _)| did)
}
