//! Hiero DID: The `did:hedera` method over HCS topics.
//!
//! - Identifier parsing and formatting
//! - DID events and their signed message envelopes
//! - The event-sourced document projection
//! - Resolution (`HederaDidResolver`) and writes (`HederaDid`)

pub mod did;
pub mod document;
pub mod error;
pub mod event;
pub mod identifier;
pub mod message;
pub mod projection;
pub mod resolver;

pub use did::HederaDid;
pub use document::{DidDocument, Service, VerificationMethod, VerificationRelationshipType};
pub use error::DidError;
pub use event::{DidDocumentOperation, DidEvent};
pub use identifier::{HederaDidIdentifier, HederaNetwork};
pub use message::{HcsDidMessage, HcsDidMessageEnvelope};
pub use projection::{project, DidProjection, DocumentState, EventRejection};
pub use resolver::{
    DidResolutionResult, DidResolver, DocumentFetcher, HederaDidResolver, IpfsDocumentFetcher,
    StaticDocumentFetcher,
};
