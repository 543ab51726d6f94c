//! Hiero AnonCreds: An AnonCreds registry over HCS.
//!
//! Schemas, credential definitions and revocation registry definitions are
//! stored as HCS-1 files. Revocation lists are published as delta entries on
//! a per-registry topic and folded back on resolution.

pub mod cred_def;
pub mod error;
pub mod identifier;
pub mod payload;
pub mod registry;
pub mod results;
pub mod revocation;
pub mod schema;

pub use cred_def::{
    AnonCredsCredDef, CredDefValue, CredDefValuePrimary, CredDefValueRevocation, SignatureType,
};
pub use error::AnonCredsError;
pub use identifier::{AnonCredsIdentifier, AnonCredsObjectType};
pub use payload::JsonPayload;
pub use registry::{CachedObject, HederaAnonCredsRegistry, RevRegEntryWithMetadata};
pub use results::{
    GetCredDefResult, GetResult, GetRevListResult, GetRevRegDefResult, GetSchemaResult,
    RegisterCredDefResult, RegisterRevListResult, RegisterRevRegDefResult, RegisterSchemaResult,
    RegistrationResult, RegistrationState, ResolutionMetadata,
};
pub use revocation::{
    AccumKey, AnonCredsRevList, AnonCredsRevRegDef, AnonCredsRevRegEntry, HcsMetadata,
    RevRegDefPublicKeys, RevRegDefValue, RevRegDefWithHcsMetadata, RevRegEntryValue,
    RevocationType,
};
pub use schema::AnonCredsSchema;
