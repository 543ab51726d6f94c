//! Event-sourced DID document projection.
//!
//! `apply` is a pure transition over [`DidProjection`]; `step` adds the
//! envelope checks and logging, and `project` folds a resolved message
//! sequence in feed order.

use std::collections::HashMap;

use hiero_core::Timestamp;
use hiero_crypto::PublicKey;
use hiero_hcs::HcsMessageWithResponseMetadata;

use crate::document::{DidDocument, VerificationRelationshipType};
use crate::event::DidEvent;
use crate::identifier::{base_did, HederaDidIdentifier, ROOT_KEY_FRAGMENT};
use crate::message::HcsDidMessageEnvelope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// No owner yet; everything except an owner or external document is ignored.
    Bootstrapping,
    Active,
    /// Terminal.
    Deactivated,
}

/// Why an event left the projection unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventRejection {
    #[error("event ignored in state {0:?}")]
    Ignored(DocumentState),
    #[error("{0}")]
    Rejected(String),
}

/// Accumulator of the document fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidProjection {
    identifier: HederaDidIdentifier,
    document: DidDocument,
    state: DocumentState,
    root_key: Option<PublicKey>,
    root_key_id: Option<String>,
}

impl DidProjection {
    pub fn new(identifier: HederaDidIdentifier) -> Self {
        Self {
            document: DidDocument::new(identifier.to_string()),
            identifier,
            state: DocumentState::Bootstrapping,
            root_key: None,
            root_key_id: None,
        }
    }

    pub fn identifier(&self) -> &HederaDidIdentifier {
        &self.identifier
    }

    pub fn document(&self) -> &DidDocument {
        &self.document
    }

    pub fn into_document(self) -> DidDocument {
        self.document
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    /// Key the next non-bootstrap event must be signed with.
    pub fn root_key(&self) -> Option<&PublicKey> {
        self.root_key.as_ref()
    }

    /// Target and signature checks for an envelope against the current state.
    pub fn authenticate(&self, envelope: &HcsDidMessageEnvelope) -> Result<(), EventRejection> {
        let message = &envelope.message;
        let event = &message.event;
        let did = &self.document.id;

        if self.state == DocumentState::Deactivated {
            return Err(EventRejection::Ignored(self.state));
        }
        let bootstrap_key = match (self.state, event) {
            (DocumentState::Bootstrapping, DidEvent::CreateOwner(owner)) => Some(owner.public_key),
            (DocumentState::Bootstrapping, DidEvent::CreateDocumentFromExternal(_)) => Some(
                self.identifier
                    .public_key()
                    .map_err(|e| EventRejection::Rejected(e.to_string()))?,
            ),
            (DocumentState::Bootstrapping, _) => return Err(EventRejection::Ignored(self.state)),
            _ => None,
        };

        if message.did != *did {
            return Err(EventRejection::Rejected(format!(
                "message addressed to {} applied to {}",
                message.did, did
            )));
        }
        let references_owner = matches!(event, DidEvent::CreateOwner(_) | DidEvent::UpdateOwner(_));
        if let Some(id) = event.id() {
            if !references_owner && base_did(id) != did {
                return Err(EventRejection::Rejected(format!(
                    "event {} does not reference {}",
                    id, did
                )));
            }
        }

        let key = bootstrap_key
            .or(self.root_key)
            .ok_or_else(|| EventRejection::Rejected("document has no root key".into()))?;
        envelope
            .verify_signature(&key)
            .map_err(|e| EventRejection::Rejected(format!("signature check failed: {}", e)))
    }

    /// Apply one event at consensus time `at`. `external` carries the fetched
    /// document for external document events.
    pub fn apply(
        &self,
        event: &DidEvent,
        at: Timestamp,
        external: Option<&DidDocument>,
    ) -> Result<Self, EventRejection> {
        let mut next = self.clone();
        match (self.state, event) {
            (DocumentState::Deactivated, _) => return Err(EventRejection::Ignored(self.state)),

            (DocumentState::Bootstrapping, DidEvent::CreateOwner(owner)) => {
                let method = owner.verification_method();
                next.document.controller = Some(owner.controller.clone());
                next.document.add_relationship(VerificationRelationshipType::Authentication, &method.id);
                next.document.add_relationship(VerificationRelationshipType::AssertionMethod, &method.id);
                next.document.upsert_verification_method(method);
                next.document.created = Some(at);
                next.root_key = Some(owner.public_key);
                next.root_key_id = Some(owner.id.clone());
            }
            (_, DidEvent::CreateDocumentFromExternal(doc_event)) => {
                let external = external.ok_or_else(|| {
                    EventRejection::Rejected(format!("external document {} unavailable", doc_event.cid))
                })?;
                next.replace_with_external(external, at)?;
            }
            (DocumentState::Bootstrapping, _) => return Err(EventRejection::Ignored(self.state)),

            (DocumentState::Active, DidEvent::CreateOwner(_)) => {
                return Err(EventRejection::Rejected("document already has an owner".into()))
            }
            (DocumentState::Active, DidEvent::UpdateOwner(owner)) => {
                let old_id = self.current_root_key_id();
                let method = owner.verification_method();
                let methods = &mut next.document.verification_methods;
                if old_id != method.id {
                    methods.retain(|vm| vm.id != method.id);
                }
                match methods.iter().position(|vm| vm.id == old_id) {
                    Some(pos) => methods[pos] = method.clone(),
                    None => methods.push(method.clone()),
                }
                for kind in VerificationRelationshipType::ALL {
                    let references_old = next.document.relationship(kind).contains(&old_id);
                    if references_old
                        || matches!(
                            kind,
                            VerificationRelationshipType::Authentication
                                | VerificationRelationshipType::AssertionMethod
                        )
                    {
                        next.document.replace_relationship(kind, &old_id, &method.id);
                    }
                }
                next.document.controller = Some(owner.controller.clone());
                next.root_key = Some(owner.public_key);
                next.root_key_id = Some(owner.id.clone());
            }
            (DocumentState::Active, DidEvent::DeleteDocument) => {
                next.document.deactivated = true;
                next.document.clear_contents();
                next.state = DocumentState::Deactivated;
            }
            (DocumentState::Active, DidEvent::UpsertService(service)) => {
                next.document.upsert_service(service.service());
            }
            (DocumentState::Active, DidEvent::RevokeService(revoke)) => {
                if !next.document.remove_service(&revoke.id) {
                    return Err(EventRejection::Rejected(format!("service {} not found", revoke.id)));
                }
            }
            (DocumentState::Active, DidEvent::UpsertVerificationMethod(method)) => {
                next.document.upsert_verification_method(method.verification_method());
            }
            (DocumentState::Active, DidEvent::RevokeVerificationMethod(revoke)) => {
                if revoke.id == self.current_root_key_id() {
                    return Err(EventRejection::Rejected("root key cannot be revoked".into()));
                }
                if !next.document.remove_verification_method(&revoke.id) {
                    return Err(EventRejection::Rejected(format!(
                        "verification method {} not found",
                        revoke.id
                    )));
                }
            }
            (DocumentState::Active, DidEvent::UpsertVerificationRelationship(relationship)) => {
                let method = relationship.method.verification_method();
                next.document.add_relationship(relationship.relationship_type, &method.id);
                next.document.upsert_verification_method(method);
            }
            (DocumentState::Active, DidEvent::RevokeVerificationRelationship(revoke)) => {
                if !next
                    .document
                    .remove_relationship(revoke.relationship_type, &revoke.id)
                {
                    return Err(EventRejection::Rejected(format!(
                        "{} reference {} not found",
                        revoke.relationship_type, revoke.id
                    )));
                }
            }
        }

        if next.state == DocumentState::Bootstrapping {
            next.state = DocumentState::Active;
        }
        next.document.updated = Some(at);
        next.document.version_id = Some(at.to_string());
        Ok(next)
    }

    /// Authenticate and apply one resolved message, keeping the current
    /// projection when the event is ignored or rejected.
    pub fn step(
        self,
        message: &HcsMessageWithResponseMetadata<HcsDidMessageEnvelope>,
        external: Option<&DidDocument>,
    ) -> Self {
        let event = &message.message.message.event;
        let outcome = self
            .authenticate(&message.message)
            .and_then(|()| self.apply(event, message.consensus_timestamp, external));

        match outcome {
            Ok(next) => {
                if next.state != self.state {
                    tracing::debug!(
                        did = %self.document.id,
                        sequence = message.sequence_number,
                        from = ?self.state,
                        to = ?next.state,
                        "DID document state changed"
                    );
                }
                next
            }
            Err(EventRejection::Ignored(state)) => {
                tracing::debug!(
                    did = %self.document.id,
                    sequence = message.sequence_number,
                    state = ?state,
                    "DID event ignored"
                );
                self
            }
            Err(EventRejection::Rejected(reason)) => {
                tracing::warn!(
                    did = %self.document.id,
                    sequence = message.sequence_number,
                    reason = %reason,
                    "DID event rejected"
                );
                self
            }
        }
    }

    fn current_root_key_id(&self) -> String {
        self.root_key_id
            .clone()
            .unwrap_or_else(|| self.identifier.root_key_id())
    }

    fn replace_with_external(
        &mut self,
        external: &DidDocument,
        at: Timestamp,
    ) -> Result<(), EventRejection> {
        if external.id != self.document.id {
            return Err(EventRejection::Rejected(format!(
                "external document describes {}, expected {}",
                external.id, self.document.id
            )));
        }

        let root = external
            .verification_methods
            .iter()
            .find(|vm| vm.id.ends_with(&format!("#{}", ROOT_KEY_FRAGMENT)));
        let (root_key, root_key_id) = match root {
            Some(vm) => (
                PublicKey::from_bs58(&vm.public_key_base58)
                    .map_err(|e| EventRejection::Rejected(format!("external root key: {}", e)))?,
                vm.id.clone(),
            ),
            None => (
                self.identifier
                    .public_key()
                    .map_err(|e| EventRejection::Rejected(e.to_string()))?,
                self.identifier.root_key_id(),
            ),
        };

        let created = self.document.created.unwrap_or(at);
        self.document = external.clone();
        self.document.created = Some(created);
        self.document.deactivated = false;
        self.root_key = Some(root_key);
        self.root_key_id = Some(root_key_id);
        Ok(())
    }
}

/// Fold resolved messages in feed order. External documents are looked up
/// by content id in `externals`.
pub fn project(
    identifier: HederaDidIdentifier,
    messages: &[HcsMessageWithResponseMetadata<HcsDidMessageEnvelope>],
    externals: &HashMap<String, DidDocument>,
) -> DidProjection {
    messages
        .iter()
        .fold(DidProjection::new(identifier), |projection, message| {
            let external = match &message.message.message.event {
                DidEvent::CreateDocumentFromExternal(e) => externals.get(&e.cid),
                _ => None,
            };
            projection.step(message, external)
        })
}
