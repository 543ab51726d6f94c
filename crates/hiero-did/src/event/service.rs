use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::parse_target;
use crate::document::Service;
use crate::error::DidError;
use crate::identifier::{parse_fragment_id, FragmentKind};

pub(super) const EVENT_NAME: &str = "Service event";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEvent {
    pub id: String,
    pub service_type: String,
    pub service_endpoint: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceWire {
    id: String,
    #[serde(rename = "type")]
    service_type: String,
    service_endpoint: String,
}

impl ServiceEvent {
    pub fn new(
        id: impl Into<String>,
        service_type: impl Into<String>,
        service_endpoint: impl Into<String>,
    ) -> Result<Self, DidError> {
        let id = id.into();
        parse_fragment_id(&id, FragmentKind::Service)?;
        Ok(Self {
            id,
            service_type: service_type.into(),
            service_endpoint: service_endpoint.into(),
        })
    }

    pub fn service(&self) -> Service {
        Service {
            id: self.id.clone(),
            service_type: self.service_type.clone(),
            service_endpoint: self.service_endpoint.clone(),
        }
    }

    pub(super) fn to_json(&self) -> Value {
        let wire = ServiceWire {
            id: self.id.clone(),
            service_type: self.service_type.clone(),
            service_endpoint: self.service_endpoint.clone(),
        };
        serde_json::to_value(wire).unwrap_or(Value::Null)
    }

    pub(super) fn from_json(value: &Value) -> Result<Self, DidError> {
        let wire: ServiceWire = parse_target(value, EVENT_NAME)?;
        Self::new(wire.id, wire.service_type, wire.service_endpoint)
    }
}
