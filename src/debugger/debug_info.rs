//! Per-breakpoint results and the command payload sent to the runtime debugger.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use crate::ir::artifact::FlowDirection;

use super::error::ResolveError;
use super::position::MediatorPosition;

/// Sequence kind tag understood by the runtime debugger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceType {
    ApiIn,
    ApiOut,
    ApiFault,
    ProxyIn,
    ProxyOut,
    ProxyFault,
    Named,
    Template,
}

impl SequenceType {
    pub fn api(direction: FlowDirection) -> Self {
        match direction {
            FlowDirection::In => SequenceType::ApiIn,
            FlowDirection::Out => SequenceType::ApiOut,
            FlowDirection::Fault => SequenceType::ApiFault,
        }
    }

    pub fn proxy(direction: FlowDirection) -> Self {
        match direction {
            FlowDirection::In => SequenceType::ProxyIn,
            FlowDirection::Out => SequenceType::ProxyOut,
            FlowDirection::Fault => SequenceType::ProxyFault,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceType::ApiIn => "api_inseq",
            SequenceType::ApiOut => "api_outseq",
            SequenceType::ApiFault => "api_faultseq",
            SequenceType::ProxyIn => "proxy_inseq",
            SequenceType::ProxyOut => "proxy_outseq",
            SequenceType::ProxyFault => "proxy_faultseq",
            SequenceType::Named => "named",
            SequenceType::Template => "template",
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SequenceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Key of the API resource a breakpoint falls into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourceKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_mapping: Option<String>,
}

/// Where in the artifact a breakpoint was resolved.
///
/// Fields stay `None` when resolution stopped before reaching that level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "artifact", rename_all = "kebab-case")]
pub enum DebugContext {
    #[serde(rename_all = "kebab-case")]
    Api {
        api_key: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        resource: Option<ResourceKey>,
        #[serde(skip_serializing_if = "Option::is_none")]
        sequence_type: Option<SequenceType>,
    },
    #[serde(rename_all = "kebab-case")]
    Proxy {
        proxy_key: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        sequence_type: Option<SequenceType>,
    },
    #[serde(rename_all = "kebab-case")]
    Sequence { sequence_key: String },
    #[serde(rename_all = "kebab-case")]
    Template { template_key: String },
}

impl DebugContext {
    pub fn sequence_type(&self) -> Option<SequenceType> {
        match self {
            DebugContext::Api { sequence_type, .. } | DebugContext::Proxy { sequence_type, .. } => {
                *sequence_type
            }
            DebugContext::Sequence { .. } => Some(SequenceType::Named),
            DebugContext::Template { .. } => Some(SequenceType::Template),
        }
    }
}

/// Immutable result for one breakpoint: its context plus a position or the reason
/// there is none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugInfo {
    context: DebugContext,
    outcome: Result<MediatorPosition, ResolveError>,
}

impl DebugInfo {
    pub fn new(context: DebugContext, outcome: Result<MediatorPosition, ResolveError>) -> Self {
        DebugInfo { context, outcome }
    }

    pub fn resolved(context: DebugContext, position: MediatorPosition) -> Self {
        DebugInfo::new(context, Ok(position))
    }

    pub fn invalid(context: DebugContext, error: ResolveError) -> Self {
        DebugInfo::new(context, Err(error))
    }

    pub fn is_valid(&self) -> bool {
        self.outcome.is_ok()
    }

    /// User-facing error message of an invalid breakpoint.
    pub fn error(&self) -> Option<String> {
        self.outcome.as_ref().err().map(ToString::to_string)
    }

    pub fn resolve_error(&self) -> Option<&ResolveError> {
        self.outcome.as_ref().err()
    }

    pub fn mediator_position(&self) -> Option<&MediatorPosition> {
        self.outcome.as_ref().ok()
    }

    pub fn context(&self) -> &DebugContext {
        &self.context
    }

    /// Command payload that installs this breakpoint in the runtime debugger.
    ///
    /// `None` for invalid breakpoints; they are only reported back to the user.
    pub fn to_json(&self) -> Option<Value> {
        let position = self.mediator_position()?.to_string();
        let payload = match &self.context {
            DebugContext::Api { api_key, resource, sequence_type } => json!({
                "mediation-component": "sequence",
                "sequence": {
                    "api": {
                        "api-key": api_key,
                        "resource": resource,
                        "sequence-type": sequence_type,
                        "mediator-position": position,
                    }
                }
            }),
            DebugContext::Proxy { proxy_key, sequence_type } => json!({
                "mediation-component": "sequence",
                "sequence": {
                    "proxy": {
                        "proxy-key": proxy_key,
                        "sequence-type": sequence_type,
                        "mediator-position": position,
                    }
                }
            }),
            DebugContext::Sequence { sequence_key } => json!({
                "mediation-component": "sequence",
                "sequence": {
                    "sequence-type": SequenceType::Named,
                    "sequence-key": sequence_key,
                    "mediator-position": position,
                }
            }),
            DebugContext::Template { template_key } => json!({
                "mediation-component": "template",
                "template": {
                    "template-key": template_key,
                    "mediator-position": position,
                }
            }),
        };
        Some(payload)
    }
}

#[derive(Serialize)]
struct DebugInfoRecord<'a> {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(rename = "mediator-position", skip_serializing_if = "Option::is_none")]
    mediator_position: Option<&'a MediatorPosition>,
    #[serde(flatten)]
    context: &'a DebugContext,
}

impl Serialize for DebugInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DebugInfoRecord {
            valid: self.is_valid(),
            error: self.error(),
            mediator_position: self.mediator_position(),
            context: &self.context,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::error::Container;

    fn api_context() -> DebugContext {
        DebugContext::Api {
            api_key: "OrderAPI".to_string(),
            resource: Some(ResourceKey {
                method: Some("GET".to_string()),
                uri_template: Some("/{id}".to_string()),
                url_mapping: None,
            }),
            sequence_type: Some(SequenceType::ApiIn),
        }
    }

    #[test]
    fn test_api_command_payload() {
        let info = DebugInfo::resolved(api_context(), "0 2 0".parse().unwrap());
        assert_eq!(
            info.to_json().unwrap(),
            json!({
                "mediation-component": "sequence",
                "sequence": {
                    "api": {
                        "api-key": "OrderAPI",
                        "resource": {"method": "GET", "uri-template": "/{id}"},
                        "sequence-type": "api_inseq",
                        "mediator-position": "0 2 0",
                    }
                }
            })
        );
    }

    #[test]
    fn test_invalid_record() {
        let info = DebugInfo::invalid(
            DebugContext::Sequence { sequence_key: "main".to_string() },
            ResolveError::NotInRange(Container::NamedSequence),
        );
        assert!(!info.is_valid());
        assert!(info.mediator_position().is_none());
        assert!(info.to_json().is_none());
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({
                "valid": false,
                "error": "breakpoint not in range of Sequence",
                "artifact": "sequence",
                "sequence-key": "main",
            })
        );
    }

    #[test]
    fn test_valid_record_serialization() {
        let info = DebugInfo::resolved(
            DebugContext::Template { template_key: "retry".to_string() },
            MediatorPosition::new(3),
        );
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({
                "valid": true,
                "mediator-position": "3",
                "artifact": "template",
                "template-key": "retry",
            })
        );
        assert_eq!(info.context().sequence_type(), Some(SequenceType::Template));
    }
}
