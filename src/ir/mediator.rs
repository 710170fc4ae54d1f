//! The typed flow tree: mediators and the sequences that hold them.
//!
//! Trees are built fresh from the current document for every debugger request and
//! are read-only afterwards.

use serde::{Deserialize, Serialize};

use super::branches::Branching;
use super::kind::{MediatorKind, ShapeClass};
use super::range::SourceRange;

/// An ordered list of mediators; document order is execution order.
///
/// A sequence that only references another one by key (`<sequence key="x"/>` inside a
/// target) has no inline mediators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub range: SourceRange,
    pub key: Option<String>,
    pub mediators: Vec<Mediator>,
}

impl Sequence {
    pub fn new(range: SourceRange, mediators: Vec<Mediator>) -> Self {
        Sequence { range, key: None, mediators }
    }

    pub fn is_empty(&self) -> bool {
        self.mediators.is_empty()
    }

    /// Opening line of the first mediator, where execution enters this sequence.
    pub fn entry_line(&self) -> Option<u32> {
        self.mediators.first().map(|m| m.range().open_line())
    }
}

/// A mediator without nested sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafMediator {
    pub kind: MediatorKind,
    pub range: SourceRange,
}

/// A connector operation such as `<gmail.send>`; the tag is kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorMediator {
    pub tag: String,
    pub range: SourceRange,
}

/// An element whose tag does not map to any known mediator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownMediator {
    pub tag: String,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterMediator {
    pub range: SourceRange,
    pub then_branch: Option<Sequence>,
    pub else_branch: Option<Sequence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub regex: Option<String>,
    pub sequence: Sequence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchMediator {
    pub range: SourceRange,
    pub default_branch: Option<Sequence>,
    pub cases: Vec<SwitchCase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrottleMediator {
    pub range: SourceRange,
    pub on_accept: Option<Sequence>,
    pub on_reject: Option<Sequence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitlementMediator {
    pub range: SourceRange,
    pub on_accept: Option<Sequence>,
    pub on_reject: Option<Sequence>,
    pub advice: Option<Sequence>,
    pub obligations: Option<Sequence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateMediator {
    pub range: SourceRange,
    pub on_fail: Option<Sequence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMediator {
    pub range: SourceRange,
    pub child_mediators: Option<Sequence>,
}

/// A `<target>` of clone or iterate. The nested sequence is absent when the target
/// only names a sequence by key or an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub range: SourceRange,
    pub sequence_key: Option<String>,
    pub sequence: Option<Sequence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloneMediator {
    pub range: SourceRange,
    pub targets: Vec<Target>,
}

/// Iterate and foreach: one wrapped target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetMediator {
    /// `Iterate` or `Foreach`.
    pub kind: MediatorKind,
    pub range: SourceRange,
    pub target: Option<Target>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMediator {
    pub range: SourceRange,
    pub on_complete: Option<Sequence>,
}

/// One node of the flow tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mediator {
    Leaf(LeafMediator),
    Connector(ConnectorMediator),
    Unknown(UnknownMediator),
    Filter(FilterMediator),
    Switch(SwitchMediator),
    Throttle(ThrottleMediator),
    Entitlement(EntitlementMediator),
    Validate(ValidateMediator),
    Rule(RuleMediator),
    Clone(CloneMediator),
    Iterate(TargetMediator),
    Foreach(TargetMediator),
    Aggregate(AggregateMediator),
}

impl Mediator {
    pub fn kind(&self) -> MediatorKind {
        match self {
            Mediator::Leaf(m) => m.kind,
            Mediator::Connector(_) => MediatorKind::Connector,
            Mediator::Unknown(_) => MediatorKind::Unknown,
            Mediator::Filter(_) => MediatorKind::Filter,
            Mediator::Switch(_) => MediatorKind::Switch,
            Mediator::Throttle(_) => MediatorKind::Throttle,
            Mediator::Entitlement(_) => MediatorKind::Entitlement,
            Mediator::Validate(_) => MediatorKind::Validate,
            Mediator::Rule(_) => MediatorKind::Rule,
            Mediator::Clone(_) => MediatorKind::Clone,
            Mediator::Iterate(_) => MediatorKind::Iterate,
            Mediator::Foreach(_) => MediatorKind::Foreach,
            Mediator::Aggregate(_) => MediatorKind::Aggregate,
        }
    }

    pub fn range(&self) -> &SourceRange {
        match self {
            Mediator::Leaf(m) => &m.range,
            Mediator::Connector(m) => &m.range,
            Mediator::Unknown(m) => &m.range,
            Mediator::Filter(m) => &m.range,
            Mediator::Switch(m) => &m.range,
            Mediator::Throttle(m) => &m.range,
            Mediator::Entitlement(m) => &m.range,
            Mediator::Validate(m) => &m.range,
            Mediator::Rule(m) => &m.range,
            Mediator::Clone(m) => &m.range,
            Mediator::Iterate(m) | Mediator::Foreach(m) => &m.range,
            Mediator::Aggregate(m) => &m.range,
        }
    }

    pub fn shape_class(&self) -> ShapeClass {
        self.kind().shape_class()
    }

    /// Branch view of a branching mediator; `None` for leaves.
    pub fn as_branching(&self) -> Option<&dyn Branching> {
        match self {
            Mediator::Leaf(_) | Mediator::Connector(_) | Mediator::Unknown(_) => None,
            Mediator::Filter(m) => Some(m),
            Mediator::Switch(m) => Some(m),
            Mediator::Throttle(m) => Some(m),
            Mediator::Entitlement(m) => Some(m),
            Mediator::Validate(m) => Some(m),
            Mediator::Rule(m) => Some(m),
            Mediator::Clone(m) => Some(m),
            Mediator::Iterate(m) | Mediator::Foreach(m) => Some(m),
            Mediator::Aggregate(m) => Some(m),
        }
    }
}
