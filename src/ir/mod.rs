//! Typed flow tree: source ranges, mediators, root artifacts and the dispatch visitor.

pub mod artifact;
pub mod branches;
pub mod kind;
pub mod mediator;
pub mod range;
pub mod visitor;

pub use artifact::{Api, ApiResource, Artifact, FlowDirection, NamedSequence, Proxy, ProxyTarget, SequenceSet, SequenceTemplate};
pub use branches::{Branch, Branching};
pub use kind::{MediatorKind, ShapeClass};
pub use mediator::{
    AggregateMediator, CloneMediator, ConnectorMediator, EntitlementMediator, FilterMediator,
    LeafMediator, Mediator, RuleMediator, Sequence, SwitchCase, SwitchMediator, Target,
    TargetMediator, ThrottleMediator, UnknownMediator, ValidateMediator,
};
pub use range::{RangeError, SourceRange};
pub use visitor::MediatorVisitor;
