//! Per-kind mediator builders.

use tracing::{trace, warn};

use crate::ir::kind::{MediatorKind, normalize_tag};
use crate::ir::mediator::{
    AggregateMediator, CloneMediator, ConnectorMediator, EntitlementMediator, FilterMediator,
    LeafMediator, Mediator, RuleMediator, Sequence, SwitchCase, SwitchMediator, Target,
    TargetMediator, ThrottleMediator, UnknownMediator, ValidateMediator,
};
use crate::parsers::dom::{DomNode, child_named, children_named};

use super::{BuildError, range_of};

/// Elements that may sit between mediators without being one.
fn is_annotation(tag: &str) -> bool {
    matches!(normalize_tag(tag).as_str(), "description" | "comment")
}

/// Builds a sequence from any element whose children are mediators
/// (`<sequence>`, `<inSequence>`, `<then>`, `<case>`, `<onAccept>`, ...).
pub fn build_sequence<N: DomNode>(node: &N) -> Result<Sequence, BuildError> {
    Ok(Sequence {
        range: range_of(node)?,
        key: node.attribute("key").map(str::to_string),
        mediators: build_mediators(node)?,
    })
}

/// Builds the mediator children of `node`, in document order.
pub fn build_mediators<N: DomNode>(node: &N) -> Result<Vec<Mediator>, BuildError> {
    node.children()
        .into_iter()
        .filter(|child| !is_annotation(child.tag()))
        .map(build_mediator)
        .collect()
}

fn optional_sequence<N: DomNode>(node: &N, name: &str) -> Result<Option<Sequence>, BuildError> {
    child_named(node, name).map(build_sequence).transpose()
}

/// Builds one mediator, choosing the builder by the element's normalized tag.
pub fn build_mediator<N: DomNode>(node: &N) -> Result<Mediator, BuildError> {
    let range = range_of(node)?;
    let kind = MediatorKind::from_tag(node.tag());
    trace!("Building {:?} from <{}> at line {}", kind, node.tag(), range.start_line());

    let mediator = match kind {
        MediatorKind::Filter => Mediator::Filter(FilterMediator {
            range,
            then_branch: optional_sequence(node, "then")?,
            else_branch: optional_sequence(node, "else")?,
        }),
        MediatorKind::Switch => {
            let cases = children_named(node, "case")
                .into_iter()
                .map(|case| -> Result<SwitchCase, BuildError> {
                    Ok(SwitchCase {
                        regex: case.attribute("regex").map(str::to_string),
                        sequence: build_sequence(case)?,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Mediator::Switch(SwitchMediator {
                range,
                default_branch: optional_sequence(node, "default")?,
                cases,
            })
        }
        MediatorKind::Throttle => Mediator::Throttle(ThrottleMediator {
            range,
            on_accept: optional_sequence(node, "onAccept")?,
            on_reject: optional_sequence(node, "onReject")?,
        }),
        MediatorKind::Entitlement => Mediator::Entitlement(EntitlementMediator {
            range,
            on_accept: optional_sequence(node, "onAccept")?,
            on_reject: optional_sequence(node, "onReject")?,
            advice: optional_sequence(node, "advice")?,
            obligations: optional_sequence(node, "obligations")?,
        }),
        MediatorKind::Validate => Mediator::Validate(ValidateMediator {
            range,
            on_fail: optional_sequence(node, "on-fail")?,
        }),
        MediatorKind::Rule => Mediator::Rule(RuleMediator {
            range,
            child_mediators: optional_sequence(node, "childMediators")?,
        }),
        MediatorKind::Clone => Mediator::Clone(CloneMediator {
            range,
            targets: children_named(node, "target")
                .into_iter()
                .map(build_target)
                .collect::<Result<Vec<_>, _>>()?,
        }),
        MediatorKind::Iterate => Mediator::Iterate(TargetMediator {
            kind,
            range,
            target: child_named(node, "target").map(build_target).transpose()?,
        }),
        MediatorKind::Foreach => Mediator::Foreach(TargetMediator {
            kind,
            range,
            target: build_foreach_target(node)?,
        }),
        MediatorKind::Aggregate => Mediator::Aggregate(AggregateMediator {
            range,
            on_complete: optional_sequence(node, "onComplete")?,
        }),
        MediatorKind::Connector => Mediator::Connector(ConnectorMediator {
            tag: node.tag().to_string(),
            range,
        }),
        MediatorKind::Unknown => {
            warn!("Unrecognized mediator <{}> at line {}", node.tag(), range.start_line());
            Mediator::Unknown(UnknownMediator { tag: node.tag().to_string(), range })
        }
        leaf => Mediator::Leaf(LeafMediator { kind: leaf, range }),
    };
    Ok(mediator)
}

/// `<target sequence="key"/>` or `<target><sequence>...</sequence></target>`.
fn build_target<N: DomNode>(node: &N) -> Result<Target, BuildError> {
    Ok(Target {
        range: range_of(node)?,
        sequence_key: node.attribute("sequence").map(str::to_string),
        sequence: optional_sequence(node, "sequence")?,
    })
}

/// Foreach wraps its inline `<sequence>` directly, without a `<target>` element.
fn build_foreach_target<N: DomNode>(node: &N) -> Result<Option<Target>, BuildError> {
    match child_named(node, "sequence") {
        Some(sequence) => Ok(Some(Target {
            range: range_of(sequence)?,
            sequence_key: None,
            sequence: Some(build_sequence(sequence)?),
        })),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::dom::Element;

    #[test]
    fn test_build_switch_cases_in_order() {
        let switch = Element::new("switch", 5, 5, 20).with_children(vec![
            Element::new("case", 6, 6, 10)
                .with_attribute("regex", "IBM")
                .with_children(vec![Element::empty("log", 7)]),
            Element::new("case", 11, 11, 15).with_attribute("regex", "MSFT"),
            Element::new("default", 16, 16, 19).with_children(vec![Element::empty("drop", 17)]),
        ]);
        let Mediator::Switch(built) = build_mediator(&switch).unwrap() else {
            panic!("Expected switch");
        };
        assert_eq!(built.cases.len(), 2);
        assert_eq!(built.cases[0].regex.as_deref(), Some("IBM"));
        assert_eq!(built.cases[1].sequence.range.start_line(), 11);
        assert_eq!(built.default_branch.unwrap().mediators.len(), 1);
    }

    #[test]
    fn test_description_is_not_a_mediator() {
        let sequence = Element::new("sequence", 0, 0, 4).with_children(vec![
            Element::new("description", 1, 1, 1),
            Element::empty("log", 2),
            Element::empty("drop", 3),
        ]);
        let built = build_sequence(&sequence).unwrap();
        let kinds: Vec<_> = built.mediators.iter().map(Mediator::kind).collect();
        assert_eq!(kinds, vec![MediatorKind::Log, MediatorKind::Drop]);
    }

    #[test]
    fn test_connector_and_unknown_tags() {
        let connector = build_mediator(&Element::empty("gmail.sendMail", 1)).unwrap();
        assert_eq!(connector.kind(), MediatorKind::Connector);

        let unknown = build_mediator(&Element::empty("teleport", 2)).unwrap();
        assert!(matches!(unknown, Mediator::Unknown(UnknownMediator { ref tag, .. }) if tag == "teleport"));
    }

    #[test]
    fn test_clone_targets_keep_reference_only_targets() {
        let clone = Element::new("clone", 0, 0, 8).with_children(vec![
            Element::empty("target", 1).with_attribute("sequence", "remoteSeq"),
            Element::new("target", 2, 2, 7).with_children(vec![
                Element::new("sequence", 3, 3, 6).with_children(vec![Element::empty("log", 4)]),
            ]),
        ]);
        let Mediator::Clone(built) = build_mediator(&clone).unwrap() else {
            panic!("Expected clone");
        };
        assert_eq!(built.targets[0].sequence_key.as_deref(), Some("remoteSeq"));
        assert!(built.targets[0].sequence.is_none());
        assert_eq!(built.targets[1].sequence.as_ref().unwrap().mediators.len(), 1);
    }

    #[test]
    fn test_foreach_wraps_inline_sequence() {
        let foreach = Element::new("foreach", 0, 0, 5).with_children(vec![
            Element::new("sequence", 1, 1, 4).with_children(vec![Element::empty("payloadFactory", 2)]),
        ]);
        let Mediator::Foreach(built) = build_mediator(&foreach).unwrap() else {
            panic!("Expected foreach");
        };
        assert_eq!(built.kind, MediatorKind::Foreach);
        let target = built.target.unwrap();
        assert_eq!(target.sequence.unwrap().mediators[0].kind(), MediatorKind::PayloadFactory);
    }
}
