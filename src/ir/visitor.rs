use tracing::debug;

use super::branches::Branching;
use super::kind::MediatorKind;
use super::mediator::{
    AggregateMediator, CloneMediator, ConnectorMediator, EntitlementMediator, FilterMediator,
    LeafMediator, Mediator, RuleMediator, SwitchMediator, TargetMediator, ThrottleMediator,
    UnknownMediator, ValidateMediator,
};
use super::range::SourceRange;

/// Dispatches flow-tree mediators to per-kind handlers.
///
/// Every per-kind method has a default that forwards to the handler of the kind's
/// shape class, so an implementor writes `visit_leaf` and `visit_branching` once and
/// overrides individual kinds only where they behave differently.
pub trait MediatorVisitor {
    type Output;

    /// Entry point, dispatching to the kind-specific method.
    /// Implementors typically do not override this method.
    fn visit_mediator(&mut self, mediator: &Mediator) -> Self::Output {
        match mediator {
            Mediator::Leaf(leaf) => self.visit_leaf_kind(leaf),
            Mediator::Connector(m) => self.visit_connector(m),
            Mediator::Unknown(m) => self.visit_unknown(m),
            Mediator::Filter(m) => self.visit_filter(m),
            Mediator::Switch(m) => self.visit_switch(m),
            Mediator::Throttle(m) => self.visit_throttle(m),
            Mediator::Entitlement(m) => self.visit_entitlement(m),
            Mediator::Validate(m) => self.visit_validate(m),
            Mediator::Rule(m) => self.visit_rule(m),
            Mediator::Clone(m) => self.visit_clone(m),
            Mediator::Iterate(m) => self.visit_iterate(m),
            Mediator::Foreach(m) => self.visit_foreach(m),
            Mediator::Aggregate(m) => self.visit_aggregate(m),
        }
    }

    /// Second-level dispatch for leaf mediators, which share one node type.
    fn visit_leaf_kind(&mut self, leaf: &LeafMediator) -> Self::Output {
        use MediatorKind::*;
        match leaf.kind {
            Log => self.visit_log(leaf),
            Property => self.visit_property(leaf),
            PropertyGroup => self.visit_property_group(leaf),
            Variable => self.visit_variable(leaf),
            SequenceRef => self.visit_sequence_ref(leaf),
            Call => self.visit_call(leaf),
            CallTemplate => self.visit_call_template(leaf),
            Send => self.visit_send(leaf),
            Respond => self.visit_respond(leaf),
            Drop => self.visit_drop(leaf),
            Loopback => self.visit_loopback(leaf),
            Store => self.visit_store(leaf),
            Header => self.visit_header(leaf),
            PayloadFactory => self.visit_payload_factory(leaf),
            Enrich => self.visit_enrich(leaf),
            Script => self.visit_script(leaf),
            Class => self.visit_class(leaf),
            Bean => self.visit_bean(leaf),
            Ejb => self.visit_ejb(leaf),
            Xslt => self.visit_xslt(leaf),
            FastXslt => self.visit_fast_xslt(leaf),
            Xquery => self.visit_xquery(leaf),
            DataMapper => self.visit_data_mapper(leaf),
            DataServiceCall => self.visit_data_service_call(leaf),
            DbLookup => self.visit_db_lookup(leaf),
            DbReport => self.visit_db_report(leaf),
            Event => self.visit_event(leaf),
            Transaction => self.visit_transaction(leaf),
            Enqueue => self.visit_enqueue(leaf),
            Builder => self.visit_builder(leaf),
            Smooks => self.visit_smooks(leaf),
            Cache => self.visit_cache(leaf),
            Spring => self.visit_spring(leaf),
            // A leaf node carrying a branching or special kind means the tree was
            // assembled by hand; treat it like any other leaf.
            other => self.visit_leaf(other, &leaf.range),
        }
    }

    /// Handler for every mediator without nested sequences.
    fn visit_leaf(&mut self, kind: MediatorKind, range: &SourceRange) -> Self::Output;

    /// Handler shared by all branching shape classes.
    fn visit_branching(&mut self, node: &dyn Branching) -> Self::Output;

    /// Handler for nodes that take no part in the traversal.
    fn visit_inert(&mut self, range: &SourceRange) -> Self::Output;

    fn visit_binary_branch(&mut self, node: &dyn Branching) -> Self::Output {
        self.visit_branching(node)
    }

    fn visit_named_branch(&mut self, node: &dyn Branching) -> Self::Output {
        self.visit_branching(node)
    }

    fn visit_indexed_branch(&mut self, node: &dyn Branching) -> Self::Output {
        self.visit_branching(node)
    }

    fn visit_wrapped_branch(&mut self, node: &dyn Branching) -> Self::Output {
        self.visit_branching(node)
    }

    /// Elements the builder could not map to a mediator kind. The builder has
    /// already warned about them.
    fn visit_unknown(&mut self, node: &UnknownMediator) -> Self::Output {
        debug!(
            "No handler for mediator tag '{}' at line {}, skipping",
            node.tag,
            node.range.start_line()
        );
        self.visit_inert(&node.range)
    }

    fn visit_connector(&mut self, node: &ConnectorMediator) -> Self::Output {
        self.visit_leaf(MediatorKind::Connector, &node.range)
    }

    fn visit_filter(&mut self, node: &FilterMediator) -> Self::Output {
        self.visit_binary_branch(node)
    }

    fn visit_switch(&mut self, node: &SwitchMediator) -> Self::Output {
        self.visit_indexed_branch(node)
    }

    fn visit_throttle(&mut self, node: &ThrottleMediator) -> Self::Output {
        self.visit_named_branch(node)
    }

    fn visit_entitlement(&mut self, node: &EntitlementMediator) -> Self::Output {
        self.visit_named_branch(node)
    }

    fn visit_validate(&mut self, node: &ValidateMediator) -> Self::Output {
        self.visit_wrapped_branch(node)
    }

    fn visit_rule(&mut self, node: &RuleMediator) -> Self::Output {
        self.visit_wrapped_branch(node)
    }

    fn visit_clone(&mut self, node: &CloneMediator) -> Self::Output {
        self.visit_wrapped_branch(node)
    }

    fn visit_iterate(&mut self, node: &TargetMediator) -> Self::Output {
        self.visit_wrapped_branch(node)
    }

    fn visit_foreach(&mut self, node: &TargetMediator) -> Self::Output {
        self.visit_wrapped_branch(node)
    }

    fn visit_aggregate(&mut self, node: &AggregateMediator) -> Self::Output {
        self.visit_wrapped_branch(node)
    }

    fn visit_log(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_property(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_property_group(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_variable(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_sequence_ref(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_call(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_call_template(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_send(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_respond(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_drop(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_loopback(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_store(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_header(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_payload_factory(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_enrich(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_script(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_class(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_bean(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_ejb(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_xslt(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_fast_xslt(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_xquery(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_data_mapper(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_data_service_call(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_db_lookup(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_db_report(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_event(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_transaction(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_enqueue(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_builder(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_smooks(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_cache(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }

    fn visit_spring(&mut self, node: &LeafMediator) -> Self::Output {
        self.visit_leaf(node.kind, &node.range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracing::{Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer};
    use tracing_subscriber::prelude::*;

    use crate::ir::kind::ShapeClass;
    use crate::ir::mediator::Sequence;

    /// Records which handler each mediator reached.
    #[derive(Default)]
    struct ShapeRecorder {
        seen: Vec<(MediatorKind, ShapeClass)>,
        inert: usize,
    }

    impl MediatorVisitor for ShapeRecorder {
        type Output = ();

        fn visit_leaf(&mut self, kind: MediatorKind, _range: &SourceRange) {
            self.seen.push((kind, ShapeClass::Leaf));
        }

        fn visit_branching(&mut self, node: &dyn Branching) {
            self.seen.push((node.kind(), node.shape_class()));
        }

        fn visit_inert(&mut self, _range: &SourceRange) {
            self.inert += 1;
        }
    }

    fn range(line: u32) -> SourceRange {
        SourceRange::from_lines(line, line, line).unwrap()
    }

    #[test]
    fn test_dispatch_reaches_shape_handlers() {
        let mediators = vec![
            Mediator::Leaf(LeafMediator { kind: MediatorKind::Log, range: range(0) }),
            Mediator::Connector(ConnectorMediator { tag: "gmail.send".into(), range: range(1) }),
            Mediator::Filter(FilterMediator {
                range: range(2),
                then_branch: Some(Sequence::new(range(2), Vec::new())),
                else_branch: None,
            }),
            Mediator::Iterate(TargetMediator { kind: MediatorKind::Iterate, range: range(3), target: None }),
            Mediator::Unknown(UnknownMediator { tag: "teleport".into(), range: range(4) }),
        ];

        let mut recorder = ShapeRecorder::default();
        for mediator in &mediators {
            recorder.visit_mediator(mediator);
        }

        assert_eq!(
            recorder.seen,
            vec![
                (MediatorKind::Log, ShapeClass::Leaf),
                (MediatorKind::Connector, ShapeClass::Leaf),
                (MediatorKind::Filter, ShapeClass::BinaryBranch),
                (MediatorKind::Iterate, ShapeClass::SingleWrappedBranch),
            ]
        );
        assert_eq!(recorder.inert, 1);
    }

    /// Counts warning and error events.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() <= Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_revisiting_unknown_mediator_does_not_warn() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        let unknown = Mediator::Unknown(UnknownMediator { tag: "teleport".into(), range: range(4) });

        let mut recorder = ShapeRecorder::default();
        tracing::subscriber::with_default(subscriber, || {
            for _ in 0..3 {
                recorder.visit_mediator(&unknown);
            }
        });

        assert_eq!(recorder.inert, 3);
        assert_eq!(warnings.load(Ordering::SeqCst), 0);
    }
}
