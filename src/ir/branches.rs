//! Branch numbering per shape class.
//!
//! A position path encodes which branch of a branching mediator a nested mediator
//! sits in. The numbering is fixed per shape class:
//!
//! - binary (filter): `then` = 0, `else` = 1
//! - named multi (throttle, entitlement): declared order, 0..N-1
//! - indexed multi (switch): default = 0, cases 1..=K in document order
//! - single wrapped (validate, rule, iterate, foreach, aggregate): 0; clone: target index
//!
//! Absent branches keep their number; they are simply not candidates.

use super::kind::{MediatorKind, ShapeClass};
use super::mediator::{
    AggregateMediator, CloneMediator, EntitlementMediator, FilterMediator, RuleMediator,
    Sequence, SwitchMediator, Target, TargetMediator, ThrottleMediator, ValidateMediator,
};
use super::range::SourceRange;

/// One candidate branch of a branching mediator.
#[derive(Debug, Clone, Copy)]
pub struct Branch<'a> {
    /// Index written into the position path.
    pub index: usize,
    pub label: &'static str,
    /// Range tested for containment.
    pub range: SourceRange,
    /// Inline mediators, when the branch has any structure to descend into.
    pub sequence: Option<&'a Sequence>,
}

impl<'a> Branch<'a> {
    fn of_sequence(index: usize, label: &'static str, sequence: &'a Sequence) -> Self {
        Branch { index, label, range: sequence.range, sequence: Some(sequence) }
    }

    /// Opening line of the branch's first mediator.
    pub fn entry_line(&self) -> Option<u32> {
        self.sequence.and_then(Sequence::entry_line)
    }
}

/// Common view over every branching mediator.
pub trait Branching {
    fn kind(&self) -> MediatorKind;

    fn range(&self) -> &SourceRange;

    /// Candidate branches in declared order.
    fn branches(&self) -> Vec<Branch<'_>>;

    /// Number of branch slots, present or not. Used to detect missing branches.
    fn branch_slots(&self) -> usize;

    fn shape_class(&self) -> ShapeClass {
        self.kind().shape_class()
    }

    /// First branch whose range contains `line`. Branches are not checked for overlap.
    fn branch_containing(&self, line: u32) -> Option<Branch<'_>> {
        self.branches().into_iter().find(|b| b.range.contains_line(line))
    }
}

/// `then` = 0, `else` = 1.
pub fn binary_branches<'a>(
    then_branch: Option<&'a Sequence>,
    else_branch: Option<&'a Sequence>,
) -> Vec<Branch<'a>> {
    named_branches(&[("then", then_branch), ("else", else_branch)])
}

/// Each named slot gets its declaration index.
pub fn named_branches<'a>(slots: &[(&'static str, Option<&'a Sequence>)]) -> Vec<Branch<'a>> {
    slots
        .iter()
        .enumerate()
        .filter_map(|(index, &(label, seq))| seq.map(|s| Branch::of_sequence(index, label, s)))
        .collect()
}

/// default = 0, case `i` = `i + 1`.
pub fn indexed_branches<'a>(
    default_branch: Option<&'a Sequence>,
    cases: impl IntoIterator<Item = &'a Sequence>,
) -> Vec<Branch<'a>> {
    let mut branches: Vec<Branch<'a>> = default_branch
        .map(|s| Branch::of_sequence(0, "default", s))
        .into_iter()
        .collect();
    branches.extend(
        cases
            .into_iter()
            .enumerate()
            .map(|(i, s)| Branch::of_sequence(i + 1, "case", s)),
    );
    branches
}

/// Targets numbered by their position in the target list.
pub fn wrapped_branches<'a>(targets: impl IntoIterator<Item = &'a Target>) -> Vec<Branch<'a>> {
    targets
        .into_iter()
        .enumerate()
        .map(|(index, target)| Branch {
            index,
            label: "target",
            range: target.sequence.as_ref().map_or(target.range, |s| s.range),
            sequence: target.sequence.as_ref(),
        })
        .collect()
}

impl Branching for FilterMediator {
    fn kind(&self) -> MediatorKind {
        MediatorKind::Filter
    }

    fn range(&self) -> &SourceRange {
        &self.range
    }

    fn branches(&self) -> Vec<Branch<'_>> {
        binary_branches(self.then_branch.as_ref(), self.else_branch.as_ref())
    }

    fn branch_slots(&self) -> usize {
        2
    }
}

impl Branching for SwitchMediator {
    fn kind(&self) -> MediatorKind {
        MediatorKind::Switch
    }

    fn range(&self) -> &SourceRange {
        &self.range
    }

    fn branches(&self) -> Vec<Branch<'_>> {
        indexed_branches(self.default_branch.as_ref(), self.cases.iter().map(|c| &c.sequence))
    }

    fn branch_slots(&self) -> usize {
        1 + self.cases.len()
    }
}

impl Branching for ThrottleMediator {
    fn kind(&self) -> MediatorKind {
        MediatorKind::Throttle
    }

    fn range(&self) -> &SourceRange {
        &self.range
    }

    fn branches(&self) -> Vec<Branch<'_>> {
        named_branches(&[
            ("onAccept", self.on_accept.as_ref()),
            ("onReject", self.on_reject.as_ref()),
        ])
    }

    fn branch_slots(&self) -> usize {
        2
    }
}

impl Branching for EntitlementMediator {
    fn kind(&self) -> MediatorKind {
        MediatorKind::Entitlement
    }

    fn range(&self) -> &SourceRange {
        &self.range
    }

    fn branches(&self) -> Vec<Branch<'_>> {
        named_branches(&[
            ("onAccept", self.on_accept.as_ref()),
            ("onReject", self.on_reject.as_ref()),
            ("advice", self.advice.as_ref()),
            ("obligations", self.obligations.as_ref()),
        ])
    }

    fn branch_slots(&self) -> usize {
        4
    }
}

impl Branching for ValidateMediator {
    fn kind(&self) -> MediatorKind {
        MediatorKind::Validate
    }

    fn range(&self) -> &SourceRange {
        &self.range
    }

    fn branches(&self) -> Vec<Branch<'_>> {
        named_branches(&[("on-fail", self.on_fail.as_ref())])
    }

    fn branch_slots(&self) -> usize {
        1
    }
}

impl Branching for RuleMediator {
    fn kind(&self) -> MediatorKind {
        MediatorKind::Rule
    }

    fn range(&self) -> &SourceRange {
        &self.range
    }

    fn branches(&self) -> Vec<Branch<'_>> {
        named_branches(&[("childMediators", self.child_mediators.as_ref())])
    }

    fn branch_slots(&self) -> usize {
        1
    }
}

impl Branching for CloneMediator {
    fn kind(&self) -> MediatorKind {
        MediatorKind::Clone
    }

    fn range(&self) -> &SourceRange {
        &self.range
    }

    fn branches(&self) -> Vec<Branch<'_>> {
        wrapped_branches(&self.targets)
    }

    fn branch_slots(&self) -> usize {
        self.targets.len()
    }
}

impl Branching for TargetMediator {
    fn kind(&self) -> MediatorKind {
        self.kind
    }

    fn range(&self) -> &SourceRange {
        &self.range
    }

    fn branches(&self) -> Vec<Branch<'_>> {
        wrapped_branches(self.target.as_ref())
    }

    fn branch_slots(&self) -> usize {
        1
    }
}

impl Branching for AggregateMediator {
    fn kind(&self) -> MediatorKind {
        MediatorKind::Aggregate
    }

    fn range(&self) -> &SourceRange {
        &self.range
    }

    fn branches(&self) -> Vec<Branch<'_>> {
        named_branches(&[("onComplete", self.on_complete.as_ref())])
    }

    fn branch_slots(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(start: u32, end: u32) -> Sequence {
        Sequence::new(SourceRange::from_lines(start, start, end).unwrap(), Vec::new())
    }

    #[test]
    fn test_binary_numbering_skips_missing_then() {
        let else_seq = seq(8, 10);
        let branches = binary_branches(None, Some(&else_seq));
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].index, 1);
        assert_eq!(branches[0].label, "else");
    }

    #[test]
    fn test_indexed_numbering_puts_default_first() {
        let default = seq(6, 10);
        let case0 = seq(11, 15);
        let case1 = seq(16, 19);
        let branches = indexed_branches(Some(&default), [&case0, &case1]);
        let indices: Vec<_> = branches.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);

        let without_default = indexed_branches(None, [&case0, &case1]);
        let indices: Vec<_> = without_default.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_first_containing_branch_wins() {
        let filter = FilterMediator {
            range: SourceRange::from_lines(2, 2, 12).unwrap(),
            then_branch: Some(seq(3, 7)),
            else_branch: Some(seq(7, 11)),
        };
        assert_eq!(filter.branch_containing(7).map(|b| b.index), Some(0));
        assert_eq!(filter.branch_containing(9).map(|b| b.index), Some(1));
        assert!(filter.branch_containing(12).is_none());
    }

    #[test]
    fn test_wrapped_target_without_sequence_uses_target_range() {
        let clone = CloneMediator {
            range: SourceRange::from_lines(0, 0, 9).unwrap(),
            targets: vec![
                Target {
                    range: SourceRange::from_lines(1, 1, 1).unwrap(),
                    sequence_key: Some("remote".to_string()),
                    sequence: None,
                },
                Target {
                    range: SourceRange::from_lines(2, 2, 8).unwrap(),
                    sequence_key: None,
                    sequence: Some(seq(3, 7)),
                },
            ],
        };
        let branches = clone.branches();
        assert_eq!(branches[0].range.start_line(), 1);
        assert!(branches[0].sequence.is_none());
        assert_eq!(branches[1].index, 1);
        assert_eq!(branches[1].range.start_line(), 3);
    }
}
