//! Resolving many breakpoints against one container in a single pass.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::ir::mediator::Sequence;
use crate::ir::visitor::MediatorVisitor;

use super::breakpoint::Breakpoint;
use super::error::{Container, ResolveError};
use super::position::{PositionResolver, Resolution, Visit};

/// Walks the mediators of one container once for a whole list of breakpoints.
///
/// Pending breakpoints are taken in line order. When a mediator claims the head
/// breakpoint the same mediator is examined again for the next one, so breakpoints
/// sharing a subtree do not restart the scan. Every breakpoint leaves the pending list
/// with a result.
pub struct BatchResolver<'a> {
    sequence: &'a Sequence,
    container: Container,
    pending: VecDeque<Breakpoint>,
    resolved: Vec<(Breakpoint, Resolution)>,
}

impl<'a> BatchResolver<'a> {
    pub fn new(sequence: &'a Sequence, container: Container, breakpoints: impl IntoIterator<Item = Breakpoint>) -> Self {
        let mut resolved = Vec::new();
        let mut in_range: Vec<Breakpoint> = Vec::new();
        for breakpoint in breakpoints {
            if sequence.range.contains_line(breakpoint.line) {
                in_range.push(breakpoint);
            } else {
                resolved.push((breakpoint, Err(ResolveError::NotInRange(container))));
            }
        }
        in_range.sort_by_key(|b| b.line);

        BatchResolver { sequence, container, pending: in_range.into(), resolved }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn settle(&mut self, resolution: Resolution) {
        if let Some(breakpoint) = self.pending.pop_front() {
            trace!("Breakpoint {} at line {} settled", breakpoint.id, breakpoint.line);
            self.resolved.push((breakpoint, resolution));
        }
    }

    /// Resolves every pending breakpoint, in line order.
    pub fn run(mut self) -> Vec<(Breakpoint, Resolution)> {
        let Some(first) = self.pending.front() else {
            return self.resolved;
        };
        let mut resolver = PositionResolver::new(first.line);
        let mut child = 0;

        while let Some(head) = self.pending.front().copied() {
            let Some(mediator) = self.sequence.mediators.get(child) else {
                break;
            };
            if head.line < mediator.range().start_line() {
                // Between the previous mediator and this one.
                debug!("Breakpoint at line {} is between mediators of {}", head.line, self.container);
                self.settle(Err(ResolveError::NoMediator(self.container)));
                continue;
            }

            resolver.retarget(head.line);
            match resolver.visit_mediator(mediator) {
                Visit::Passed => child += 1,
                Visit::Claimed(resolution) => self.settle(resolution),
            }
        }

        while !self.pending.is_empty() {
            self.settle(Err(ResolveError::NoMediator(self.container)));
        }
        self.resolved
    }
}

/// Convenience wrapper around [`BatchResolver`].
pub fn resolve_positions(
    sequence: &Sequence,
    container: Container,
    breakpoints: impl IntoIterator<Item = Breakpoint>,
) -> Vec<(Breakpoint, Resolution)> {
    BatchResolver::new(sequence, container, breakpoints).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::position::resolve_position;
    use crate::ir::kind::MediatorKind;
    use crate::ir::mediator::{FilterMediator, LeafMediator, Mediator, UnknownMediator};
    use crate::ir::range::SourceRange;

    fn leaf(kind: MediatorKind, line: u32) -> Mediator {
        Mediator::Leaf(LeafMediator { kind, range: SourceRange::from_lines(line, line, line).unwrap() })
    }

    fn seq(start: u32, end: u32, mediators: Vec<Mediator>) -> Sequence {
        Sequence::new(SourceRange::from_lines(start, start, end).unwrap(), mediators)
    }

    fn sample() -> Sequence {
        let filter = Mediator::Filter(FilterMediator {
            range: SourceRange::from_lines(4, 4, 12).unwrap(),
            then_branch: Some(seq(5, 8, vec![leaf(MediatorKind::Log, 6), leaf(MediatorKind::Send, 7)])),
            else_branch: Some(seq(9, 11, vec![leaf(MediatorKind::Drop, 10)])),
        });
        let unknown = Mediator::Unknown(UnknownMediator {
            tag: "teleport".to_string(),
            range: SourceRange::from_lines(14, 14, 14).unwrap(),
        });
        seq(0, 20, vec![leaf(MediatorKind::Log, 2), filter, unknown, leaf(MediatorKind::Respond, 16)])
    }

    fn single(sequence: &Sequence, line: u32) -> Resolution {
        resolve_position(sequence, Container::NamedSequence, line)
            .unwrap_or(Err(ResolveError::NoMediator(Container::NamedSequence)))
    }

    #[test]
    fn test_batch_matches_single_resolution() {
        let sequence = sample();
        let lines = [16, 2, 7, 6, 10, 3, 14, 9, 25, 4, 5, 19];
        let breakpoints: Vec<_> = lines.iter().map(|&l| Breakpoint::new(l)).collect();

        let results = resolve_positions(&sequence, Container::NamedSequence, breakpoints.clone());
        assert_eq!(results.len(), breakpoints.len());
        for (breakpoint, resolution) in results {
            assert_eq!(resolution, single(&sequence, breakpoint.line), "line {}", breakpoint.line);
        }
    }

    #[test]
    fn test_same_subtree_breakpoints() {
        let sequence = sample();
        let results = resolve_positions(
            &sequence,
            Container::NamedSequence,
            [Breakpoint::new(7), Breakpoint::new(6), Breakpoint::new(10)],
        );
        let paths: Vec<_> = results
            .iter()
            .map(|(b, r)| (b.line, r.as_ref().map(ToString::to_string).ok()))
            .collect();
        assert_eq!(
            paths,
            vec![
                (6, Some("1 0 0".to_string())),
                (7, Some("1 0 1".to_string())),
                (10, Some("1 1 0".to_string())),
            ]
        );
    }

    #[test]
    fn test_duplicate_lines_both_settle() {
        let sequence = sample();
        let a = Breakpoint::new(2);
        let b = Breakpoint::new(2);
        let results = resolve_positions(&sequence, Container::NamedSequence, [a, b]);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, r)| r.as_ref().map(ToString::to_string).ok() == Some("0".into())));
    }

    #[test]
    fn test_empty_batch() {
        let sequence = sample();
        let resolver = BatchResolver::new(&sequence, Container::NamedSequence, []);
        assert_eq!(resolver.pending(), 0);
        assert!(resolver.run().is_empty());
    }
}
