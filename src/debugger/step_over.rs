//! Step-over: which lines execution may reach in one step from a suspended mediator.

use serde::Serialize;
use tracing::{debug, trace};

use crate::ir::branches::Branching;
use crate::ir::kind::{MediatorKind, ShapeClass};
use crate::ir::mediator::Sequence;
use crate::ir::range::SourceRange;
use crate::ir::visitor::MediatorVisitor;

use super::error::{Container, ResolveError};

/// The mediator a step starts from and where the step can land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOverInfo {
    pub mediator: MediatorKind,
    /// Opening line of the suspended mediator.
    pub line: u32,
    /// Opening lines of every mediator one step can reach, ascending.
    pub next_lines: Vec<u32>,
    /// The flow ends at this mediator.
    pub terminates: bool,
}

/// Finds the mediator on `line` and records its successors.
///
/// `successor` holds the lines execution continues at once the visited mediator is
/// done: the next sibling, or the enclosing continuation for the last one.
struct StepOverResolver<'s> {
    line: u32,
    successor: &'s [u32],
}

type Step = Option<Result<StepOverInfo, ResolveError>>;

impl MediatorVisitor for StepOverResolver<'_> {
    type Output = Step;

    fn visit_leaf(&mut self, kind: MediatorKind, range: &SourceRange) -> Step {
        if !range.contains_line(self.line) {
            return None;
        }
        if !range.is_on_opening_tag(self.line) {
            return Some(Err(ResolveError::NotOnOpeningTag(kind)));
        }

        let terminates = kind.terminates_flow();
        let next_lines = if terminates { Vec::new() } else { self.successor.to_vec() };
        trace!("Stepping over {} at line {} reaches {:?}", kind, self.line, next_lines);
        Some(Ok(StepOverInfo { mediator: kind, line: range.open_line(), next_lines, terminates }))
    }

    fn visit_branching(&mut self, node: &dyn Branching) -> Step {
        let range = node.range();
        if !range.contains_line(self.line) {
            return None;
        }
        let kind = node.kind();

        if range.is_on_opening_tag(self.line) {
            let branches = node.branches();
            let mut falls_through = node.shape_class() == ShapeClass::SingleWrappedBranch
                || branches.len() < node.branch_slots();
            let mut next_lines = Vec::new();
            for branch in &branches {
                match branch.entry_line() {
                    Some(line) => next_lines.push(line),
                    None => falls_through = true,
                }
            }
            if falls_through {
                next_lines.extend_from_slice(self.successor);
            }
            next_lines.sort_unstable();
            next_lines.dedup();
            trace!("Stepping over {} at line {} reaches {:?}", kind, self.line, next_lines);
            return Some(Ok(StepOverInfo {
                mediator: kind,
                line: range.open_line(),
                next_lines,
                terminates: false,
            }));
        }

        let inner = node.branch_containing(self.line).and_then(|branch| {
            let container = Container::Branch { owner: kind, label: branch.label };
            step_over(branch.sequence?, container, self.line, self.successor)
        });
        match inner {
            Some(Ok(info)) => Some(Ok(info)),
            _ => {
                debug!("Line {} in {} is not on a steppable mediator", self.line, kind);
                Some(Err(ResolveError::InvalidBranch(kind)))
            }
        }
    }

    fn visit_inert(&mut self, _range: &SourceRange) -> Step {
        None
    }
}

/// Locates the mediator on `line` inside `sequence` and computes its next lines.
///
/// `continuation` is where execution goes after the last mediator of `sequence`; empty
/// for a top-level container. Returns `None` when the line is on no mediator.
pub fn step_over(sequence: &Sequence, container: Container, line: u32, continuation: &[u32]) -> Step {
    if !sequence.range.contains_line(line) {
        return Some(Err(ResolveError::NotInRange(container)));
    }

    for (index, mediator) in sequence.mediators.iter().enumerate() {
        let next_sibling = sequence.mediators.get(index + 1).map(|m| [m.range().open_line()]);
        let successor: &[u32] = match &next_sibling {
            Some(line) => line,
            None => continuation,
        };
        let mut resolver = StepOverResolver { line, successor };
        if let Some(step) = resolver.visit_mediator(mediator) {
            return Some(step);
        }
    }
    None
}
