//! Single-breakpoint position resolution.
//!
//! Walks one container's mediators in document order and computes the mediator
//! position of the node a breakpoint line sits on. The first index is the mediator's
//! index among its siblings; every nested level appends the branch index followed by
//! the index inside that branch, so `0 2 0` reads "first mediator, branch 2, first
//! mediator in it".

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::ir::branches::Branching;
use crate::ir::kind::MediatorKind;
use crate::ir::mediator::Sequence;
use crate::ir::range::SourceRange;
use crate::ir::visitor::MediatorVisitor;

use super::error::{Container, ResolveError};

/// Hierarchical index path of a mediator inside nested sequences.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediatorPosition(Vec<usize>);

impl MediatorPosition {
    pub fn new(index: usize) -> Self {
        MediatorPosition(vec![index])
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Appends `branch` and then the path resolved inside that branch.
    pub fn descend(&mut self, branch: usize, inner: MediatorPosition) {
        self.0.push(branch);
        self.0.extend(inner.0);
    }

    /// Number of sequences the path passes through.
    pub fn depth(&self) -> usize {
        self.0.len().div_ceil(2)
    }
}

impl fmt::Display for MediatorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for index in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}", index)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for MediatorPosition {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(MediatorPosition)
    }
}

impl Serialize for MediatorPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of resolving one breakpoint.
pub type Resolution = Result<MediatorPosition, ResolveError>;

/// What visiting one sibling produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    /// The breakpoint is not in this mediator; it now counts as a preceding sibling.
    Passed,
    /// The breakpoint belongs to this mediator, successfully or not.
    Claimed(Resolution),
}

/// Visitor that tests one mediator at a time against a breakpoint line.
///
/// `sibling_index` counts the siblings passed so far. It survives a change of line via
/// [`PositionResolver::retarget`], which lets the batch resolver re-examine the same
/// sibling for the next breakpoint.
#[derive(Debug, Clone)]
pub struct PositionResolver {
    line: u32,
    sibling_index: usize,
}

impl PositionResolver {
    pub fn new(line: u32) -> Self {
        PositionResolver { line, sibling_index: 0 }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn sibling_index(&self) -> usize {
        self.sibling_index
    }

    /// Switches to another breakpoint line, keeping the sibling count.
    pub fn retarget(&mut self, line: u32) {
        self.line = line;
    }

    fn pass(&mut self) -> Visit {
        self.sibling_index += 1;
        Visit::Passed
    }
}

impl MediatorVisitor for PositionResolver {
    type Output = Visit;

    fn visit_leaf(&mut self, kind: MediatorKind, range: &SourceRange) -> Visit {
        if !range.contains_line(self.line) {
            return self.pass();
        }
        if range.is_on_opening_tag(self.line) {
            trace!("Line {} is on {} at index {}", self.line, kind, self.sibling_index);
            Visit::Claimed(Ok(MediatorPosition::new(self.sibling_index)))
        } else {
            debug!("Line {} is inside {} but not on its opening tag", self.line, kind);
            Visit::Claimed(Err(ResolveError::NotOnOpeningTag(kind)))
        }
    }

    fn visit_branching(&mut self, node: &dyn Branching) -> Visit {
        let range = node.range();
        if !range.contains_line(self.line) {
            return self.pass();
        }

        let mut position = MediatorPosition::new(self.sibling_index);
        // The mediator's own opening tag wins over any branch.
        if range.is_on_opening_tag(self.line) {
            trace!("Line {} is on {} at index {}", self.line, node.kind(), self.sibling_index);
            return Visit::Claimed(Ok(position));
        }

        let kind = node.kind();
        let inner = node.branch_containing(self.line).and_then(|branch| {
            trace!("Line {} falls into {} branch {} of {}", self.line, branch.label, branch.index, kind);
            let sequence = branch.sequence?;
            let container = Container::Branch { owner: kind, label: branch.label };
            resolve_position(sequence, container, self.line).map(|r| (branch.index, r))
        });

        match inner {
            Some((branch, Ok(inner))) => {
                position.descend(branch, inner);
                Visit::Claimed(Ok(position))
            }
            Some((_, Err(reason))) => {
                debug!("Line {} in {} did not resolve: {}", self.line, kind, reason);
                Visit::Claimed(Err(ResolveError::InvalidBranch(kind)))
            }
            None => {
                debug!("Line {} in {} is not on any mediator of its branches", self.line, kind);
                Visit::Claimed(Err(ResolveError::InvalidBranch(kind)))
            }
        }
    }

    fn visit_inert(&mut self, _range: &SourceRange) -> Visit {
        self.pass()
    }
}

/// Resolves `line` against the mediators of `sequence`.
///
/// Returns `None` when the line is inside the sequence but on no mediator; the caller
/// decides how to report that.
pub fn resolve_position(sequence: &Sequence, container: Container, line: u32) -> Option<Resolution> {
    if !sequence.range.contains_line(line) {
        debug!("Line {} is outside {}", line, container);
        return Some(Err(ResolveError::NotInRange(container)));
    }

    let mut resolver = PositionResolver::new(line);
    for mediator in &sequence.mediators {
        if let Visit::Claimed(resolution) = resolver.visit_mediator(mediator) {
            return Some(resolution);
        }
    }
    None
}
