use std::fmt;

use thiserror::Error;

use crate::ir::artifact::FlowDirection;
use crate::ir::kind::MediatorKind;
use crate::parsers::flow::BuildError;

/// The container a breakpoint was being resolved against; named in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Api,
    ApiResource,
    Proxy,
    ProxyTarget,
    /// In, out or fault sequence of a resource or proxy target.
    FlowSequence(FlowDirection),
    NamedSequence,
    Template,
    /// A branch of a branching mediator.
    Branch { owner: MediatorKind, label: &'static str },
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Container::Api => write!(f, "API"),
            Container::ApiResource => write!(f, "API resource"),
            Container::Proxy => write!(f, "Proxy"),
            Container::ProxyTarget => write!(f, "Proxy target"),
            Container::FlowSequence(direction) => write!(f, "{} sequence", direction),
            Container::NamedSequence => write!(f, "Sequence"),
            Container::Template => write!(f, "Template"),
            Container::Branch { owner, label } => write!(f, "{} branch of {}", label, owner),
        }
    }
}

/// Why a breakpoint could not be turned into a mediator position.
///
/// These are per-breakpoint results reported back to the user, never failures of the
/// request as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("breakpoint not in range of {0}")]
    NotInRange(Container),

    #[error("breakpoint not inside a sequence of {0}")]
    NoSequence(Container),

    #[error("breakpoint not on opening tag of {0}")]
    NotOnOpeningTag(MediatorKind),

    #[error("invalid breakpoint in {0}")]
    InvalidBranch(MediatorKind),

    #[error("breakpoint not on a mediator of {0}")]
    NoMediator(Container),
}

/// Errors that abort a whole debugger request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DebuggerError {
    #[error("breakpoints are not supported in {0} artifacts")]
    Unsupported(String),

    #[error(transparent)]
    Build(#[from] BuildError),
}
