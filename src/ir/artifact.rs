//! Root containers: the artifacts a breakpoint can be set in.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::mediator::Sequence;
use super::range::SourceRange;

/// Which of a resource's or proxy target's sequences a breakpoint fell into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowDirection {
    In,
    Out,
    Fault,
}

impl FlowDirection {
    pub const ALL: [FlowDirection; 3] = [FlowDirection::In, FlowDirection::Out, FlowDirection::Fault];
}

/// The in/out/fault sequences of an API resource or a proxy target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceSet {
    pub in_sequence: Option<Sequence>,
    pub out_sequence: Option<Sequence>,
    pub fault_sequence: Option<Sequence>,
}

impl SequenceSet {
    pub fn get(&self, direction: FlowDirection) -> Option<&Sequence> {
        match direction {
            FlowDirection::In => self.in_sequence.as_ref(),
            FlowDirection::Out => self.out_sequence.as_ref(),
            FlowDirection::Fault => self.fault_sequence.as_ref(),
        }
    }

    /// Present sequences in document order.
    pub fn iter(&self) -> impl Iterator<Item = (FlowDirection, &Sequence)> {
        let mut present: Vec<_> = FlowDirection::ALL
            .into_iter()
            .filter_map(|d| self.get(d).map(|s| (d, s)))
            .collect();
        present.sort_by_key(|(_, s)| s.range.start_line());
        present.into_iter()
    }

    /// First sequence whose range contains `line`.
    pub fn containing(&self, line: u32) -> Option<(FlowDirection, &Sequence)> {
        self.iter().find(|(_, s)| s.range.contains_line(line))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResource {
    pub range: SourceRange,
    pub methods: Vec<String>,
    pub uri_template: Option<String>,
    pub url_mapping: Option<String>,
    pub sequences: SequenceSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Api {
    pub name: String,
    pub context: Option<String>,
    pub range: SourceRange,
    pub resources: Vec<ApiResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyTarget {
    pub range: SourceRange,
    pub sequences: SequenceSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proxy {
    pub name: String,
    pub range: SourceRange,
    pub target: Option<ProxyTarget>,
}

/// A top-level `<sequence name="...">`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSequence {
    pub name: String,
    pub sequence: Sequence,
}

/// A `<template>` whose body is a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceTemplate {
    pub name: String,
    pub range: SourceRange,
    pub body: Option<Sequence>,
}

/// The root of one flow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Artifact {
    Api(Api),
    Proxy(Proxy),
    Sequence(NamedSequence),
    Template(SequenceTemplate),
    /// Roots with no steppable body (endpoints, local entries, message stores, ...).
    Unsupported { tag: String },
}

impl Artifact {
    pub fn kind_name(&self) -> &str {
        match self {
            Artifact::Api(_) => "API",
            Artifact::Proxy(_) => "Proxy",
            Artifact::Sequence(_) => "Sequence",
            Artifact::Template(_) => "Template",
            Artifact::Unsupported { tag } => tag,
        }
    }
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowDirection::In => write!(f, "in"),
            FlowDirection::Out => write!(f, "out"),
            FlowDirection::Fault => write!(f, "fault"),
        }
    }
}
