//! Random mediation flows for property-based testing.
//!
//! A [`GeneratedFlow`] is an abstract tree of mediators. [`GeneratedFlow::layout`] writes
//! it out one tag per line, the way a formatted flow document looks, and returns the
//! JSON element tree together with an oracle: for every line of the document, what a
//! breakpoint on that line is expected to resolve to.
//!
//! Layout rules:
//! - every start tag and every end tag takes its own line
//! - a leaf is either self-closed on one line or spans open/body/close lines
//! - `Gap` is a blank line between siblings
//!
//! Generation uses a depth parameter to bound nesting.

use std::fmt;

use quickcheck::{Arbitrary, Gen};
use serde_json::{Value, json};

/// Maximum nesting of branching mediators.
const MAX_DEPTH: usize = 3;

const LEAF_TAGS: &[&str] = &[
    "log", "property", "payloadFactory", "send", "respond", "call", "header", "enrich", "drop",
    "gmail.send",
];

#[derive(Clone, Debug)]
pub enum FlowNode {
    Leaf { tag: &'static str, multiline: bool },
    /// An element no handler knows; still takes a sibling slot.
    Unknown,
    /// A blank line.
    Gap,
    Filter { then_branch: Option<Vec<FlowNode>>, else_branch: Option<Vec<FlowNode>> },
    Switch { cases: Vec<Vec<FlowNode>>, default: Option<Vec<FlowNode>> },
    Throttle { on_accept: Option<Vec<FlowNode>>, on_reject: Option<Vec<FlowNode>> },
    Clone { targets: Vec<Vec<FlowNode>> },
    Foreach { body: Vec<FlowNode> },
    /// Laid out with its branches in reverse declaration order.
    Entitlement {
        on_accept: Option<Vec<FlowNode>>,
        on_reject: Option<Vec<FlowNode>>,
        advice: Option<Vec<FlowNode>>,
        obligations: Option<Vec<FlowNode>>,
    },
    /// A `<schema/>` line precedes the on-fail sequence.
    Validate { on_fail: Vec<FlowNode> },
    Rule { child_mediators: Vec<FlowNode> },
    /// A `<completeCondition/>` line precedes the onComplete sequence.
    Aggregate { on_complete: Vec<FlowNode> },
}

/// A named top-level sequence.
#[derive(Clone, Debug)]
pub struct GeneratedFlow {
    pub mediators: Vec<FlowNode>,
}

/// What a breakpoint on a given line resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expected {
    /// Valid, with this position path.
    Position(Vec<usize>),
    /// Inside a top-level leaf, off its start tag.
    NotOnOpeningTag,
    /// Inside a branching mediator, but not on a mediator of one of its branches.
    InvalidBranch,
    /// Inside the sequence, between mediators.
    NoMediator,
}

impl Expected {
    pub fn position_string(&self) -> Option<String> {
        match self {
            Expected::Position(path) => Some(
                path.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "),
            ),
            _ => None,
        }
    }
}

/// A flow written out as a document.
#[derive(Clone, Debug)]
pub struct LaidOutFlow {
    /// JSON element tree, deserializable as the crate's `Element`.
    pub document: Value,
    /// One entry per document line, in line order.
    pub oracle: Vec<(u32, Expected)>,
}

impl LaidOutFlow {
    pub fn line_count(&self) -> u32 {
        self.oracle.len() as u32
    }

    pub fn expected(&self, line: u32) -> Option<&Expected> {
        self.oracle.get(line as usize).map(|(_, e)| e)
    }

}

fn position(line: u32) -> Value {
    json!({ "line": line, "character": 0 })
}

fn element(tag: &str, start: u32, end: u32, self_closing: bool, children: Vec<Value>) -> Value {
    json!({
        "tag": tag,
        "start": position(start),
        "end": position(end),
        "open_end": position(start),
        "self_closing": self_closing,
        "children": children,
    })
}

struct Layout {
    next_line: u32,
    oracle: Vec<(u32, Expected)>,
}

impl Layout {
    fn line(&mut self, expected: Expected) -> u32 {
        let line = self.next_line;
        self.oracle.push((line, expected));
        self.next_line += 1;
        line
    }

    /// Failures inside a branch surface as an invalid branch of the outermost
    /// branching mediator.
    fn failure(nested: bool, top_level: Expected) -> Expected {
        if nested { Expected::InvalidBranch } else { top_level }
    }

    fn sequence(&mut self, tag: &str, nodes: &[FlowNode], prefix: &[usize], nested: bool) -> Value {
        let start = self.line(Layout::failure(nested, Expected::NoMediator));
        let mut sibling = 0;
        let mut children = Vec::new();

        for node in nodes {
            let mut path = prefix.to_vec();
            path.push(sibling);
            match node {
                FlowNode::Gap => {
                    self.line(Layout::failure(nested, Expected::NoMediator));
                }
                FlowNode::Unknown => {
                    let line = self.line(Layout::failure(nested, Expected::NoMediator));
                    children.push(element("teleport", line, line, true, Vec::new()));
                    sibling += 1;
                }
                FlowNode::Leaf { tag, multiline } => {
                    let open = self.line(Expected::Position(path));
                    if *multiline {
                        self.line(Layout::failure(nested, Expected::NotOnOpeningTag));
                        let close = self.line(Layout::failure(nested, Expected::NotOnOpeningTag));
                        children.push(element(tag, open, close, false, Vec::new()));
                    } else {
                        children.push(element(tag, open, open, true, Vec::new()));
                    }
                    sibling += 1;
                }
                branching => {
                    children.push(self.branching(branching, path));
                    sibling += 1;
                }
            }
        }

        let end = self.line(Layout::failure(nested, Expected::NoMediator));
        element(tag, start, end, false, children)
    }

    fn branching(&mut self, node: &FlowNode, path: Vec<usize>) -> Value {
        let open = self.line(Expected::Position(path.clone()));
        let branch = |index: usize| {
            let mut prefix = path.clone();
            prefix.push(index);
            prefix
        };

        let (tag, children) = match node {
            FlowNode::Filter { then_branch, else_branch } => {
                let mut children = Vec::new();
                if let Some(nodes) = then_branch {
                    children.push(self.sequence("then", nodes, &branch(0), true));
                }
                if let Some(nodes) = else_branch {
                    children.push(self.sequence("else", nodes, &branch(1), true));
                }
                ("filter", children)
            }
            FlowNode::Switch { cases, default } => {
                let mut children: Vec<Value> = cases
                    .iter()
                    .enumerate()
                    .map(|(i, nodes)| self.sequence("case", nodes, &branch(i + 1), true))
                    .collect();
                if let Some(nodes) = default {
                    children.push(self.sequence("default", nodes, &branch(0), true));
                }
                ("switch", children)
            }
            FlowNode::Throttle { on_accept, on_reject } => {
                let mut children = Vec::new();
                if let Some(nodes) = on_accept {
                    children.push(self.sequence("onAccept", nodes, &branch(0), true));
                }
                if let Some(nodes) = on_reject {
                    children.push(self.sequence("onReject", nodes, &branch(1), true));
                }
                ("throttle", children)
            }
            FlowNode::Clone { targets } => {
                let children = targets
                    .iter()
                    .enumerate()
                    .map(|(i, nodes)| {
                        let start = self.line(Expected::InvalidBranch);
                        let sequence = self.sequence("sequence", nodes, &branch(i), true);
                        let end = self.line(Expected::InvalidBranch);
                        element("target", start, end, false, vec![sequence])
                    })
                    .collect();
                ("clone", children)
            }
            FlowNode::Foreach { body } => ("foreach", vec![self.sequence("sequence", body, &branch(0), true)]),
            FlowNode::Entitlement { on_accept, on_reject, advice, obligations } => {
                let slots = [
                    ("obligations", obligations, 3),
                    ("advice", advice, 2),
                    ("onReject", on_reject, 1),
                    ("onAccept", on_accept, 0),
                ];
                let children = slots
                    .into_iter()
                    .filter_map(|(tag, nodes, index)| {
                        nodes.as_ref().map(|nodes| self.sequence(tag, nodes, &branch(index), true))
                    })
                    .collect();
                ("entitlementService", children)
            }
            FlowNode::Validate { on_fail } => {
                let schema = self.line(Expected::InvalidBranch);
                let children = vec![
                    element("schema", schema, schema, true, Vec::new()),
                    self.sequence("on-fail", on_fail, &branch(0), true),
                ];
                ("validate", children)
            }
            FlowNode::Rule { child_mediators } => {
                ("rule", vec![self.sequence("childMediators", child_mediators, &branch(0), true)])
            }
            FlowNode::Aggregate { on_complete } => {
                let condition = self.line(Expected::InvalidBranch);
                let children = vec![
                    element("completeCondition", condition, condition, true, Vec::new()),
                    self.sequence("onComplete", on_complete, &branch(0), true),
                ];
                ("aggregate", children)
            }
            FlowNode::Leaf { .. } | FlowNode::Unknown | FlowNode::Gap => {
                unreachable!("not a branching node")
            }
        };

        let close = self.line(Expected::InvalidBranch);
        element(tag, open, close, false, children)
    }
}

impl GeneratedFlow {
    pub fn layout(&self) -> LaidOutFlow {
        let mut layout = Layout { next_line: 0, oracle: Vec::new() };
        let mut document = layout.sequence("sequence", &self.mediators, &[], false);
        document["attributes"] = json!({ "name": "generated" });
        LaidOutFlow { document, oracle: layout.oracle }
    }
}

/// Generates a random number in the range [min, max] inclusive.
fn gen_range(g: &mut Gen, min: usize, max: usize) -> usize {
    min + (usize::arbitrary(g) % (max - min + 1))
}

fn gen_leaf(g: &mut Gen) -> FlowNode {
    FlowNode::Leaf { tag: *g.choose(LEAF_TAGS).unwrap(), multiline: gen_range(g, 0, 3) == 0 }
}

fn gen_branch(g: &mut Gen, depth: usize) -> Option<Vec<FlowNode>> {
    if gen_range(g, 0, 4) == 0 { None } else { Some(gen_sequence(g, depth, 0)) }
}

fn gen_node(g: &mut Gen, depth: usize) -> FlowNode {
    const LEAF_CHOICES: &[&str] = &["leaf", "leaf", "leaf", "gap", "unknown"];
    const ALL_CHOICES: &[&str] = &[
        "leaf", "leaf", "leaf", "gap", "unknown", "filter", "switch", "throttle", "clone", "foreach",
        "entitlement", "validate", "rule", "aggregate",
    ];
    let choices = if depth == 0 { LEAF_CHOICES } else { ALL_CHOICES };
    let next = depth.saturating_sub(1);
    match *g.choose(choices).unwrap() {
        "leaf" => gen_leaf(g),
        "gap" => FlowNode::Gap,
        "unknown" => FlowNode::Unknown,
        "filter" => FlowNode::Filter { then_branch: gen_branch(g, next), else_branch: gen_branch(g, next) },
        "switch" => FlowNode::Switch {
            cases: (0..gen_range(g, 0, 3)).map(|_| gen_sequence(g, next, 0)).collect(),
            default: gen_branch(g, next),
        },
        "throttle" => FlowNode::Throttle { on_accept: gen_branch(g, next), on_reject: gen_branch(g, next) },
        "clone" => FlowNode::Clone { targets: (0..gen_range(g, 1, 3)).map(|_| gen_sequence(g, next, 0)).collect() },
        "foreach" => FlowNode::Foreach { body: gen_sequence(g, next, 1) },
        "entitlement" => FlowNode::Entitlement {
            on_accept: gen_branch(g, next),
            on_reject: gen_branch(g, next),
            advice: gen_branch(g, next),
            obligations: gen_branch(g, next),
        },
        "validate" => FlowNode::Validate { on_fail: gen_sequence(g, next, 0) },
        "rule" => FlowNode::Rule { child_mediators: gen_sequence(g, next, 0) },
        "aggregate" => FlowNode::Aggregate { on_complete: gen_sequence(g, next, 0) },
        _ => unreachable!(),
    }
}

fn gen_sequence(g: &mut Gen, depth: usize, min_len: usize) -> Vec<FlowNode> {
    let len = gen_range(g, min_len, min_len + 4);
    (0..len).map(|_| gen_node(g, depth)).collect()
}

impl Arbitrary for GeneratedFlow {
    fn arbitrary(g: &mut Gen) -> Self {
        GeneratedFlow { mediators: gen_sequence(g, g.size().min(MAX_DEPTH), 1) }
    }
}

impl fmt::Display for GeneratedFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_nodes(f: &mut fmt::Formatter<'_>, nodes: &[FlowNode], indent: usize) -> fmt::Result {
            for node in nodes {
                let pad = "  ".repeat(indent);
                match node {
                    FlowNode::Leaf { tag, multiline } => {
                        writeln!(f, "{}{}{}", pad, tag, if *multiline { " (multiline)" } else { "" })?
                    }
                    FlowNode::Unknown => writeln!(f, "{}<unknown>", pad)?,
                    FlowNode::Gap => writeln!(f, "{}<gap>", pad)?,
                    FlowNode::Filter { then_branch, else_branch } => {
                        writeln!(f, "{}filter", pad)?;
                        for (label, branch) in [("then", then_branch), ("else", else_branch)] {
                            if let Some(nodes) = branch {
                                writeln!(f, "{}  {}:", pad, label)?;
                                write_nodes(f, nodes, indent + 2)?;
                            }
                        }
                    }
                    FlowNode::Switch { cases, default } => {
                        writeln!(f, "{}switch", pad)?;
                        for nodes in cases {
                            writeln!(f, "{}  case:", pad)?;
                            write_nodes(f, nodes, indent + 2)?;
                        }
                        if let Some(nodes) = default {
                            writeln!(f, "{}  default:", pad)?;
                            write_nodes(f, nodes, indent + 2)?;
                        }
                    }
                    FlowNode::Throttle { on_accept, on_reject } => {
                        writeln!(f, "{}throttle", pad)?;
                        for (label, branch) in [("onAccept", on_accept), ("onReject", on_reject)] {
                            if let Some(nodes) = branch {
                                writeln!(f, "{}  {}:", pad, label)?;
                                write_nodes(f, nodes, indent + 2)?;
                            }
                        }
                    }
                    FlowNode::Clone { targets } => {
                        writeln!(f, "{}clone", pad)?;
                        for nodes in targets {
                            writeln!(f, "{}  target:", pad)?;
                            write_nodes(f, nodes, indent + 2)?;
                        }
                    }
                    FlowNode::Foreach { body } => {
                        writeln!(f, "{}foreach", pad)?;
                        write_nodes(f, body, indent + 1)?;
                    }
                    FlowNode::Entitlement { on_accept, on_reject, advice, obligations } => {
                        writeln!(f, "{}entitlement", pad)?;
                        let slots = [
                            ("onAccept", on_accept),
                            ("onReject", on_reject),
                            ("advice", advice),
                            ("obligations", obligations),
                        ];
                        for (label, branch) in slots {
                            if let Some(nodes) = branch {
                                writeln!(f, "{}  {}:", pad, label)?;
                                write_nodes(f, nodes, indent + 2)?;
                            }
                        }
                    }
                    FlowNode::Validate { on_fail: nodes }
                    | FlowNode::Rule { child_mediators: nodes }
                    | FlowNode::Aggregate { on_complete: nodes } => {
                        let label = match node {
                            FlowNode::Validate { .. } => "validate on-fail",
                            FlowNode::Rule { .. } => "rule childMediators",
                            _ => "aggregate onComplete",
                        };
                        writeln!(f, "{}{}", pad, label)?;
                        write_nodes(f, nodes, indent + 1)?;
                    }
                }
            }
            Ok(())
        }
        write_nodes(f, &self.mediators, 0)
    }
}
