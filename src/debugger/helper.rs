//! Request-level entry points: routes breakpoints to the sequence that holds them and
//! wraps the resolvers' results into [`DebugInfo`] records.

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::ir::artifact::{
    Api, Artifact, FlowDirection, NamedSequence, Proxy, SequenceSet, SequenceTemplate,
};
use crate::ir::mediator::Sequence;
use crate::parsers::dom::DomNode;
use crate::parsers::flow::build_artifact;

use super::batch::resolve_positions;
use super::breakpoint::Breakpoint;
use super::debug_info::{DebugContext, DebugInfo, ResourceKey, SequenceType};
use super::error::{Container, DebuggerError, ResolveError};
use super::position::resolve_position;
use super::step_over::{StepOverInfo, step_over};

/// Results of one batch request, keyed by breakpoint.
pub type BreakpointResults = FxHashMap<Breakpoint, DebugInfo>;

/// One step-over request: where the step starts and the breakpoints to install for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTargets {
    pub step: StepOverInfo,
    pub breakpoints: Vec<(Breakpoint, DebugInfo)>,
}

/// The sequence a breakpoint line routes to.
struct Located<'a> {
    sequence: &'a Sequence,
    container: Container,
    context: DebugContext,
}

type Routed<'a> = Result<Located<'a>, (DebugContext, ResolveError)>;

/// Artifacts with a body a breakpoint can stop in.
#[derive(Debug, Clone)]
enum Root {
    Api(Api),
    Proxy(Proxy),
    Sequence(NamedSequence),
    Template(SequenceTemplate),
}

/// Debugger operations over one built artifact.
///
/// Built per request from the current document; the artifact is read-only afterwards.
#[derive(Debug, Clone)]
pub struct DebuggerHelper {
    root: Root,
}

impl DebuggerHelper {
    pub fn new(artifact: Artifact) -> Result<Self, DebuggerError> {
        let root = match artifact {
            Artifact::Api(api) => Root::Api(api),
            Artifact::Proxy(proxy) => Root::Proxy(proxy),
            Artifact::Sequence(named) => Root::Sequence(named),
            Artifact::Template(template) => Root::Template(template),
            Artifact::Unsupported { tag } => return Err(DebuggerError::Unsupported(tag)),
        };
        Ok(DebuggerHelper { root })
    }

    pub fn from_document<N: DomNode>(root: &N) -> Result<Self, DebuggerError> {
        DebuggerHelper::new(build_artifact(root)?)
    }

    /// Name of the wrapped artifact (API, proxy, sequence or template key).
    pub fn artifact_name(&self) -> &str {
        match &self.root {
            Root::Api(api) => &api.name,
            Root::Proxy(proxy) => &proxy.name,
            Root::Sequence(named) => &named.name,
            Root::Template(template) => &template.name,
        }
    }

    fn locate(&self, line: u32) -> Routed<'_> {
        match &self.root {
            Root::Api(api) => locate_in_api(api, line),
            Root::Proxy(proxy) => locate_in_proxy(proxy, line),
            Root::Sequence(named) => Ok(Located {
                sequence: &named.sequence,
                container: Container::NamedSequence,
                context: DebugContext::Sequence { sequence_key: named.name.clone() },
            }),
            Root::Template(template) => {
                let context = DebugContext::Template { template_key: template.name.clone() };
                match &template.body {
                    Some(body) => Ok(Located { sequence: body, container: Container::Template, context }),
                    None => Err((context, ResolveError::NoSequence(Container::Template))),
                }
            }
        }
    }

    /// Resolves one breakpoint.
    pub fn debug_info(&self, breakpoint: &Breakpoint) -> DebugInfo {
        let result = match self.locate(breakpoint.line) {
            Err((context, error)) => DebugInfo::invalid(context, error),
            Ok(located) => {
                let outcome = resolve_position(located.sequence, located.container, breakpoint.line)
                    .unwrap_or(Err(ResolveError::NoMediator(located.container)));
                DebugInfo::new(located.context, outcome)
            }
        };
        log_result(breakpoint, &result);
        result
    }

    /// Resolves many breakpoints, walking each sequence once.
    pub fn debug_info_batch(&self, breakpoints: &[Breakpoint]) -> BreakpointResults {
        let mut results = BreakpointResults::default();
        let mut groups: Vec<(Located<'_>, Vec<Breakpoint>)> = Vec::new();

        for breakpoint in breakpoints {
            match self.locate(breakpoint.line) {
                Err((context, error)) => {
                    results.insert(*breakpoint, DebugInfo::invalid(context, error));
                }
                Ok(located) => {
                    match groups.iter_mut().find(|(g, _)| std::ptr::eq(g.sequence, located.sequence)) {
                        Some((_, members)) => members.push(*breakpoint),
                        None => groups.push((located, vec![*breakpoint])),
                    }
                }
            }
        }

        for (located, members) in groups {
            debug!("Resolving {} breakpoints in {}", members.len(), located.container);
            for (breakpoint, outcome) in resolve_positions(located.sequence, located.container, members) {
                results.insert(breakpoint, DebugInfo::new(located.context.clone(), outcome));
            }
        }

        for breakpoint in breakpoints {
            if let Some(result) = results.get(breakpoint) {
                log_result(breakpoint, result);
            }
        }
        results
    }

    /// Finds the suspended mediator on `breakpoint` and where one step can land.
    pub fn step_over(&self, breakpoint: &Breakpoint) -> Result<StepOverInfo, ResolveError> {
        let located = self.locate(breakpoint.line).map_err(|(_, error)| error)?;
        step_over(located.sequence, located.container, breakpoint.line, &[])
            .unwrap_or(Err(ResolveError::NoMediator(located.container)))
    }

    /// The step from `breakpoint` plus fresh breakpoints for every line it can reach,
    /// resolved in one batch and returned in line order.
    pub fn step_over_breakpoints(&self, breakpoint: &Breakpoint) -> Result<StepTargets, ResolveError> {
        let step = self.step_over(breakpoint)?;
        info!("Step from {} at line {} reaches lines {:?}", step.mediator, step.line, step.next_lines);

        let targets: Vec<Breakpoint> = step.next_lines.iter().map(|&line| Breakpoint::new(line)).collect();
        let mut results = self.debug_info_batch(&targets);
        let breakpoints = targets
            .into_iter()
            .filter_map(|b| results.remove(&b).map(|info| (b, info)))
            .collect();
        Ok(StepTargets { step, breakpoints })
    }
}

fn log_result(breakpoint: &Breakpoint, result: &DebugInfo) {
    match result.mediator_position() {
        Some(position) => info!("Breakpoint at line {} resolved to position '{}'", breakpoint.line, position),
        None => info!(
            "Breakpoint at line {} is invalid: {}",
            breakpoint.line,
            result.error().unwrap_or_default()
        ),
    }
}

fn locate_in_api(api: &Api, line: u32) -> Routed<'_> {
    let mut context = DebugContext::Api { api_key: api.name.clone(), resource: None, sequence_type: None };
    if !api.range.contains_line(line) {
        return Err((context, ResolveError::NotInRange(Container::Api)));
    }
    let Some(resource) = api.resources.iter().find(|r| r.range.contains_line(line)) else {
        return Err((context, ResolveError::NotInRange(Container::ApiResource)));
    };

    let key = ResourceKey {
        method: resource.methods.first().cloned(),
        uri_template: resource.uri_template.clone(),
        url_mapping: resource.url_mapping.clone(),
    };
    if let DebugContext::Api { resource, .. } = &mut context {
        *resource = Some(key);
    }
    locate_in_set(&resource.sequences, line, Container::ApiResource, context, SequenceType::api)
}

fn locate_in_proxy(proxy: &Proxy, line: u32) -> Routed<'_> {
    let context = DebugContext::Proxy { proxy_key: proxy.name.clone(), sequence_type: None };
    if !proxy.range.contains_line(line) {
        return Err((context, ResolveError::NotInRange(Container::Proxy)));
    }
    let Some(target) = proxy.target.as_ref().filter(|t| t.range.contains_line(line)) else {
        return Err((context, ResolveError::NotInRange(Container::ProxyTarget)));
    };
    locate_in_set(&target.sequences, line, Container::ProxyTarget, context, SequenceType::proxy)
}

fn locate_in_set<'a>(
    set: &'a SequenceSet,
    line: u32,
    owner: Container,
    mut context: DebugContext,
    tag: fn(FlowDirection) -> SequenceType,
) -> Routed<'a> {
    let Some((direction, sequence)) = set.containing(line) else {
        return Err((context, ResolveError::NoSequence(owner)));
    };
    if let DebugContext::Api { sequence_type, .. } | DebugContext::Proxy { sequence_type, .. } = &mut context {
        *sequence_type = Some(tag(direction));
    }
    Ok(Located { sequence, container: Container::FlowSequence(direction), context })
}
