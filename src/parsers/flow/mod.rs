//! Flow-tree construction from a generic document tree.
//!
//! Builders run once per debugger request on the current document state; the result
//! is an [`Artifact`] whose sequences and mediators carry the source ranges the
//! resolvers work with.

mod conversion;

use thiserror::Error;
use tracing::debug;

use crate::ir::artifact::{
    Api, ApiResource, Artifact, NamedSequence, Proxy, ProxyTarget, SequenceSet, SequenceTemplate,
};
use crate::ir::kind::normalize_tag;
use crate::ir::range::RangeError;

use super::dom::{DomNode, child_named, children_named};
use super::position_utils::source_range_of;

pub use conversion::{build_mediator, build_mediators, build_sequence};

/// Errors that stop a document from being turned into a flow tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("<{tag}> at line {line} has an invalid range: {source}")]
    Range {
        tag: String,
        line: u32,
        #[source]
        source: RangeError,
    },

    #[error("<{tag}> at line {line} is missing required attribute '{attribute}'")]
    MissingAttribute {
        tag: String,
        line: u32,
        attribute: &'static str,
    },
}

/// Range of `node`, with the element named in the error.
pub(crate) fn range_of<N: DomNode>(node: &N) -> Result<crate::ir::SourceRange, BuildError> {
    source_range_of(node).map_err(|source| BuildError::Range {
        tag: node.tag().to_string(),
        line: node.start().line,
        source,
    })
}

fn required_attribute<N: DomNode>(node: &N, attribute: &'static str) -> Result<String, BuildError> {
    node.attribute(attribute)
        .map(str::to_string)
        .ok_or_else(|| BuildError::MissingAttribute {
            tag: node.tag().to_string(),
            line: node.start().line,
            attribute,
        })
}

/// Builds the artifact rooted at `root`.
///
/// Roots other than APIs, proxies, sequences and sequence templates come back as
/// [`Artifact::Unsupported`]; they have no body a breakpoint could stop in.
pub fn build_artifact<N: DomNode>(root: &N) -> Result<Artifact, BuildError> {
    let artifact = match normalize_tag(root.tag()).as_str() {
        "api" => Artifact::Api(build_api(root)?),
        "proxy" => Artifact::Proxy(build_proxy(root)?),
        "sequence" => Artifact::Sequence(NamedSequence {
            name: required_attribute(root, "name")?,
            sequence: build_sequence(root)?,
        }),
        "template" => match child_named(root, "sequence") {
            Some(body) => Artifact::Template(SequenceTemplate {
                name: required_attribute(root, "name")?,
                range: range_of(root)?,
                body: Some(build_sequence(body)?),
            }),
            // Endpoint templates have nothing to step through.
            None => Artifact::Unsupported { tag: "endpoint template".to_string() },
        },
        _ => Artifact::Unsupported { tag: root.tag().to_string() },
    };
    debug!("Built {} artifact from <{}>", artifact.kind_name(), root.tag());
    Ok(artifact)
}

fn build_api<N: DomNode>(node: &N) -> Result<Api, BuildError> {
    let resources = children_named(node, "resource")
        .into_iter()
        .map(build_resource)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Api {
        name: required_attribute(node, "name")?,
        context: node.attribute("context").map(str::to_string),
        range: range_of(node)?,
        resources,
    })
}

fn build_resource<N: DomNode>(node: &N) -> Result<ApiResource, BuildError> {
    let methods = node
        .attribute("methods")
        .map(|m| m.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();
    Ok(ApiResource {
        range: range_of(node)?,
        methods,
        uri_template: node.attribute("uri-template").map(str::to_string),
        url_mapping: node.attribute("url-mapping").map(str::to_string),
        sequences: build_sequence_set(node)?,
    })
}

fn build_proxy<N: DomNode>(node: &N) -> Result<Proxy, BuildError> {
    let target = child_named(node, "target")
        .map(|target| -> Result<ProxyTarget, BuildError> {
            Ok(ProxyTarget { range: range_of(target)?, sequences: build_sequence_set(target)? })
        })
        .transpose()?;
    Ok(Proxy {
        name: required_attribute(node, "name")?,
        range: range_of(node)?,
        target,
    })
}

/// Inline in/out/fault sequences of a resource or proxy target.
fn build_sequence_set<N: DomNode>(node: &N) -> Result<SequenceSet, BuildError> {
    let inline = |name: &str| child_named(node, name).map(build_sequence).transpose();
    Ok(SequenceSet {
        in_sequence: inline("inSequence")?,
        out_sequence: inline("outSequence")?,
        fault_sequence: inline("faultSequence")?,
    })
}
