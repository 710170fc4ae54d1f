//! Document input: the generic element tree and the flow-tree builders.

pub mod dom;
pub mod flow;
pub mod position_utils;

pub use dom::{DomNode, Element};
pub use flow::{BuildError, build_artifact};
