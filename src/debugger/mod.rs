//! Breakpoint resolution: turning source lines into mediator positions the runtime
//! debugger understands, one breakpoint at a time, in batches, or for a step-over.

pub mod batch;
pub mod breakpoint;
pub mod debug_info;
pub mod error;
pub mod helper;
pub mod position;
pub mod step_over;

pub use batch::{BatchResolver, resolve_positions};
pub use breakpoint::Breakpoint;
pub use debug_info::{DebugContext, DebugInfo, ResourceKey, SequenceType};
pub use error::{Container, DebuggerError, ResolveError};
pub use helper::{BreakpointResults, DebuggerHelper, StepTargets};
pub use position::{MediatorPosition, PositionResolver, Resolution, resolve_position};
pub use step_over::{StepOverInfo, step_over};
