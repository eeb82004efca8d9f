use std::fmt;

use crate::app::InstanceId;
use crate::backend::NodeId;

/// Failures surfaced by the runtime. A render either completes fully or one
/// of these propagates to whatever initiated it; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    /// The host backend cannot realise the requested element tag.
    UnsupportedTag { tag: String },
    /// A native node id that the backend no longer (or never did) know about.
    MissingNode { id: NodeId },
    /// The component instance was disposed or never registered.
    UnknownInstance { instance: InstanceId },
    /// A render or state write reached an instance that has no mount parent.
    NotMounted { instance: InstanceId },
    /// The same instance was mounted twice during a single render pass.
    AlreadyMounted { instance: InstanceId },
    /// A state write re-entered an in-flight render, or nested renders
    /// exceeded the recursion bound.
    RenderCycle { instance: InstanceId },
    /// A state write outlived the runtime that owned its component.
    RuntimeDropped,
    /// Typed backend access asked for a different backend than the one mounted.
    BackendMismatch { expected: &'static str },
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::UnsupportedTag { tag } => write!(f, "unsupported element tag {tag:?}"),
            UiError::MissingNode { id } => write!(f, "native node {id} missing"),
            UiError::UnknownInstance { instance } => {
                write!(f, "component instance {instance} unknown or disposed")
            }
            UiError::NotMounted { instance } => {
                write!(f, "component instance {instance} has no mount parent")
            }
            UiError::AlreadyMounted { instance } => {
                write!(f, "component instance {instance} mounted twice in one pass")
            }
            UiError::RenderCycle { instance } => {
                write!(f, "render cycle detected for component instance {instance}")
            }
            UiError::RuntimeDropped => write!(f, "runtime dropped before the state write"),
            UiError::BackendMismatch { expected } => {
                write!(f, "backend type mismatch; expected {expected}")
            }
        }
    }
}

impl std::error::Error for UiError {}
