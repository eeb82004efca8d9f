//! Core runtime for Arbor, a minimal reactive UI experiment.
//!
//! A declarative tree of component calls produces a native visual tree
//! through a pluggable host [`Backend`]. Components own reactive state; any
//! write replaces the whole value and synchronously rebuilds the owning
//! component's subtree. Because a rebuild would normally destroy interactive
//! focus, elements can carry a logical key: the last keyed node that received
//! an event is spliced back into the freshly built tree and refocused.

mod app;
mod backend;
mod error;
mod focus;
mod ingredient;
mod state;

pub use app::{App, BuildCx, Component, InstanceId, Scope};
pub use backend::{Backend, EventCallback, MemoryBackend, NodeId};
pub use error::UiError;
pub use ingredient::{
    attr, attrs, child, key, list, mount, on, style, text, AttributeMap, EventMap, Ingredient,
    Listeners, MountSpec, PropValue, Props, StyleMap,
};
pub use state::StateCell;
