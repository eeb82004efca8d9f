//! Element helpers over the Arbor builder: the small vocabulary the demo
//! applications are written in.

pub mod containers;
pub mod content;
pub mod controls;

pub use containers::*;
pub use content::*;
pub use controls::*;
