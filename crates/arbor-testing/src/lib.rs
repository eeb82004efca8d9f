//! Testing utilities and harness for Arbor.

pub mod harness;

pub use harness::*;

pub mod prelude {
    pub use crate::harness::*;
}
