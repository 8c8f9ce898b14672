//! Tree-shaped keyed registry with guarded construction.

mod base;

pub use base::{available_methods, Registered, Registry};
