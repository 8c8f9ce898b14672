//! # registree
//!
//! Keyed factory registry with category namespaces.
//!
//! A root [`Registry`] collects implementations in a tree: categories opened
//! directly under the root define keyed namespaces, and concrete entries
//! registered inside them carry factories invoked through load-by-name
//! lookup. The root and its categories are abstract and cannot be
//! instantiated directly.
//!
//! ## Components
//!
//! - [`Registry`] - A handle to one node of the registry tree
//! - [`Registered`] - Trait for values produced by registry factories
//! - [`RegistryError`] - Errors for guarded construction and registration
//! - [`available_methods`] - Ordered key listing for a registry node

pub mod error;
pub mod registry;

pub use error::RegistryError;
pub use registry::{available_methods, Registered, Registry};
