//! Registry errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("'{name}' is abstract and is designed to be instantiated through the `load(name)` factory")]
    InstantiationNotAllowed { name: String },

    #[error("Registry entry not found: {0}")]
    NotFound(String),

    #[error("Registry key already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),
}
