use std::fmt;

use thiserror::Error;

/// Store call that failed while serving a registry request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    Lookup,
    Create,
    Update,
    SampleFetch,
}

impl fmt::Display for StorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorePhase::Lookup => write!(f, "lookup"),
            StorePhase::Create => write!(f, "create"),
            StorePhase::Update => write!(f, "update"),
            StorePhase::SampleFetch => write!(f, "sample fetch"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Store {phase} failed: {source:#}")]
    Store {
        phase: StorePhase,
        #[source]
        source: anyhow::Error,
    },
}

impl RegistryError {
    pub fn store(phase: StorePhase, source: anyhow::Error) -> Self {
        RegistryError::Store { phase, source }
    }

    /// Human readable summary for API callers
    pub fn message(&self) -> &'static str {
        match self {
            RegistryError::InvalidParameters(_) => {
                "Cannot find monitored function - Invalid parameters"
            }
            RegistryError::Store { phase: StorePhase::Lookup, .. } => {
                "Cannot find monitored function in the store"
            }
            RegistryError::Store { phase: StorePhase::Create, .. } => {
                "Cannot add new monitored function to the store"
            }
            RegistryError::Store { phase: StorePhase::Update, .. } => {
                "Cannot update monitored functions in the store"
            }
            RegistryError::Store { phase: StorePhase::SampleFetch, .. } => {
                "Cannot retrieve function pings from the store"
            }
        }
    }
}
