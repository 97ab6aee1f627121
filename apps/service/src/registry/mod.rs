//! Registration and query operations behind the HTTP endpoints.

pub mod error;
mod query;
mod registration;
pub mod request;

pub use error::{RegistryError, StorePhase};
pub use request::{
    MonitorHistory, QueryRequest, QueryResponse, RegistrationRequest, RegistrationResponse,
};

use std::sync::Arc;

use crate::database::Database;

/// Registry of monitored functions
///
/// Holds no state of its own, every call goes to the store it was built with.
#[derive(Clone)]
pub struct MonitorRegistry {
    database: Arc<dyn Database>,
}

impl MonitorRegistry {
    pub fn new(database: Arc<dyn Database>) -> Self {
        Self { database }
    }
}
