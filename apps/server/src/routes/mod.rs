use actix_web::web::{self, ServiceConfig};
use tracing::warn;
use warmwatch_service::registry::RegistryError;

use crate::error::ApiError;

mod health;
mod monitors;

pub fn routes(cfg: &mut ServiceConfig) {
    health::routes(cfg);
    monitors::routes(cfg);
}

/// JSON extractor settings: undecodable bodies become invalid-parameter errors
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        warn!("Rejected request body: {err}");
        ApiError::from(RegistryError::InvalidParameters(err.to_string())).into()
    })
}
