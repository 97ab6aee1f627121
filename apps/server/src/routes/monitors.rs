use actix_web::{HttpResponse, post, web};
use tracing::error;
use warmwatch_service::MonitorRegistry;
use warmwatch_service::registry::{QueryRequest, RegistrationRequest};

use crate::error::ApiError;

macros_utils::routes! {
    route monitored_function,
    route monitoring_data,
}

/// Register a function for monitoring, or switch its monitoring on or off
#[post("/monitoredFunction")]
pub async fn monitored_function(
    registry: web::Data<MonitorRegistry>,
    body: web::Json<RegistrationRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = registry.register(body.into_inner()).await.inspect_err(|e| {
        error!("Registration failed: {e}");
    })?;
    Ok(HttpResponse::Ok().json(response))
}

/// Monitored functions matching a partial filter, with their pings
#[post("/monitoringData")]
pub async fn monitoring_data(
    registry: web::Data<MonitorRegistry>,
    body: web::Json<QueryRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = registry.query(body.into_inner()).await.inspect_err(|e| {
        error!("Monitoring data query failed: {e}");
    })?;
    Ok(HttpResponse::Ok().json(response))
}
