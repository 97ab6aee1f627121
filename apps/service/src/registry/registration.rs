use futures::future::join_all;
use tracing::{debug, error, info};

use super::error::{RegistryError, StorePhase};
use super::request::{RegistrationRequest, RegistrationResponse};
use super::MonitorRegistry;
use crate::database::models::MonitorFilter;

impl MonitorRegistry {
    /// Register a monitored function or toggle its monitoring.
    ///
    /// With no record sharing the request's identity a new one is created.
    /// Otherwise every match whose `enabled` differs from the request gets
    /// the request merged in and its id reported; matches already in the
    /// requested state are left alone.
    ///
    /// Two racing registrations of a new identity may both create a record.
    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationResponse, RegistryError> {
        let record = request.validate()?;

        let existing = self
            .database
            .find_monitors(&MonitorFilter::identity(&record.identity))
            .await
            .map_err(|e| RegistryError::store(StorePhase::Lookup, e))?;

        if existing.is_empty() {
            let id = self
                .database
                .add_monitor(&record)
                .await
                .map_err(|e| RegistryError::store(StorePhase::Create, e))?;
            info!("Registered {} as {}", record.identity, id);
            return Ok(RegistrationResponse { monitoring_ids: vec![id] });
        }

        let record = &record;
        let toggles = existing
            .into_iter()
            .filter(|monitor| {
                let changed = monitor.record.enabled != record.enabled;
                if !changed {
                    debug!("{} already has enabled = {}", monitor.id, record.enabled);
                }
                changed
            })
            .map(move |monitor| async move {
                match self.database.merge_monitor(&monitor.id, record).await {
                    Ok(()) => Ok(monitor.id),
                    Err(e) => Err((monitor.id, e)),
                }
            });

        let mut monitoring_ids = Vec::new();
        let mut failure = None;
        for outcome in join_all(toggles).await {
            match outcome {
                Ok(id) => {
                    info!("Set enabled = {} on {} ({})", record.enabled, id, record.identity);
                    monitoring_ids.push(id);
                }
                Err((id, e)) => {
                    error!("Failed to update {}: {:#}", id, e);
                    if failure.is_none() {
                        failure = Some(e);
                    }
                }
            }
        }

        // Toggles committed for other matches stay in place.
        if let Some(e) = failure {
            return Err(RegistryError::store(StorePhase::Update, e));
        }

        Ok(RegistrationResponse { monitoring_ids })
    }
}
