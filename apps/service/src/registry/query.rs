use futures::future::try_join_all;
use tracing::debug;

use super::MonitorRegistry;
use super::error::{RegistryError, StorePhase};
use super::request::{MonitorHistory, QueryRequest, QueryResponse};

impl MonitorRegistry {
    /// Monitored functions matching every field present in `request`, each
    /// with its pings in ascending timestamp order.
    pub async fn query(&self, request: QueryRequest) -> Result<QueryResponse, RegistryError> {
        let filter = request.into_filter();

        let monitors = self
            .database
            .find_monitors(&filter)
            .await
            .map_err(|e| RegistryError::store(StorePhase::Lookup, e))?;

        debug!("Query matched {} monitored functions", monitors.len());

        let data = try_join_all(monitors.into_iter().map(|monitor| async move {
            let mut pings = self.database.get_samples(&monitor.id).await?;
            pings.sort_by_key(|ping| ping.timestamp);
            Ok::<_, anyhow::Error>(MonitorHistory {
                id: monitor.id,
                function: monitor.record,
                pings,
            })
        }))
        .await
        .map_err(|e| RegistryError::store(StorePhase::SampleFetch, e))?;

        Ok(QueryResponse { data })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::database::models::{MonitorDocument, MonitorFilter, MonitorRecord, Sample};
    use crate::database::{Database, DatabaseImpl};
    use crate::database::testing::temp_database;
    use crate::registry::RegistrationRequest;

    fn registration(name: &str, tag: Option<&str>) -> RegistrationRequest {
        serde_json::from_value(json!({
            "functionName": name,
            "projectId": "p1",
            "region": "us",
            "tag": tag,
            "enabled": true,
            "functionUrl": "https://x"
        }))
        .unwrap()
    }

    fn query(body: serde_json::Value) -> QueryRequest {
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn test_query_returns_sorted_pings_of_matches_only() -> Result<()> {
        let (_dir, database) = temp_database().await?;
        let registry = MonitorRegistry::new(database.clone());

        let f1 = registry.register(registration("f1", None)).await?.monitoring_ids.remove(0);
        let f2 = registry.register(registration("f2", None)).await?.monitoring_ids.remove(0);

        for timestamp in [30, 10, 20] {
            database.add_sample(&f1, &Sample { timestamp, response_duration: Some(5) }).await?;
        }
        database.add_sample(&f2, &Sample { timestamp: 15, response_duration: None }).await?;

        let response = registry.query(query(json!({ "functionName": "f1" }))).await?;

        assert_eq!(response.data.len(), 1);
        let history = &response.data[0];
        assert_eq!(history.id, f1);
        assert_eq!(history.function.identity.function_name, "f1");
        let timestamps: Vec<i64> = history.pings.iter().map(|ping| ping.timestamp).collect();
        assert_eq!(timestamps, vec![10, 20, 30]);
        Ok(())
    }

    #[tokio::test]
    async fn test_query_null_tag_is_a_constraint() -> Result<()> {
        let (_dir, database) = temp_database().await?;
        let registry = MonitorRegistry::new(database);

        registry.register(registration("f1", None)).await?;
        registry.register(registration("f1", Some("v2"))).await?;

        let untagged = registry.query(query(json!({ "functionName": "f1", "tag": null }))).await?;
        assert_eq!(untagged.data.len(), 1);
        assert_eq!(untagged.data[0].function.identity.tag, None);

        let all = registry.query(query(json!({ "functionName": "f1" }))).await?;
        assert_eq!(all.data.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_query_without_match_is_empty() -> Result<()> {
        let (_dir, database) = temp_database().await?;
        let registry = MonitorRegistry::new(database);

        let response = registry.query(query(json!({ "projectId": "nobody" }))).await?;

        assert!(response.data.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_query_by_enabled() -> Result<()> {
        let (_dir, database) = temp_database().await?;
        let registry = MonitorRegistry::new(database);

        registry.register(registration("f1", None)).await?;
        let mut disabled = registration("f2", None);
        disabled.enabled = false;
        registry.register(disabled).await?;

        let response = registry.query(query(json!({ "enabled": false }))).await?;

        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].function.identity.function_name, "f2");
        Ok(())
    }

    /// Serves records but cannot read their samples
    struct FailingSamples {
        inner: Arc<DatabaseImpl>,
    }

    #[async_trait]
    impl Database for FailingSamples {
        async fn find_monitors(&self, filter: &MonitorFilter) -> Result<Vec<MonitorDocument>> {
            self.inner.find_monitors(filter).await
        }

        async fn add_monitor(&self, record: &MonitorRecord) -> Result<String> {
            self.inner.add_monitor(record).await
        }

        async fn merge_monitor(&self, id: &str, record: &MonitorRecord) -> Result<()> {
            self.inner.merge_monitor(id, record).await
        }

        async fn add_sample(&self, monitor_id: &str, sample: &Sample) -> Result<i64> {
            self.inner.add_sample(monitor_id, sample).await
        }

        async fn get_samples(&self, _monitor_id: &str) -> Result<Vec<Sample>> {
            Err(anyhow!("read rejected"))
        }
    }

    #[tokio::test]
    async fn test_query_reports_sample_fetch_phase() -> Result<()> {
        let (_dir, inner) = temp_database().await?;
        MonitorRegistry::new(inner.clone()).register(registration("f1", None)).await?;

        let registry = MonitorRegistry::new(Arc::new(FailingSamples { inner }));
        let error = registry.query(query(json!({ "functionName": "f1" }))).await.unwrap_err();

        assert!(matches!(error, RegistryError::Store { phase: StorePhase::SampleFetch, .. }));
        assert_eq!(error.message(), "Cannot retrieve function pings from the store");
        Ok(())
    }

    #[tokio::test]
    async fn test_query_without_match_skips_sample_fetch() -> Result<()> {
        let (_dir, inner) = temp_database().await?;
        let registry = MonitorRegistry::new(Arc::new(FailingSamples { inner }));

        let response = registry.query(query(json!({ "functionName": "f1" }))).await?;

        assert!(response.data.is_empty());
        Ok(())
    }
}
