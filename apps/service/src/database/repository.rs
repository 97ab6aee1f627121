use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use libsql::{Row, Value, params, params::Params};
use uuid::Uuid;

use super::models::{
    FieldValue, FunctionIdentity, MonitorDocument, MonitorFilter, MonitorRecord, Sample,
};
use crate::pool::{LibsqlManager, LibsqlPool};

const MONITOR_COLUMNS: &str =
    "id, function_name, project_id, region, tag, function_url, enabled, created_at, updated_at";

/// Document-store operations the sweep and the registry rely on
#[async_trait]
pub trait Database: Send + Sync {
    /// Records matching every condition of `filter`, oldest first
    async fn find_monitors(&self, filter: &MonitorFilter) -> Result<Vec<MonitorDocument>>;

    /// Store a new record under a generated id and return that id
    async fn add_monitor(&self, record: &MonitorRecord) -> Result<String>;

    /// Merge `record` into the existing record `id`.
    ///
    /// A missing `function_url` keeps the stored one.
    async fn merge_monitor(&self, id: &str, record: &MonitorRecord) -> Result<()>;

    /// Append a sample to the history of monitor `monitor_id`
    async fn add_sample(&self, monitor_id: &str, sample: &Sample) -> Result<i64>;

    /// Full sample history of a monitor, ascending by timestamp
    async fn get_samples(&self, monitor_id: &str) -> Result<Vec<Sample>>;
}

/// LibSQL database implementation
pub struct DatabaseImpl {
    pool: LibsqlPool,
}

impl DatabaseImpl {
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    /// Close the pool; connections handed out afterwards fail
    pub fn close(&self) {
        self.pool.close();
    }

    async fn get_conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>> {
        Ok(self.pool.get().await?)
    }
}

fn filter_clause(filter: &MonitorFilter) -> (String, Params) {
    if filter.is_empty() {
        return (String::new(), Params::None);
    }

    let mut clauses = Vec::with_capacity(filter.conditions().len());
    let mut values = Vec::with_capacity(filter.conditions().len());
    for (field, value) in filter.conditions() {
        // `IS` so that a null tag matches only null tags
        clauses.push(format!("{} IS ?", field.column()));
        values.push(match value {
            FieldValue::Null => Value::Null,
            FieldValue::Text(text) => Value::Text(text.clone()),
            FieldValue::Bool(flag) => Value::Integer(i64::from(*flag)),
        });
    }

    (format!(" WHERE {}", clauses.join(" AND ")), Params::Positional(values))
}

fn monitor_from_row(row: &Row) -> Result<MonitorDocument> {
    Ok(MonitorDocument {
        id: row.get(0)?,
        record: MonitorRecord {
            identity: FunctionIdentity {
                function_name: row.get(1)?,
                project_id: row.get(2)?,
                region: row.get(3)?,
                tag: row.get(4)?,
            },
            function_url: row.get(5)?,
            enabled: row.get::<i64>(6)? != 0,
        },
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[async_trait]
impl Database for DatabaseImpl {
    async fn find_monitors(&self, filter: &MonitorFilter) -> Result<Vec<MonitorDocument>> {
        let conn = self.get_conn().await?;
        let (where_clause, params) = filter_clause(filter);
        let sql = format!(
            "SELECT {MONITOR_COLUMNS} FROM monitored_functions{where_clause} ORDER BY created_at, id"
        );

        let mut rows = conn.query(&sql, params).await?;
        let mut monitors = Vec::new();
        while let Some(row) = rows.next().await? {
            monitors.push(monitor_from_row(&row)?);
        }

        Ok(monitors)
    }

    async fn add_monitor(&self, record: &MonitorRecord) -> Result<String> {
        let conn = self.get_conn().await?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO monitored_functions (id, function_name, project_id, region, tag, function_url, enabled, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id.clone(),
                record.identity.function_name.clone(),
                record.identity.project_id.clone(),
                record.identity.region.clone(),
                record.identity.tag.clone(),
                record.function_url.clone(),
                i64::from(record.enabled),
                now,
                now
            ],
        )
        .await?;

        Ok(id)
    }

    async fn merge_monitor(&self, id: &str, record: &MonitorRecord) -> Result<()> {
        let conn = self.get_conn().await?;

        let updated = conn
            .execute(
                "UPDATE monitored_functions SET function_name = ?, project_id = ?, region = ?, tag = ?, function_url = COALESCE(?, function_url), enabled = ?, updated_at = ? WHERE id = ?",
                params![
                    record.identity.function_name.clone(),
                    record.identity.project_id.clone(),
                    record.identity.region.clone(),
                    record.identity.tag.clone(),
                    record.function_url.clone(),
                    i64::from(record.enabled),
                    Utc::now().timestamp_millis(),
                    id.to_string()
                ],
            )
            .await?;

        if updated == 0 {
            return Err(anyhow!("monitored function {id} does not exist"));
        }
        Ok(())
    }

    async fn add_sample(&self, monitor_id: &str, sample: &Sample) -> Result<i64> {
        let conn = self.get_conn().await?;
        let duration = sample.response_duration.map(i64::try_from).transpose()?;

        conn.execute(
            "INSERT INTO pings (monitor_id, timestamp, response_duration) VALUES (?, ?, ?)",
            params![monitor_id.to_string(), sample.timestamp, duration],
        )
        .await?;

        Ok(conn.last_insert_rowid())
    }

    async fn get_samples(&self, monitor_id: &str) -> Result<Vec<Sample>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT timestamp, response_duration FROM pings WHERE monitor_id = ? ORDER BY timestamp, id",
                params![monitor_id.to_string()],
            )
            .await?;

        let mut samples = Vec::new();
        while let Some(row) = rows.next().await? {
            samples.push(Sample {
                timestamp: row.get(0)?,
                response_duration: row.get::<Option<i64>>(1)?.map(|v| v as u64),
            });
        }

        Ok(samples)
    }
}
