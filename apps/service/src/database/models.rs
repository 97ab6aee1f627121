use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Fields identifying a monitored function.
///
/// Two records with the same identity describe the same target, `tag`
/// included (a `null` tag only equals another `null` tag).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionIdentity {
    pub function_name: String,
    pub project_id: String,
    pub region: String,
    pub tag: Option<String>,
}

impl fmt::Display for FunctionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.project_id, self.region, self.function_name)?;
        if let Some(tag) = &self.tag {
            write!(f, "@{tag}")?;
        }
        Ok(())
    }
}

/// A monitored function as stored in `monitored_functions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorRecord {
    #[serde(flatten)]
    pub identity: FunctionIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_url: Option<String>,
    pub enabled: bool,
}

/// A stored record together with its generated id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorDocument {
    pub id: String,
    pub record: MonitorRecord,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MonitorDocument {
    /// URL the sweep should probe, if this record takes part in sweeps at all.
    pub fn probe_target(&self) -> Option<&str> {
        if !self.record.enabled {
            return None;
        }
        self.record.function_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// One latency measurement taken by the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Unix epoch, milliseconds
    pub timestamp: i64,
    /// Absent when the probe could not be dispatched at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_duration: Option<u64>,
}

impl Sample {
    /// Sample stamped with the current wall-clock time
    pub fn now(response_duration: Option<u64>) -> Self {
        Self { timestamp: Utc::now().timestamp_millis(), response_duration }
    }
}

/// Columns of `monitored_functions` a filter may constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorField {
    FunctionName,
    FunctionUrl,
    ProjectId,
    Region,
    Tag,
    Enabled,
}

impl MonitorField {
    pub fn column(self) -> &'static str {
        match self {
            MonitorField::FunctionName => "function_name",
            MonitorField::FunctionUrl => "function_url",
            MonitorField::ProjectId => "project_id",
            MonitorField::Region => "region",
            MonitorField::Tag => "tag",
            MonitorField::Enabled => "enabled",
        }
    }
}

/// Value a field is compared against. `Null` only matches stored nulls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    Text(String),
    Bool(bool),
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Conjunction of equality conditions over monitor fields.
///
/// An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorFilter {
    conditions: Vec<(MonitorField, FieldValue)>,
}

impl MonitorFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter matching exactly the records sharing `identity`
    pub fn identity(identity: &FunctionIdentity) -> Self {
        Self::new()
            .with(MonitorField::FunctionName, identity.function_name.as_str())
            .with(MonitorField::ProjectId, identity.project_id.as_str())
            .with(MonitorField::Region, identity.region.as_str())
            .with(MonitorField::Tag, identity.tag.clone())
    }

    #[must_use]
    pub fn with(mut self, field: MonitorField, value: impl Into<FieldValue>) -> Self {
        self.conditions.push((field, value.into()));
        self
    }

    pub fn conditions(&self) -> &[(MonitorField, FieldValue)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(tag: Option<&str>) -> FunctionIdentity {
        FunctionIdentity {
            function_name: "f1".to_string(),
            project_id: "p1".to_string(),
            region: "us".to_string(),
            tag: tag.map(str::to_string),
        }
    }

    #[test]
    fn test_identity_filter_keeps_null_tag() {
        let filter = MonitorFilter::identity(&identity(None));
        assert_eq!(filter.conditions().len(), 4);
        assert!(filter.conditions().contains(&(MonitorField::Tag, FieldValue::Null)));
    }

    #[test]
    fn test_record_serializes_null_tag_and_skips_missing_url() {
        let record = MonitorRecord { identity: identity(None), function_url: None, enabled: true };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "functionName": "f1",
                "projectId": "p1",
                "region": "us",
                "tag": null,
                "enabled": true,
            })
        );
    }

    #[test]
    fn test_sample_omits_missing_duration() {
        let sample = Sample { timestamp: 10, response_duration: None };
        assert_eq!(serde_json::to_value(sample).unwrap(), serde_json::json!({ "timestamp": 10 }));
    }

    #[test]
    fn test_probe_target() {
        let mut document = MonitorDocument {
            id: "a".to_string(),
            record: MonitorRecord {
                identity: identity(Some("v2")),
                function_url: Some("https://x".to_string()),
                enabled: true,
            },
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(document.probe_target(), Some("https://x"));

        document.record.function_url = Some(String::new());
        assert_eq!(document.probe_target(), None);

        document.record.function_url = Some("https://x".to_string());
        document.record.enabled = false;
        assert_eq!(document.probe_target(), None);
    }

    #[test]
    fn test_identity_display() {
        assert_eq!(identity(None).to_string(), "p1/us/f1");
        assert_eq!(identity(Some("v2")).to_string(), "p1/us/f1@v2");
    }
}
