//! Request and response bodies of the registry endpoints.
//!
//! Bodies are strict: unknown fields, missing identity fields and wrong types
//! are rejected during deserialization, the remaining checks live in
//! [`RegistrationRequest::validate`].

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use super::error::RegistryError;
use crate::database::models::{
    FunctionIdentity, MonitorField, MonitorFilter, MonitorRecord, Sample,
};

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Body of `POST /monitoredFunction`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegistrationRequest {
    pub function_name: String,
    #[serde(default)]
    pub function_url: Option<String>,
    pub project_id: String,
    /// Required, but may be `null`
    #[serde(deserialize_with = "Option::deserialize")]
    pub tag: Option<String>,
    pub region: String,
    pub enabled: bool,
}

impl RegistrationRequest {
    /// Check field contents and turn the request into the record to store
    pub fn validate(self) -> Result<MonitorRecord, RegistryError> {
        for (field, value) in [
            ("functionName", &self.function_name),
            ("projectId", &self.project_id),
            ("region", &self.region),
        ] {
            if value.trim().is_empty() {
                return Err(RegistryError::InvalidParameters(format!("{field} must not be empty")));
            }
        }

        if let Some(function_url) = &self.function_url {
            validate_function_url(function_url)?;
        }

        Ok(MonitorRecord {
            identity: FunctionIdentity {
                function_name: self.function_name,
                project_id: self.project_id,
                region: self.region,
                tag: self.tag,
            },
            function_url: self.function_url,
            enabled: self.enabled,
        })
    }
}

fn validate_function_url(function_url: &str) -> Result<(), RegistryError> {
    let parsed = Url::parse(function_url).map_err(|e| {
        RegistryError::InvalidParameters(format!("functionUrl is not a valid URL: {e}"))
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(RegistryError::InvalidParameters(format!(
            "functionUrl has unsupported scheme: {scheme}"
        ))),
    }
}

/// Body of `POST /monitoringData`; every present field constrains the match
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QueryRequest {
    #[serde(default, deserialize_with = "present")]
    pub function_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub function_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub project_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub tag: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub region: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub enabled: Option<Option<bool>>,
}

impl QueryRequest {
    pub fn into_filter(self) -> MonitorFilter {
        let text_fields = [
            (MonitorField::FunctionName, self.function_name),
            (MonitorField::FunctionUrl, self.function_url),
            (MonitorField::ProjectId, self.project_id),
            (MonitorField::Tag, self.tag),
            (MonitorField::Region, self.region),
        ];

        let mut filter = MonitorFilter::new();
        for (field, value) in text_fields {
            if let Some(value) = value {
                filter = filter.with(field, value);
            }
        }
        if let Some(enabled) = self.enabled {
            filter = filter.with(MonitorField::Enabled, enabled);
        }
        filter
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub monitoring_ids: Vec<String>,
}

/// A monitored function with its full ping history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorHistory {
    pub id: String,
    #[serde(rename = "fn")]
    pub function: MonitorRecord,
    pub pings: Vec<Sample>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub data: Vec<MonitorHistory>,
}
