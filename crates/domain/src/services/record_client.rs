//! Record API client abstraction and response envelopes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{RecordFailure, ServiceError};
use crate::query::QueryDescriptor;

/// Field values of one record, keyed by record field name.
pub type RecordFields = Map<String, Value>;

/// Transport-level failures talking to the record API.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record API credentials are not configured")]
    MissingCredentials,

    #[error("request to record API failed: {0}")]
    Transport(String),

    #[error("record API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode record API response: {0}")]
    Decode(String),
}

impl From<RecordError> for ServiceError {
    fn from(err: RecordError) -> Self {
        ServiceError::Network(err.to_string())
    }
}

/// Response to a list fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Value>>,
    /// Some tables answer list fetches under `results` instead of `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ListEnvelope {
    pub fn ok(data: Vec<Value>, total: i64) -> Self {
        Self {
            success: true,
            data: Some(data),
            results: None,
            total: Some(total),
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Rows and authoritative total. A missing total falls back to the row count.
    pub fn into_page(self) -> Result<(Vec<Value>, i64), ServiceError> {
        if !self.success {
            return Err(ServiceError::RemoteRejected(
                self.message.unwrap_or_else(|| "Request failed".to_string()),
            ));
        }
        let rows = self.data.or(self.results).unwrap_or_default();
        let total = self.total.unwrap_or(rows.len() as i64);
        Ok((rows, total))
    }
}

/// Response to a single-record fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SingleEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SingleEnvelope {
    pub fn into_record(self) -> Result<Option<Value>, ServiceError> {
        if !self.success {
            return Err(ServiceError::RemoteRejected(
                self.message.unwrap_or_else(|| "Request failed".to_string()),
            ));
        }
        Ok(self.data.filter(|d| !d.is_null()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(rename = "fieldLabel")]
    pub field_label: String,
    pub message: String,
}

/// Outcome of one record in a batch write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BatchResult {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Messages for a failed record: one per field error, then the record message.
    pub fn failure_messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = self
            .errors
            .iter()
            .flatten()
            .map(|e| format!("{}: {}", e.field_label, e.message))
            .collect();
        if let Some(message) = &self.message {
            messages.push(message.clone());
        }
        if messages.is_empty() {
            messages.push("Record was rejected".to_string());
        }
        messages
    }
}

/// Response to a batch create, update or delete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<BatchResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Batch results split into successes and failures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchParts {
    /// Data returned for successful records, in submission order.
    pub records: Vec<Value>,
    pub succeeded: usize,
    pub failures: Vec<RecordFailure>,
}

impl BatchEnvelope {
    pub fn from_results(results: Vec<BatchResult>) -> Self {
        Self {
            success: true,
            results: Some(results),
            message: None,
        }
    }

    pub fn split(self) -> Result<BatchParts, ServiceError> {
        if !self.success {
            return Err(ServiceError::RemoteRejected(
                self.message.unwrap_or_else(|| "Request failed".to_string()),
            ));
        }

        let mut parts = BatchParts::default();
        for (index, result) in self.results.unwrap_or_default().into_iter().enumerate() {
            if result.success {
                parts.succeeded += 1;
                if let Some(data) = result.data {
                    parts.records.push(data);
                }
            } else {
                parts.failures.push(RecordFailure {
                    index,
                    message: result.failure_messages().join("; "),
                });
            }
        }
        Ok(parts)
    }
}

/// Access to the remote record API.
#[async_trait]
pub trait RecordClient: Send + Sync {
    async fn fetch_records(
        &self,
        table: &str,
        query: &QueryDescriptor,
    ) -> Result<ListEnvelope, RecordError>;

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        fields: &[&str],
    ) -> Result<SingleEnvelope, RecordError>;

    async fn create_records(
        &self,
        table: &str,
        records: Vec<RecordFields>,
    ) -> Result<BatchEnvelope, RecordError>;

    /// Each record must carry its `Id`.
    async fn update_records(
        &self,
        table: &str,
        records: Vec<RecordFields>,
    ) -> Result<BatchEnvelope, RecordError>;

    async fn delete_records(&self, table: &str, ids: &[i64]) -> Result<BatchEnvelope, RecordError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_envelope_success() {
        let env: ListEnvelope = serde_json::from_value(json!({
            "success": true, "data": [{"Id": 1}], "total": 45
        }))
        .unwrap();
        let (rows, total) = env.into_page().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(total, 45);
    }

    #[test]
    fn test_list_envelope_missing_total_uses_row_count() {
        let env = ListEnvelope {
            success: true,
            data: Some(vec![json!({"Id": 1}), json!({"Id": 2})]),
            ..Default::default()
        };
        assert_eq!(env.into_page().unwrap().1, 2);
    }

    #[test]
    fn test_list_envelope_reads_results_key() {
        let env: ListEnvelope = serde_json::from_value(json!({
            "success": true, "results": [{"Id": 5}]
        }))
        .unwrap();
        let (rows, total) = env.into_page().unwrap();
        assert_eq!(rows, vec![json!({"Id": 5})]);
        assert_eq!(total, 1);
    }

    #[test]
    fn test_list_envelope_rejected() {
        let err = ListEnvelope::rejected("Table not found").into_page().unwrap_err();
        assert_eq!(err, ServiceError::RemoteRejected("Table not found".to_string()));
    }

    #[test]
    fn test_single_envelope_null_data_is_none() {
        let env = SingleEnvelope {
            success: true,
            data: Some(Value::Null),
            message: None,
        };
        assert_eq!(env.into_record().unwrap(), None);
    }

    #[test]
    fn test_batch_split_partial() {
        let env: BatchEnvelope = serde_json::from_value(json!({
            "success": true,
            "results": [
                {"success": true, "data": {"Id": 1}},
                {"success": false, "errors": [{"fieldLabel": "app_name", "message": "is required"}]},
                {"success": false, "message": "Duplicate record"}
            ]
        }))
        .unwrap();

        let parts = env.split().unwrap();
        assert_eq!(parts.succeeded, 1);
        assert_eq!(parts.records, vec![json!({"Id": 1})]);
        assert_eq!(parts.failures.len(), 2);
        assert_eq!(parts.failures[0].index, 1);
        assert_eq!(parts.failures[0].message, "app_name: is required");
        assert_eq!(parts.failures[1].message, "Duplicate record");
    }

    #[test]
    fn test_batch_rejected_envelope() {
        let env = BatchEnvelope {
            success: false,
            results: None,
            message: Some("Invalid table".to_string()),
        };
        assert!(matches!(env.split(), Err(ServiceError::RemoteRejected(m)) if m == "Invalid table"));
    }

    #[test]
    fn test_record_error_maps_to_network() {
        let err: ServiceError = RecordError::MissingCredentials.into();
        assert_eq!(
            err,
            ServiceError::Network("record API credentials are not configured".to_string())
        );
    }
}
