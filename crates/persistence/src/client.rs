//! HTTP client for the remote record API.

use std::time::Duration;

use async_trait::async_trait;
use domain::query::QueryDescriptor;
use domain::services::{
    BatchEnvelope, ListEnvelope, RecordClient, RecordError, RecordFields, SingleEnvelope,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::metrics::CallTimer;

/// Connection settings for the record API.
#[derive(Debug, Clone)]
pub struct RecordApiConfig {
    pub base_url: String,
    pub project_id: String,
    pub public_key: String,
    pub timeout_ms: u64,
}

impl RecordApiConfig {
    pub fn has_credentials(&self) -> bool {
        !self.project_id.trim().is_empty() && !self.public_key.trim().is_empty()
    }
}

/// [`RecordClient`] talking to the record API over HTTPS.
pub struct HttpRecordClient {
    client: Client,
    config: RecordApiConfig,
}

impl HttpRecordClient {
    /// Create a new client.
    ///
    /// Missing credentials are accepted here; every call then fails without
    /// issuing a request.
    pub fn new(config: RecordApiConfig) -> Result<Self, RecordError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| RecordError::Transport(e.to_string()))?;

        if !config.has_credentials() {
            tracing::warn!("Record API credentials are not configured; all record calls will fail");
        }

        Ok(Self { client, config })
    }

    fn table_url(&self, table: &str, path: &str) -> String {
        format!(
            "{}/tables/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            table,
            path
        )
    }

    fn ensure_credentials(&self) -> Result<(), RecordError> {
        if self.config.has_credentials() {
            Ok(())
        } else {
            Err(RecordError::MissingCredentials)
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        table: &str,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, RecordError> {
        let timer = CallTimer::new(table, operation);
        let response = request
            .header("X-Project-Id", &self.config.project_id)
            .header("X-Public-Key", &self.config.public_key)
            .send()
            .await;

        let response = match response {
            Ok(resp) => resp,
            Err(e) => {
                timer.record_failure();
                tracing::warn!(table = %table, operation, error = %e, "Record API request failed");
                return Err(RecordError::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            timer.record_failure();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(table = %table, operation, status = status.as_u16(), "Record API returned an error status");
            return Err(RecordError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let decoded = response
            .json::<T>()
            .await
            .map_err(|e| RecordError::Decode(e.to_string()));
        timer.record();
        decoded
    }
}

#[async_trait]
impl RecordClient for HttpRecordClient {
    async fn fetch_records(
        &self,
        table: &str,
        query: &QueryDescriptor,
    ) -> Result<ListEnvelope, RecordError> {
        self.ensure_credentials()?;
        let request = self.client.post(self.table_url(table, "fetch")).json(query);
        self.send(table, "fetch", request).await
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        fields: &[&str],
    ) -> Result<SingleEnvelope, RecordError> {
        self.ensure_credentials()?;
        let mut request = self
            .client
            .get(self.table_url(table, &format!("records/{}", id)));
        if !fields.is_empty() {
            request = request.query(&[("fields", fields.join(","))]);
        }
        self.send(table, "get", request).await
    }

    async fn create_records(
        &self,
        table: &str,
        records: Vec<RecordFields>,
    ) -> Result<BatchEnvelope, RecordError> {
        self.ensure_credentials()?;
        let request = self
            .client
            .post(self.table_url(table, "records"))
            .json(&json!({ "records": records }));
        self.send(table, "create", request).await
    }

    async fn update_records(
        &self,
        table: &str,
        records: Vec<RecordFields>,
    ) -> Result<BatchEnvelope, RecordError> {
        self.ensure_credentials()?;
        let request = self
            .client
            .put(self.table_url(table, "records"))
            .json(&json!({ "records": records }));
        self.send(table, "update", request).await
    }

    async fn delete_records(&self, table: &str, ids: &[i64]) -> Result<BatchEnvelope, RecordError> {
        self.ensure_credentials()?;
        let request = self
            .client
            .delete(self.table_url(table, "records"))
            .json(&json!({ "RecordIds": ids }));
        self.send(table, "delete", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(project_id: &str, public_key: &str) -> RecordApiConfig {
        RecordApiConfig {
            base_url: "https://records.example.com/v1/".to_string(),
            project_id: project_id.to_string(),
            public_key: public_key.to_string(),
            timeout_ms: 1000,
        }
    }

    #[test]
    fn test_table_url_trims_trailing_slash() {
        let client = HttpRecordClient::new(config("p", "k")).unwrap();
        assert_eq!(
            client.table_url("app", "fetch"),
            "https://records.example.com/v1/tables/app/fetch"
        );
    }

    #[test]
    fn test_has_credentials() {
        assert!(config("p", "k").has_credentials());
        assert!(!config("", "k").has_credentials());
        assert!(!config("p", "  ").has_credentials());
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_without_request() {
        let client = HttpRecordClient::new(config("", "")).unwrap();

        let err = client
            .fetch_records("app", &QueryDescriptor::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RecordError::MissingCredentials));

        let err = client.delete_records("app", &[1]).await.unwrap_err();
        assert!(matches!(err, RecordError::MissingCredentials));
    }
}
