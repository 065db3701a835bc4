//! AI log repository for record API operations.

use std::sync::Arc;

use domain::error::ServiceError;
use domain::models::{AiLog, AiLogFields};
use domain::query::{QueryDescriptor, SortDirection};
use domain::services::{Notifier, Page, RecordClient};
use shared::validation::AsRecordId;

use super::table::{with_default_fields, with_id, BatchOutcome, IdSelection, RecordTable};
use crate::entities::ai_log::{FIELDS, TABLE};
use crate::entities::{to_record_fields, AiLogEntity};

/// Repository for the `app_ai_log` table.
#[derive(Clone)]
pub struct AiLogRepository {
    table: RecordTable,
}

impl AiLogRepository {
    pub fn new(client: Arc<dyn RecordClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            table: RecordTable::new(client, notifier, TABLE),
        }
    }

    pub async fn get_all(&self, query: &QueryDescriptor) -> Page<AiLog> {
        self.table
            .fetch_or_empty::<AiLogEntity, AiLog>(&with_default_fields(query, FIELDS))
            .await
    }

    pub async fn try_fetch(&self, query: &QueryDescriptor) -> Result<Page<AiLog>, ServiceError> {
        self.table
            .fetch::<AiLogEntity, AiLog>(&with_default_fields(query, FIELDS))
            .await
    }

    pub async fn get_by_id<I: AsRecordId + ?Sized>(&self, id: &I) -> Option<AiLog> {
        self.table.get_by_id::<AiLogEntity, AiLog, I>(id, FIELDS).await
    }

    pub async fn get_by_ids<I: AsRecordId>(&self, ids: &[I]) -> Vec<AiLog> {
        self.table.get_by_ids::<AiLogEntity, AiLog, I>(ids, FIELDS).await
    }

    /// The `limit` newest logs.
    pub async fn get_recent(&self, limit: u32) -> Vec<AiLog> {
        let query = QueryDescriptor::new()
            .fields(FIELDS.iter().copied())
            .order_by("created_at", SortDirection::Desc)
            .page(limit, 0);
        self.get_all(&query).await.rows
    }

    pub async fn create(&self, logs: Vec<AiLogFields>) -> Result<BatchOutcome<AiLog>, ServiceError> {
        let records = logs
            .iter()
            .map(to_record_fields)
            .collect::<Result<Vec<_>, _>>()?;
        self.table.create::<AiLogEntity, AiLog>(records).await
    }

    pub async fn update<I: AsRecordId + ?Sized>(
        &self,
        id: &I,
        fields: &AiLogFields,
    ) -> Result<AiLog, ServiceError> {
        let id = id
            .as_record_id()
            .ok_or_else(|| ServiceError::invalid("AI log id must be a positive integer"))?;

        let record = with_id(id, to_record_fields(fields)?);
        self.table
            .update::<AiLogEntity, AiLog>(vec![record])
            .await?
            .into_complete()?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::RemoteRejected("Update returned no record".to_string()))
    }

    pub async fn delete(&self, ids: impl Into<IdSelection>) -> Result<(), ServiceError> {
        self.table.delete(ids.into()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{CallKind, InMemoryRecordClient};
    use domain::services::{NoticeLevel, RecordingNotifier};
    use serde_json::json;

    fn setup() -> (Arc<InMemoryRecordClient>, Arc<RecordingNotifier>, AiLogRepository) {
        let client = Arc::new(InMemoryRecordClient::new().with_table(
            TABLE,
            vec![
                json!({"Id": 1, "summary": "Login loop", "chat_analysis_status": "angry", "created_at": "2026-03-01T10:00:00Z"}),
                json!({"Id": 2, "summary": "Export works", "chat_analysis_status": "happy", "created_at": "2026-03-03T10:00:00Z"}),
                json!({"Id": 3, "summary": "Slow queries", "chat_analysis_status": "giving_up", "created_at": "2026-03-02T10:00:00Z"}),
            ],
        ));
        let notifier = Arc::new(RecordingNotifier::default());
        let repo = AiLogRepository::new(client.clone(), notifier.clone());
        (client, notifier, repo)
    }

    #[tokio::test]
    async fn test_get_recent_orders_newest_first() {
        let (_, _, repo) = setup();
        let logs = repo.get_recent(2).await;
        let ids: Vec<i64> = logs.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_get_by_id_non_numeric_makes_no_call() {
        let (client, _, repo) = setup();
        assert!(repo.get_by_id("abc").await.is_none());
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_partial_failure_notifies_each_record() {
        let (client, notifier, repo) = setup();
        client.fail_record(TABLE, 1, "summary: is too long");

        let fields = AiLogFields {
            summary: Some("x".repeat(10)),
            ..Default::default()
        };
        let err = repo.update(&1, &fields).await.unwrap_err();

        assert!(matches!(err, ServiceError::PartialFailure { succeeded: 0, .. }));
        assert_eq!(notifier.count(NoticeLevel::Error), 1);
        assert_eq!(client.calls_of(CallKind::Update), 1);
    }

    #[tokio::test]
    async fn test_get_all_failure_yields_empty_page() {
        let (client, notifier, repo) = setup();
        client.fail_table(TABLE, "Table not found");

        let page = repo.get_all(&QueryDescriptor::new()).await;
        assert!(page.rows.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(notifier.count(NoticeLevel::Error), 1);
    }
}
