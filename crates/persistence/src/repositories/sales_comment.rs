//! Sales comment repository for record API operations.
//!
//! Comments are written by the sales tooling; this service only reads them.

use std::sync::Arc;

use domain::error::ServiceError;
use domain::models::{SalesComment, SalesCommentFields};
use domain::query::{QueryDescriptor, SortDirection, WhereCondition};
use domain::services::{Notifier, Page, RecordClient};
use shared::validation::AsRecordId;

use super::table::{with_default_fields, with_id, BatchOutcome, IdSelection, RecordTable};
use crate::entities::sales_comment::{FIELDS, TABLE};
use crate::entities::{to_record_fields, SalesCommentEntity};

/// Repository for the `sales_comment` table.
#[derive(Clone)]
pub struct SalesCommentRepository {
    table: RecordTable,
}

impl SalesCommentRepository {
    pub fn new(client: Arc<dyn RecordClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            table: RecordTable::read_only(client, notifier, TABLE),
        }
    }

    pub async fn get_all(&self, query: &QueryDescriptor) -> Page<SalesComment> {
        self.table
            .fetch_or_empty::<SalesCommentEntity, SalesComment>(&with_default_fields(query, FIELDS))
            .await
    }

    pub async fn get_by_id<I: AsRecordId + ?Sized>(&self, id: &I) -> Option<SalesComment> {
        self.table
            .get_by_id::<SalesCommentEntity, SalesComment, I>(id, FIELDS)
            .await
    }

    pub async fn get_by_ids<I: AsRecordId>(&self, ids: &[I]) -> Vec<SalesComment> {
        self.table
            .get_by_ids::<SalesCommentEntity, SalesComment, I>(ids, FIELDS)
            .await
    }

    /// Comments left on one app, newest first.
    pub async fn get_by_app_id<I: AsRecordId + ?Sized>(&self, app_id: &I) -> Vec<SalesComment> {
        let Some(app_id) = app_id.as_record_id() else {
            return Vec::new();
        };
        let query = QueryDescriptor::new()
            .fields(FIELDS.iter().copied())
            .filter(WhereCondition::equal_to("app_id", app_id))
            .order_by("created_at", SortDirection::Desc);
        self.get_all(&query).await.rows
    }

    pub async fn create(
        &self,
        comments: Vec<SalesCommentFields>,
    ) -> Result<BatchOutcome<SalesComment>, ServiceError> {
        let records = comments
            .iter()
            .map(to_record_fields)
            .collect::<Result<Vec<_>, _>>()?;
        self.table
            .create::<SalesCommentEntity, SalesComment>(records)
            .await
    }

    pub async fn update<I: AsRecordId + ?Sized>(
        &self,
        id: &I,
        fields: &SalesCommentFields,
    ) -> Result<SalesComment, ServiceError> {
        let mut record = to_record_fields(fields)?;
        if let Some(id) = id.as_record_id() {
            record = with_id(id, record);
        }
        self.table
            .update::<SalesCommentEntity, SalesComment>(vec![record])
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
