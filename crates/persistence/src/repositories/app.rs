//! App repository for record API operations.

use std::collections::HashMap;
use std::sync::Arc;

use domain::error::ServiceError;
use domain::models::status::CRITICAL_STATUSES;
use domain::models::{App, AppFields, SalesStatus};
use domain::query::{QueryDescriptor, SortDirection, WhereCondition};
use domain::services::{Notifier, Page, RecordClient};
use serde_json::Value;
use shared::validation::AsRecordId;

use super::table::{with_default_fields, with_id, BatchOutcome, IdSelection, RecordTable};
use crate::entities::app::{FIELDS, TABLE};
use crate::entities::{to_record_fields, AppEntity};

/// Repository for the `app` table.
#[derive(Clone)]
pub struct AppRepository {
    table: RecordTable,
}

impl AppRepository {
    pub fn new(client: Arc<dyn RecordClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            table: RecordTable::new(client, notifier, TABLE),
        }
    }

    /// All apps matching `query`. Never fails: a rejected fetch yields an
    /// empty page and a notice.
    pub async fn get_all(&self, query: &QueryDescriptor) -> Page<App> {
        self.table
            .fetch_or_empty::<AppEntity, App>(&with_default_fields(query, FIELDS))
            .await
    }

    /// Like [`AppRepository::get_all`], but surfaces the failure.
    pub async fn try_fetch(&self, query: &QueryDescriptor) -> Result<Page<App>, ServiceError> {
        self.table
            .fetch::<AppEntity, App>(&with_default_fields(query, FIELDS))
            .await
    }

    pub async fn get_by_id<I: AsRecordId + ?Sized>(&self, id: &I) -> Option<App> {
        self.table.get_by_id::<AppEntity, App, I>(id, FIELDS).await
    }

    pub async fn get_by_ids<I: AsRecordId>(&self, ids: &[I]) -> Vec<App> {
        self.table.get_by_ids::<AppEntity, App, I>(ids, FIELDS).await
    }

    /// App names keyed by id, for labelling AI log rows.
    pub async fn get_names(&self, ids: &[i64]) -> HashMap<i64, String> {
        self.table
            .get_by_ids::<AppEntity, App, i64>(ids, &["Name", "app_name"])
            .await
            .into_iter()
            .map(|app| (app.id, app.app_name))
            .collect()
    }

    /// Apps owned by one user, newest first.
    pub async fn list_by_user<I: AsRecordId + ?Sized>(&self, user_id: &I) -> Vec<App> {
        let Some(user_id) = user_id.as_record_id() else {
            return Vec::new();
        };
        let query = QueryDescriptor::new()
            .fields(FIELDS.iter().copied())
            .filter(WhereCondition::equal_to("user_id", user_id))
            .order_by("created_at", SortDirection::Desc);
        self.get_all(&query).await.rows
    }

    /// Total number of apps; zero if the count fails.
    pub async fn count_all(&self) -> i64 {
        self.table.count_or_zero(QueryDescriptor::new().fields(["Name"])).await
    }

    /// Number of apps whose last chat analysis is a critical status.
    ///
    /// Statuses are classified ignoring case, so both spellings are matched.
    pub async fn count_critical_issues(&self) -> i64 {
        let statuses = CRITICAL_STATUSES
            .iter()
            .flat_map(|s| [Value::from(*s), Value::from(s.to_uppercase())])
            .collect();
        let query = QueryDescriptor::new()
            .fields(["Name"])
            .filter(WhereCondition::one_of("last_chat_analysis_status", statuses));
        self.table.count_or_zero(query).await
    }

    pub async fn create(&self, apps: Vec<AppFields>) -> Result<BatchOutcome<App>, ServiceError> {
        let records = apps
            .iter()
            .map(to_record_fields)
            .collect::<Result<Vec<_>, _>>()?;
        self.table.create::<AppEntity, App>(records).await
    }

    /// Sends only the fields present in `fields` and returns the record the
    /// record API confirmed.
    pub async fn update<I: AsRecordId + ?Sized>(
        &self,
        id: &I,
        fields: &AppFields,
    ) -> Result<App, ServiceError> {
        let id = id
            .as_record_id()
            .ok_or_else(|| ServiceError::invalid("App id must be a positive integer"))?;
        if fields.is_empty() {
            return Err(ServiceError::invalid("No fields to update"));
        }

        let record = with_id(id, to_record_fields(fields)?);
        let outcome = self.table.update::<AppEntity, App>(vec![record]).await?;
        outcome
            .into_complete()?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::RemoteRejected("Update returned no record".to_string()))
    }

    /// Updates several apps at once.
    pub async fn update_many(
        &self,
        updates: Vec<(i64, AppFields)>,
    ) -> Result<BatchOutcome<App>, ServiceError> {
        let records = updates
            .iter()
            .map(|(id, fields)| to_record_fields(fields).map(|f| with_id(*id, f)))
            .collect::<Result<Vec<_>, _>>()?;
        self.table.update::<AppEntity, App>(records).await
    }

    pub async fn update_sales_status<I: AsRecordId + ?Sized>(
        &self,
        id: &I,
        status: SalesStatus,
    ) -> Result<App, ServiceError> {
        self.update(id, &AppFields::sales_status(status)).await
    }

    pub async fn delete(&self, ids: impl Into<IdSelection>) -> Result<(), ServiceError> {
        self.table.delete(ids.into()).await
    }
}
