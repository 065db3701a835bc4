//! Record operations shared by every table repository.

use std::sync::Arc;

use domain::error::{RecordFailure, ServiceError};
use domain::query::QueryDescriptor;
use domain::services::{Notice, Notifier, Page, RecordClient, RecordFields};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::validation::{normalize_record_ids, AsRecordId};

use crate::entities::{decode_row, decode_rows};

/// One record id or several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSelection {
    One(i64),
    Many(Vec<i64>),
}

impl IdSelection {
    pub fn ids(&self) -> Vec<i64> {
        match self {
            IdSelection::One(id) => normalize_record_ids(&[*id]),
            IdSelection::Many(ids) => normalize_record_ids(ids),
        }
    }
}

impl From<i64> for IdSelection {
    fn from(id: i64) -> Self {
        IdSelection::One(id)
    }
}

impl From<Vec<i64>> for IdSelection {
    fn from(ids: Vec<i64>) -> Self {
        IdSelection::Many(ids)
    }
}

impl From<&[i64]> for IdSelection {
    fn from(ids: &[i64]) -> Self {
        IdSelection::Many(ids.to_vec())
    }
}

/// Result of a batch write in which some records may have failed.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T> {
    pub records: Vec<T>,
    pub failures: Vec<RecordFailure>,
}

impl<T> BatchOutcome<T> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The records, or [`ServiceError::PartialFailure`] if any record failed.
    pub fn into_complete(self) -> Result<Vec<T>, ServiceError> {
        if self.failures.is_empty() {
            Ok(self.records)
        } else {
            Err(ServiceError::PartialFailure {
                succeeded: self.records.len(),
                failures: self.failures,
            })
        }
    }
}

/// A named table behind the record client.
#[derive(Clone)]
pub struct RecordTable {
    client: Arc<dyn RecordClient>,
    notifier: Arc<dyn Notifier>,
    name: &'static str,
    read_only: bool,
}

impl RecordTable {
    pub fn new(
        client: Arc<dyn RecordClient>,
        notifier: Arc<dyn Notifier>,
        name: &'static str,
    ) -> Self {
        Self {
            client,
            notifier,
            name,
            read_only: false,
        }
    }

    /// A table that rejects every write without contacting the record API.
    pub fn read_only(client: Arc<dyn RecordClient>, notifier: Arc<dyn Notifier>, name: &'static str) -> Self {
        Self {
            read_only: true,
            ..Self::new(client, notifier, name)
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn notify_error(&self, message: impl Into<String>) {
        self.notifier.notify(Notice::error(self.name, message));
    }

    /// Runs a list query.
    pub async fn fetch<E, T>(&self, query: &QueryDescriptor) -> Result<Page<T>, ServiceError>
    where
        E: DeserializeOwned,
        T: From<E>,
    {
        let envelope = self.client.fetch_records(self.name, query).await?;
        let (rows, total) = envelope.into_page()?;
        let rows: Vec<T> = decode_rows::<E>(self.name, rows).into_iter().map(T::from).collect();
        tracing::debug!(table = self.name, rows = rows.len(), total, "Fetched records");
        Ok(Page { rows, total })
    }

    /// Runs a list query, degrading to an empty page and a notice on failure.
    pub async fn fetch_or_empty<E, T>(&self, query: &QueryDescriptor) -> Page<T>
    where
        E: DeserializeOwned,
        T: From<E>,
    {
        match self.fetch::<E, T>(query).await {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(table = self.name, error = %err, "Record fetch failed, returning empty page");
                self.notify_error(err.to_string());
                Page::empty()
            }
        }
    }

    /// Number of records matching `query`, reading only the total.
    pub async fn count(&self, query: QueryDescriptor) -> Result<i64, ServiceError> {
        let query = query.page(1, 0);
        let envelope = self.client.fetch_records(self.name, &query).await?;
        let (_, total) = envelope.into_page()?;
        Ok(total)
    }

    /// Like [`RecordTable::count`], but zero and a notice on failure.
    pub async fn count_or_zero(&self, query: QueryDescriptor) -> i64 {
        match self.count(query).await {
            Ok(total) => total,
            Err(err) => {
                tracing::warn!(table = self.name, error = %err, "Record count failed");
                self.notify_error(err.to_string());
                0
            }
        }
    }

    /// Fetches one record. Ids that are not positive integers never reach
    /// the record API.
    pub async fn get_by_id<E, T, I>(&self, id: &I, fields: &[&str]) -> Option<T>
    where
        E: DeserializeOwned,
        T: From<E>,
        I: AsRecordId + ?Sized,
    {
        let id = id.as_record_id()?;
        let record = self
            .client
            .get_record_by_id(self.name, id, fields)
            .await
            .map_err(ServiceError::from)
            .and_then(|envelope| envelope.into_record());

        match record {
            Ok(Some(row)) => match decode_row::<E>(self.name, row) {
                Ok(entity) => Some(T::from(entity)),
                Err(err) => {
                    self.notify_error(err.to_string());
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(table = self.name, id, error = %err, "Record lookup failed");
                self.notify_error(err.to_string());
                None
            }
        }
    }

    /// Fetches several records in one `ExactMatch` query on `Id`.
    ///
    /// Ids are de-duplicated and invalid ids dropped; nothing left means no call.
    pub async fn get_by_ids<E, T, I>(&self, ids: &[I], fields: &[&str]) -> Vec<T>
    where
        E: DeserializeOwned,
        T: From<E>,
        I: AsRecordId,
    {
        let ids = normalize_record_ids(ids);
        if ids.is_empty() {
            return Vec::new();
        }
        let limit = u32::try_from(ids.len()).unwrap_or(u32::MAX);
        let query = QueryDescriptor::by_ids(&ids)
            .fields(fields.iter().copied())
            .page(limit, 0);
        self.fetch_or_empty::<E, T>(&query).await.rows
    }

    fn guard_write(&self, operation: &str) -> Result<(), ServiceError> {
        if self.read_only {
            tracing::warn!(table = self.name, operation, "Write rejected on read-only table");
            self.notifier.notify(Notice::error(
                self.name,
                format!("Cannot {} {}: table is in read-only mode", operation, self.name),
            ));
            return Err(ServiceError::ReadOnly(self.name));
        }
        Ok(())
    }

    /// Creates records, returning the ones that were created.
    pub async fn create<E, T>(&self, records: Vec<RecordFields>) -> Result<BatchOutcome<T>, ServiceError>
    where
        E: DeserializeOwned,
        T: From<E>,
    {
        self.guard_write("create")?;
        if records.is_empty() {
            return Err(ServiceError::invalid("No records to create"));
        }
        let result = self.client.create_records(self.name, records).await;
        self.finish_batch::<E, T>("create", result.map_err(ServiceError::from))
    }

    /// Updates records; every record must carry its `Id`.
    pub async fn update<E, T>(&self, records: Vec<RecordFields>) -> Result<BatchOutcome<T>, ServiceError>
    where
        E: DeserializeOwned,
        T: From<E>,
    {
        self.guard_write("update")?;
        if records.is_empty() {
            return Err(ServiceError::invalid("No records to update"));
        }
        if records.iter().any(|r| r.get("Id").and_then(Value::as_i64).is_none()) {
            return Err(ServiceError::invalid("Every updated record needs a numeric Id"));
        }
        let result = self.client.update_records(self.name, records).await;
        self.finish_batch::<E, T>("update", result.map_err(ServiceError::from))
    }

    /// Deletes records. Succeeds only if every id was deleted.
    pub async fn delete(&self, ids: IdSelection) -> Result<(), ServiceError> {
        self.guard_write("delete")?;
        let ids = ids.ids();
        if ids.is_empty() {
            return Err(ServiceError::invalid("No valid record ids to delete"));
        }
        let result = self.client.delete_records(self.name, &ids).await;
        let parts = match result.map_err(ServiceError::from).and_then(|e| e.split()) {
            Ok(parts) => parts,
            Err(err) => {
                self.notify_error(err.to_string());
                return Err(err);
            }
        };

        for failure in &parts.failures {
            self.notify_error(failure.message.clone());
        }
        if parts.failures.is_empty() {
            tracing::info!(table = self.name, count = ids.len(), "Deleted records");
            Ok(())
        } else {
            tracing::error!(
                table = self.name,
                failed = parts.failures.len(),
                "Some records could not be deleted"
            );
            Err(ServiceError::PartialFailure {
                succeeded: parts.succeeded,
                failures: parts.failures,
            })
        }
    }

    fn finish_batch<E, T>(
        &self,
        operation: &'static str,
        result: Result<domain::services::BatchEnvelope, ServiceError>,
    ) -> Result<BatchOutcome<T>, ServiceError>
    where
        E: DeserializeOwned,
        T: From<E>,
    {
        let parts = match result.and_then(|envelope| envelope.split()) {
            Ok(parts) => parts,
            Err(err) => {
                tracing::error!(table = self.name, operation, error = %err, "Batch write rejected");
                self.notify_error(err.to_string());
                return Err(err);
            }
        };

        for failure in &parts.failures {
            self.notify_error(failure.message.clone());
        }
        if !parts.failures.is_empty() {
            tracing::error!(
                table = self.name,
                operation,
                succeeded = parts.succeeded,
                failed = parts.failures.len(),
                "Batch write partially failed"
            );
        }

        let records = decode_rows::<E>(self.name, parts.records)
            .into_iter()
            .map(T::from)
            .collect();
        Ok(BatchOutcome {
            records,
            failures: parts.failures,
        })
    }
}

/// `query`, projecting `fields` when it names none of its own.
pub fn with_default_fields(query: &QueryDescriptor, fields: &[&str]) -> QueryDescriptor {
    if query.fields.is_empty() {
        query.clone().fields(fields.iter().copied())
    } else {
        query.clone()
    }
}

/// Record field map for an update of record `id`.
pub fn with_id(id: i64, mut fields: RecordFields) -> RecordFields {
    fields.insert("Id".to_string(), Value::from(id));
    fields
}
