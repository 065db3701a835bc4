//! User Details repository for record API operations.
//!
//! The table is read-only for this service: every write is rejected before a
//! request is made.

use std::collections::HashMap;
use std::sync::Arc;

use domain::error::ServiceError;
use domain::models::{UserDetails, UserDetailsFields, UserSummary};
use domain::query::{QueryDescriptor, WhereCondition};
use domain::services::{Notifier, Page, RecordClient};
use shared::validation::AsRecordId;

use super::table::{with_default_fields, with_id, BatchOutcome, IdSelection, RecordTable};
use crate::entities::user_details::{FIELDS, SUMMARY_FIELDS, TABLE};
use crate::entities::{to_record_fields, UserDetailsEntity};

/// Upper bound on users matched by an email search.
const EMAIL_MATCH_LIMIT: u32 = 100;

/// Repository for the `user_details` table.
#[derive(Clone)]
pub struct UserDetailsRepository {
    table: RecordTable,
}

impl UserDetailsRepository {
    pub fn new(client: Arc<dyn RecordClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            table: RecordTable::read_only(client, notifier, TABLE),
        }
    }

    pub async fn get_all(&self, query: &QueryDescriptor) -> Page<UserDetails> {
        self.table
            .fetch_or_empty::<UserDetailsEntity, UserDetails>(&with_default_fields(query, FIELDS))
            .await
    }

    pub async fn try_fetch(&self, query: &QueryDescriptor) -> Result<Page<UserDetails>, ServiceError> {
        self.table
            .fetch::<UserDetailsEntity, UserDetails>(&with_default_fields(query, FIELDS))
            .await
    }

    pub async fn get_by_id<I: AsRecordId + ?Sized>(&self, id: &I) -> Option<UserDetails> {
        self.table
            .get_by_id::<UserDetailsEntity, UserDetails, I>(id, FIELDS)
            .await
    }

    pub async fn get_by_ids<I: AsRecordId>(&self, ids: &[I]) -> Vec<UserDetails> {
        self.table
            .get_by_ids::<UserDetailsEntity, UserDetails, I>(ids, FIELDS)
            .await
    }

    /// Owner display data keyed by user record id.
    pub async fn get_summaries(&self, ids: &[i64]) -> HashMap<i64, UserSummary> {
        self.table
            .get_by_ids::<UserDetailsEntity, UserDetails, i64>(ids, SUMMARY_FIELDS)
            .await
            .iter()
            .map(|user| (user.id, user.summary()))
            .collect()
    }

    /// Ids of users whose email contains `term`.
    pub async fn find_ids_by_email(&self, term: &str) -> Vec<i64> {
        let term = term.trim();
        if term.is_empty() {
            return Vec::new();
        }
        let query = QueryDescriptor::new()
            .fields(["email"])
            .filter(WhereCondition::contains("email", term))
            .page(EMAIL_MATCH_LIMIT, 0);
        self.table
            .fetch_or_empty::<UserDetailsEntity, UserDetails>(&query)
            .await
            .rows
            .into_iter()
            .map(|user| user.id)
            .collect()
    }

    pub async fn count_all(&self) -> i64 {
        self.table.count_or_zero(QueryDescriptor::new().fields(["Name"])).await
    }

    pub async fn create(
        &self,
        users: Vec<UserDetailsFields>,
    ) -> Result<BatchOutcome<UserDetails>, ServiceError> {
        let records = users
            .iter()
            .map(to_record_fields)
            .collect::<Result<Vec<_>, _>>()?;
        self.table
            .create::<UserDetailsEntity, UserDetails>(records)
            .await
    }

    pub async fn update<I: AsRecordId + ?Sized>(
        &self,
        id: &I,
        fields: &UserDetailsFields,
    ) -> Result<UserDetails, ServiceError> {
        let mut record = to_record_fields(fields)?;
        if let Some(id) = id.as_record_id() {
            record = with_id(id, record);
        }
        self.table
            .update::<UserDetailsEntity, UserDetails>(vec![record])
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

