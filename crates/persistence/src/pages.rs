//! List page sources.
//!
//! Each source turns [`PagedQuery`] state into one page of display rows,
//! resolving foreign keys with a batch lookup after the primary fetch.

use std::sync::Arc;

use async_trait::async_trait;
use domain::error::ServiceError;
use domain::models::{AiLogListItem, AppListItem, Resolution, UserDetails};
use domain::query::{PagedQuery, SearchPredicate};
use domain::services::{Notifier, Page, PagedSource, RecordClient};
use tracing::info;

use crate::entities::{ai_log, app, user_details};
use crate::repositories::{AiLogRepository, AppRepository, UserDetailsRepository};

/// Users list page.
#[derive(Clone)]
pub struct UsersPageSource {
    users: UserDetailsRepository,
}

impl UsersPageSource {
    pub fn new(client: Arc<dyn RecordClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            users: UserDetailsRepository::new(client, notifier),
        }
    }
}

#[async_trait]
impl PagedSource for UsersPageSource {
    type Row = UserDetails;

    async fn fetch_page(&self, query: &PagedQuery) -> Result<Page<UserDetails>, ServiceError> {
        let descriptor = query.build_descriptor(&user_details::SPEC)?;
        let page = self.users.try_fetch(&descriptor).await?;
        info!(table = user_details::TABLE, total = page.total, page = query.page(), "Fetched users page");
        Ok(page)
    }
}

/// Apps overview page. Search matches owner emails before app names.
#[derive(Clone)]
pub struct AppsPageSource {
    apps: AppRepository,
    users: UserDetailsRepository,
}

impl AppsPageSource {
    pub fn new(client: Arc<dyn RecordClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            apps: AppRepository::new(client.clone(), notifier.clone()),
            users: UserDetailsRepository::new(client, notifier),
        }
    }

    /// An `ExactMatch` on owners whose email contains the search term, when
    /// there are any.
    async fn owner_search(&self, query: &PagedQuery) -> Option<SearchPredicate> {
        if query.search().is_empty() {
            return None;
        }
        let ids = self.users.find_ids_by_email(query.search()).await;
        if ids.is_empty() {
            return None;
        }
        Some(SearchPredicate::ExactIds {
            field: "user_id",
            ids,
        })
    }

    async fn resolve_owners(&self, rows: &mut [AppListItem]) {
        let owner_ids: Vec<i64> = rows.iter().filter_map(|row| row.app.owner_id()).collect();
        let summaries = self.users.get_summaries(&owner_ids).await;
        for row in rows.iter_mut() {
            let summary = row.app.owner_id().and_then(|id| summaries.get(&id));
            if let Some(summary) = summary {
                row.owner = Some(Resolution::Resolved(summary.clone()));
            }
        }
    }
}

#[async_trait]
impl PagedSource for AppsPageSource {
    type Row = AppListItem;

    async fn fetch_page(&self, query: &PagedQuery) -> Result<Page<AppListItem>, ServiceError> {
        let search = self.owner_search(query).await;
        let descriptor = query.build_descriptor_with(&app::SPEC, search)?;
        let mut page = self.apps.try_fetch(&descriptor).await?.map(AppListItem::pending);
        self.resolve_owners(&mut page.rows).await;
        info!(table = app::TABLE, total = page.total, page = query.page(), "Fetched apps page");
        Ok(page)
    }
}

/// AI logs page.
#[derive(Clone)]
pub struct AiLogsPageSource {
    logs: AiLogRepository,
    apps: AppRepository,
}

impl AiLogsPageSource {
    pub fn new(client: Arc<dyn RecordClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            logs: AiLogRepository::new(client.clone(), notifier.clone()),
            apps: AppRepository::new(client, notifier),
        }
    }

    async fn resolve_app_names(&self, rows: &mut [AiLogListItem]) {
        let pending: Vec<i64> = rows
            .iter()
            .filter(|row| matches!(row.app_name, Some(Resolution::Loading)))
            .filter_map(|row| row.log.app_id.as_ref().map(|r| r.id()))
            .collect();
        if pending.is_empty() {
            return;
        }
        let names = self.apps.get_names(&pending).await;
        for row in rows.iter_mut() {
            if !matches!(row.app_name, Some(Resolution::Loading)) {
                continue;
            }
            let name = row.log.app_id.as_ref().and_then(|r| names.get(&r.id()));
            if let Some(name) = name {
                row.app_name = Some(Resolution::Resolved(name.clone()));
            }
        }
    }
}

#[async_trait]
impl PagedSource for AiLogsPageSource {
    type Row = AiLogListItem;

    async fn fetch_page(&self, query: &PagedQuery) -> Result<Page<AiLogListItem>, ServiceError> {
        let descriptor = query.build_descriptor(&ai_log::SPEC)?;
        let mut page = self.logs.try_fetch(&descriptor).await?.map(AiLogListItem::pending);
        self.resolve_app_names(&mut page.rows).await;
        info!(table = ai_log::TABLE, total = page.total, page = query.page(), "Fetched AI logs page");
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{CallKind, InMemoryRecordClient};
    use chrono::NaiveDate;
    use domain::models::{AppFields, SalesStatus, UserDetailsFields};
    use domain::query::{DateRange, Operator, SortDirection};
    use domain::services::{NoticeLevel, PageController, RecordingNotifier};
    use fake::faker::company::en::CompanyName;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;
    use serde_json::{json, Value};

    fn users(count: i64) -> Vec<Value> {
        (1..=count)
            .map(|id| {
                let name: String = Name().fake();
                let email: String = SafeEmail().fake();
                json!({
                    "Id": id,
                    "Name": name,
                    "email": email,
                    "plan": if id % 2 == 0 { "Pro" } else { "Free" },
                    "total_credits_used": id * 10,
                })
            })
            .collect()
    }

    fn apps(count: i64, status: &str) -> Vec<Value> {
        (1..=count)
            .map(|id| {
                let name: String = CompanyName().fake();
                json!({
                    "Id": id,
                    "app_name": name,
                    "last_chat_analysis_status": status,
                    "user_id": (id % 3) + 1,
                    "created_at": format!("2026-01-01T00:{:02}:00Z", id % 60),
                })
            })
            .collect()
    }

    fn setup(client: InMemoryRecordClient) -> (Arc<InMemoryRecordClient>, Arc<RecordingNotifier>) {
        (Arc::new(client), Arc::new(RecordingNotifier::new()))
    }

    #[tokio::test]
    async fn test_frustrated_apps_paginate_over_three_pages() {
        let (client, notifier) = setup(
            InMemoryRecordClient::new()
                .with_table(app::TABLE, apps(45, "FRUSTRATED"))
                .with_table(user_details::TABLE, users(3)),
        );
        let source = AppsPageSource::new(client.clone(), notifier);
        let mut controller = PageController::new(source, PagedQuery::new(20));
        controller.set_filter("status", "FRUSTRATED");
        controller.set_page(2).unwrap();

        controller.fetch().await.unwrap();

        assert_eq!(controller.total(), 45);
        assert_eq!(controller.total_pages(), 3);
        assert_eq!(controller.rows().len(), 20);

        let query = client.last_query(app::TABLE).unwrap();
        let paging = query.paging_info.unwrap();
        assert_eq!((paging.limit, paging.offset), (20, 20));
        assert_eq!(query.conditions[0].field_name, "last_chat_analysis_status");
        assert_eq!(query.conditions[0].operator, Operator::EqualTo);
    }

    #[tokio::test]
    async fn test_app_owners_resolved_by_one_batch_lookup() {
        let (client, notifier) = setup(
            InMemoryRecordClient::new()
                .with_table(app::TABLE, apps(5, "iterating"))
                .with_table(user_details::TABLE, users(2)),
        );
        let source = AppsPageSource::new(client.clone(), notifier);

        let page = source.fetch_page(&PagedQuery::new(10)).await.unwrap();

        assert_eq!(page.rows.len(), 5);
        for row in &page.rows {
            match row.app.owner_id() {
                Some(3) => assert_eq!(row.owner, Some(Resolution::Loading)),
                Some(_) => assert!(matches!(row.owner, Some(Resolution::Resolved(_)))),
                None => assert_eq!(row.owner, None),
            }
        }
        assert_eq!(client.calls_of(CallKind::Fetch), 2);
    }

    #[tokio::test]
    async fn test_app_search_by_owner_email() {
        let (client, notifier) = setup(
            InMemoryRecordClient::new()
                .with_table(app::TABLE, apps(6, "iterating"))
                .with_table(
                    user_details::TABLE,
                    vec![
                        json!({"Id": 1, "Name": "Ada", "email": "ada@acme.io"}),
                        json!({"Id": 2, "Name": "Lin", "email": "lin@other.io"}),
                    ],
                ),
        );
        let source = AppsPageSource::new(client.clone(), notifier);
        let mut query = PagedQuery::new(10);
        query.set_search("acme").unwrap();

        let page = source.fetch_page(&query).await.unwrap();

        assert!(page.rows.iter().all(|row| row.app.owner_id() == Some(1)));
        let sent = client.last_query(app::TABLE).unwrap();
        assert_eq!(sent.conditions[0].field_name, "user_id");
        assert_eq!(sent.conditions[0].operator, Operator::ExactMatch);
        assert!(sent.where_groups.is_empty());
    }

    #[tokio::test]
    async fn test_app_search_without_email_match_uses_text_group() {
        let (client, notifier) = setup(
            InMemoryRecordClient::new()
                .with_table(app::TABLE, vec![json!({"Id": 1, "app_name": "Budget Tracker"})])
                .with_table(user_details::TABLE, users(2)),
        );
        let source = AppsPageSource::new(client.clone(), notifier);
        let mut query = PagedQuery::new(10);
        query.set_search("budget").unwrap();

        let page = source.fetch_page(&query).await.unwrap();

        assert_eq!(page.rows.len(), 1);
        let sent = client.last_query(app::TABLE).unwrap();
        assert!(sent.conditions.is_empty());
        assert_eq!(sent.where_groups[0].sub_groups.len(), 2);
    }

    #[tokio::test]
    async fn test_ai_logs_search_with_previous_month() {
        let (client, notifier) = setup(
            InMemoryRecordClient::new()
                .with_table(
                    ai_log::TABLE,
                    vec![
                        json!({"Id": 1, "summary": "Payment form broken", "created_at": "2026-04-03T08:00:00Z", "app_id": {"Id": 7, "Name": "Shop"}}),
                        json!({"Id": 2, "summary": "payment retries", "created_at": "2026-04-30T23:00:00Z", "app_id": 8}),
                        json!({"Id": 3, "summary": "Payment page", "created_at": "2026-05-02T08:00:00Z", "app_id": 8}),
                        json!({"Id": 4, "summary": "Login issue", "created_at": "2026-04-10T08:00:00Z", "app_id": 8}),
                    ],
                )
                .with_table(app::TABLE, vec![json!({"Id": 8, "app_name": "Ledger"})]),
        );
        let source = AiLogsPageSource::new(client.clone(), notifier);
        let today = NaiveDate::from_ymd_opt(2026, 5, 16).unwrap();
        let mut query = PagedQuery::new(20);
        query.set_search("payment").unwrap();
        query.set_date_range(Some(DateRange::month(1, today).unwrap()));

        let page = source.fetch_page(&query).await.unwrap();

        let ids: Vec<i64> = page.rows.iter().map(|r| r.log.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(page.rows[0].app_name, Some(Resolution::Resolved("Ledger".to_string())));
        assert_eq!(page.rows[1].app_name, Some(Resolution::Resolved("Shop".to_string())));

        let sent = client.last_query(ai_log::TABLE).unwrap();
        let predicates: Vec<(&str, Operator, &Value)> = sent
            .conditions
            .iter()
            .map(|c| (c.field_name.as_str(), c.operator, &c.values[0]))
            .collect();
        assert_eq!(
            predicates,
            vec![
                ("summary", Operator::Contains, &json!("payment")),
                ("created_at", Operator::GreaterThanOrEqualTo, &json!("2026-04-01T00:00:00Z")),
                ("created_at", Operator::LessThanOrEqualTo, &json!("2026-04-30T23:59:59.999Z")),
            ]
        );
    }

    #[tokio::test]
    async fn test_users_sorted_by_credits() {
        let (client, notifier) =
            setup(InMemoryRecordClient::new().with_table(user_details::TABLE, users(12)));
        let mut controller =
            PageController::new(UsersPageSource::new(client.clone(), notifier), PagedQuery::new(10));
        controller.set_sort_explicit("total_credits_used", SortDirection::Desc);

        controller.fetch().await.unwrap();

        assert_eq!(controller.rows()[0].id, 12);
        assert_eq!(controller.pagination().total_pages, 2);
        let sent = serde_json::to_value(client.last_query(user_details::TABLE).unwrap()).unwrap();
        assert_eq!(
            sent["orderBy"],
            json!([{"fieldName": "total_credits_used", "sorttype": "DESC"}])
        );
        assert_eq!(sent["pagingInfo"], json!({"limit": 10, "offset": 0}));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_rows_and_retry_recovers() {
        let (client, notifier) =
            setup(InMemoryRecordClient::new().with_table(user_details::TABLE, users(3)));
        let mut controller =
            PageController::new(UsersPageSource::new(client.clone(), notifier), PagedQuery::new(10));
        controller.fetch().await.unwrap();
        assert_eq!(controller.rows().len(), 3);

        client.set_unreachable(true);
        assert!(controller.retry().await.is_err());
        assert_eq!(controller.rows().len(), 3);
        assert!(matches!(controller.error(), Some(ServiceError::Network(_))));

        client.set_unreachable(false);
        controller.retry().await.unwrap();
        assert!(controller.error().is_none());
    }

    #[tokio::test]
    async fn test_sales_status_edit_is_confirmed_write() {
        let (client, notifier) = setup(
            InMemoryRecordClient::new()
                .with_table(app::TABLE, apps(3, "iterating"))
                .with_table(user_details::TABLE, users(3)),
        );
        let repo = AppRepository::new(client.clone(), notifier.clone());
        let mut controller =
            PageController::new(AppsPageSource::new(client.clone(), notifier), PagedQuery::new(10));
        controller.fetch().await.unwrap();

        controller
            .apply_confirmed_write(2, async {
                repo.update_sales_status(&2, SalesStatus::DemoScheduled)
                    .await
                    .map(AppListItem::pending)
            })
            .await
            .unwrap();
        let row = controller.rows().iter().find(|r| r.app.id == 2).unwrap();
        assert_eq!(row.app.sales_status.as_deref(), Some(SalesStatus::DemoScheduled.as_str()));

        client.fail_record(app::TABLE, 3, "sales_status: invalid option");
        let result = controller
            .apply_confirmed_write(3, async {
                repo.update_sales_status(&3, SalesStatus::ClosedLost)
                    .await
                    .map(AppListItem::pending)
            })
            .await;
        assert!(result.is_err());
        let row = controller.rows().iter().find(|r| r.app.id == 3).unwrap();
        assert_eq!(row.app.sales_status, None);
    }

    #[tokio::test]
    async fn test_entity_service_contract() {
        let (client, notifier) = setup(
            InMemoryRecordClient::new()
                .with_table(app::TABLE, apps(3, "iterating"))
                .with_table(user_details::TABLE, users(3)),
        );
        let apps_repo = AppRepository::new(client.clone(), notifier.clone());
        let users_repo = UserDetailsRepository::new(client.clone(), notifier.clone());

        assert!(apps_repo.get_by_id("abc").await.is_none());
        assert!(apps_repo.get_by_ids::<i64>(&[]).await.is_empty());
        assert_eq!(client.call_count(), 0);

        let found = apps_repo.get_by_ids(&[1, 1, 2]).await;
        assert_eq!(found.len(), 2);
        assert_eq!(client.calls_of(CallKind::Fetch), 1);
        let sent = client.last_query(app::TABLE).unwrap();
        assert_eq!(sent.conditions[0].values, vec![json!(1), json!(2)]);

        client.clear_calls();
        let fields = UserDetailsFields {
            plan: Some("Pro".to_string()),
            ..Default::default()
        };
        assert_eq!(
            users_repo.update(&1, &fields).await.unwrap_err(),
            ServiceError::ReadOnly(user_details::TABLE)
        );
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_update_with_failures_notifies_per_record() {
        let (client, notifier) =
            setup(InMemoryRecordClient::new().with_table(app::TABLE, apps(4, "iterating")));
        client.fail_record(app::TABLE, 2, "app_name: is required");
        client.fail_record(app::TABLE, 4, "app_name: too long");
        let repo = AppRepository::new(client.clone(), notifier.clone());

        let updates = (1..=4)
            .map(|id| {
                let fields = AppFields {
                    app_category: Some("Finance".to_string()),
                    ..Default::default()
                };
                (id, fields)
            })
            .collect();
        let outcome = repo.update_many(updates).await.unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(notifier.count(NoticeLevel::Error), 2);
    }
}
