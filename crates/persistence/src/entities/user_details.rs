//! User Details entity (record API row mapping).

use chrono::{DateTime, Utc};
use domain::models::UserDetails;
use domain::query::{FilterKind, FilterSpec, SortDirection, TableSpec};
use serde::Deserialize;

use super::{integer, number, record_id, text, timestamp};

pub const TABLE: &str = "user_details";

pub const FIELDS: &[&str] = &[
    "Name",
    "email",
    "user_id",
    "total_apps",
    "total_app_with_db",
    "total_credits_used",
    "plan",
    "platform_signup_date",
    "apper_signup_date",
    "company_id",
    "company_user_id",
];

/// Fields needed to show an app's owner.
pub const SUMMARY_FIELDS: &[&str] = &["Name", "email", "plan"];

/// Users table.
pub const SPEC: TableSpec = TableSpec {
    table: TABLE,
    fields: FIELDS,
    search_fields: &["Name"],
    date_field: Some("platform_signup_date"),
    default_sort: ("platform_signup_date", SortDirection::Desc),
    filters: &[FilterSpec {
        key: "plan",
        field: "plan",
        kind: FilterKind::Text,
    }],
    sortable: &[
        "Name",
        "email",
        "total_apps",
        "total_app_with_db",
        "total_credits_used",
        "plan",
        "platform_signup_date",
        "apper_signup_date",
    ],
};

/// Record API row of the `user_details` table.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDetailsEntity {
    #[serde(rename = "Id", deserialize_with = "record_id")]
    pub id: i64,
    #[serde(rename = "Name", default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "integer")]
    pub total_apps: i64,
    #[serde(default, deserialize_with = "integer")]
    pub total_app_with_db: i64,
    #[serde(default, deserialize_with = "number")]
    pub total_credits_used: Option<f64>,
    #[serde(default, deserialize_with = "text")]
    pub plan: Option<String>,
    #[serde(default, deserialize_with = "timestamp")]
    pub platform_signup_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub apper_signup_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "text")]
    pub company_id: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub company_user_id: Option<String>,
}

impl From<UserDetailsEntity> for UserDetails {
    fn from(entity: UserDetailsEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name.unwrap_or_default(),
            email: entity.email,
            user_id: entity.user_id,
            total_apps: entity.total_apps,
            total_app_with_db: entity.total_app_with_db,
            total_credits_used: entity.total_credits_used.unwrap_or(0.0),
            plan: entity.plan,
            platform_signup_date: entity.platform_signup_date,
            apper_signup_date: entity.apper_signup_date,
            company_id: entity.company_id,
            company_user_id: entity.company_user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_from_record() {
        let entity: UserDetailsEntity = serde_json::from_value(json!({
            "Id": 3,
            "Name": "Ada Lovelace",
            "email": "ada@example.com",
            "user_id": 99812,
            "total_apps": 4,
            "total_credits_used": "1520.5",
            "plan": "Pro",
            "platform_signup_date": "2023-11-02"
        }))
        .unwrap();

        let user = UserDetails::from(entity);
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.user_id.as_deref(), Some("99812"));
        assert_eq!(user.total_credits_used, 1520.5);
        assert_eq!(user.total_app_with_db, 0);
        assert!(user.platform_signup_date.is_some());
    }
}
