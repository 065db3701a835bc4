//! User Details domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record_ref::Identified;

/// Plans known to the platform. The field itself stays free-form.
pub const KNOWN_PLANS: [&str; 4] = ["Free", "Basic", "Pro", "Enterprise"];

/// A platform user as recorded in `user_details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserDetails {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub user_id: Option<String>,
    pub total_apps: i64,
    pub total_app_with_db: i64,
    pub total_credits_used: f64,
    pub plan: Option<String>,
    pub platform_signup_date: Option<DateTime<Utc>>,
    pub apper_signup_date: Option<DateTime<Utc>>,
    pub company_id: Option<String>,
    pub company_user_id: Option<String>,
}

impl UserDetails {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            plan: self.plan.clone(),
        }
    }
}

impl Identified for UserDetails {
    fn record_id(&self) -> i64 {
        self.id
    }
}

/// Owner display data shown next to an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub plan: Option<String>,
}

/// Field set for user details writes. The table is read-only, so these are
/// rejected before reaching the record API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDetailsFields {
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "Name")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserDetails {
        UserDetails {
            id: 9,
            name: "Ada Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            user_id: Some("u_9".to_string()),
            total_apps: 3,
            total_app_with_db: 1,
            total_credits_used: 42.5,
            plan: Some("Pro".to_string()),
            platform_signup_date: None,
            apper_signup_date: None,
            company_id: None,
            company_user_id: None,
        }
    }

    #[test]
    fn test_summary_copies_display_fields() {
        let summary = user().summary();
        assert_eq!(summary.id, 9);
        assert_eq!(summary.name, "Ada Lovelace");
        assert_eq!(summary.email.as_deref(), Some("ada@example.com"));
        assert_eq!(summary.plan.as_deref(), Some("Pro"));
    }

    #[test]
    fn test_user_fields_use_record_name_column() {
        let fields = UserDetailsFields {
            name: Some("Grace".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json, serde_json::json!({"Name": "Grace"}));
    }
}
