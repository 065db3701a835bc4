//! Chat-analysis and sales status models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Coarse grouping of chat-analysis statuses used by charts and badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Positive,
    Neutral,
    Help,
    Struggle,
    Critical,
    Technical,
    Special,
}

const POSITIVE: &[&str] = &[
    "smooth_progress",
    "learning_effectively",
    "feature_exploring",
    "goal_achieved",
    "highly_engaged",
];
const NEUTRAL: &[&str] = &[
    "building_actively",
    "iterating",
    "experimenting",
    "success_breakthrough",
];
const HELP: &[&str] = &[
    "asking_questions",
    "needs_guidance",
    "requesting_examples",
    "seeking_alternatives",
    "documentation_needed",
];
const STRUGGLE: &[&str] = &[
    "stuck",
    "confused",
    "repeating_issues",
    "frustrated",
    "going_in_circles",
];
const TECHNICAL: &[&str] = &[
    "debugging",
    "troubleshooting_db",
    "performance_issues",
    "integration_problems",
    "ready_for_upgrade",
    "hitting_limits",
];
const SPECIAL: &[&str] = &[
    "feature_request",
    "off_topic",
    "inactive",
    "testing_limits",
    "copy_pasting",
];

/// Statuses counted as critical issues on the dashboard.
pub const CRITICAL_STATUSES: &[&str] = &["abandonment_risk", "completely_lost", "angry", "giving_up"];

impl StatusCategory {
    /// Classifies a raw status string, case-insensitively.
    ///
    /// Unknown statuses are neutral.
    pub fn classify(status: &str) -> Self {
        let normalized = status.trim().to_lowercase();
        let s = normalized.as_str();
        if POSITIVE.contains(&s) {
            StatusCategory::Positive
        } else if NEUTRAL.contains(&s) {
            StatusCategory::Neutral
        } else if HELP.contains(&s) {
            StatusCategory::Help
        } else if STRUGGLE.contains(&s) {
            StatusCategory::Struggle
        } else if CRITICAL_STATUSES.contains(&s) {
            StatusCategory::Critical
        } else if TECHNICAL.contains(&s) {
            StatusCategory::Technical
        } else if SPECIAL.contains(&s) {
            StatusCategory::Special
        } else {
            StatusCategory::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::Positive => "positive",
            StatusCategory::Neutral => "neutral",
            StatusCategory::Help => "help",
            StatusCategory::Struggle => "struggle",
            StatusCategory::Critical => "critical",
            StatusCategory::Technical => "technical",
            StatusCategory::Special => "special",
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the latest AI chat analysis, as stored by the record API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatAnalysisStatus(pub String);

impl ChatAnalysisStatus {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn category(&self) -> StatusCategory {
        StatusCategory::classify(&self.0)
    }

    pub fn is_critical(&self) -> bool {
        self.category() == StatusCategory::Critical
    }

    /// Human label: underscores become spaces and words are capitalized.
    pub fn label(&self) -> String {
        self.0
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars.map(|c| c.to_ascii_lowercase())).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl From<&str> for ChatAnalysisStatus {
    fn from(value: &str) -> Self {
        ChatAnalysisStatus(value.to_string())
    }
}

/// Counts per status category, ordered by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusDistribution(pub BTreeMap<StatusCategory, i64>);

impl StatusDistribution {
    pub fn from_statuses<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = &'a ChatAnalysisStatus>,
    {
        let mut counts = BTreeMap::new();
        for status in statuses {
            *counts.entry(status.category()).or_insert(0) += 1;
        }
        StatusDistribution(counts)
    }

    pub fn get(&self, category: StatusCategory) -> i64 {
        self.0.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> i64 {
        self.0.values().sum()
    }
}

/// Sales pipeline stage of an app, the one field the dashboard may edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SalesStatus {
    #[serde(rename = "Demo Scheduled")]
    DemoScheduled,
    #[serde(rename = "Demo Completed")]
    DemoCompleted,
    #[serde(rename = "Proposal Sent")]
    ProposalSent,
    #[serde(rename = "Closed Won")]
    ClosedWon,
    #[serde(rename = "Closed Lost")]
    ClosedLost,
    #[serde(rename = "Follow Up Schedule")]
    FollowUpSchedule,
    #[serde(rename = "No Contacted")]
    NoContacted,
    #[serde(rename = "Negotiating")]
    Negotiating,
    #[serde(rename = "Contract review")]
    ContractReview,
}

impl SalesStatus {
    pub const ALL: [SalesStatus; 9] = [
        SalesStatus::DemoScheduled,
        SalesStatus::DemoCompleted,
        SalesStatus::ProposalSent,
        SalesStatus::ClosedWon,
        SalesStatus::ClosedLost,
        SalesStatus::FollowUpSchedule,
        SalesStatus::NoContacted,
        SalesStatus::Negotiating,
        SalesStatus::ContractReview,
    ];

    /// Wire value stored in the `sales_status` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            SalesStatus::DemoScheduled => "Demo Scheduled",
            SalesStatus::DemoCompleted => "Demo Completed",
            SalesStatus::ProposalSent => "Proposal Sent",
            SalesStatus::ClosedWon => "Closed Won",
            SalesStatus::ClosedLost => "Closed Lost",
            SalesStatus::FollowUpSchedule => "Follow Up Schedule",
            SalesStatus::NoContacted => "No Contacted",
            SalesStatus::Negotiating => "Negotiating",
            SalesStatus::ContractReview => "Contract review",
        }
    }
}

impl fmt::Display for SalesStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SalesStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SalesStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown sales status: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_statuses() {
        assert_eq!(StatusCategory::classify("smooth_progress"), StatusCategory::Positive);
        assert_eq!(StatusCategory::classify("needs_guidance"), StatusCategory::Help);
        assert_eq!(StatusCategory::classify("going_in_circles"), StatusCategory::Struggle);
        assert_eq!(StatusCategory::classify("giving_up"), StatusCategory::Critical);
        assert_eq!(StatusCategory::classify("troubleshooting_db"), StatusCategory::Technical);
        assert_eq!(StatusCategory::classify("off_topic"), StatusCategory::Special);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(StatusCategory::classify("FRUSTRATED"), StatusCategory::Struggle);
        assert_eq!(StatusCategory::classify(" Angry "), StatusCategory::Critical);
    }

    #[test]
    fn test_classify_unknown_is_neutral() {
        assert_eq!(StatusCategory::classify("something_new"), StatusCategory::Neutral);
        assert_eq!(StatusCategory::classify(""), StatusCategory::Neutral);
    }

    #[test]
    fn test_status_label() {
        let status = ChatAnalysisStatus::from("needs_guidance");
        assert_eq!(status.label(), "Needs Guidance");
        assert_eq!(ChatAnalysisStatus::from("FRUSTRATED").label(), "Frustrated");
    }

    #[test]
    fn test_distribution_counts() {
        let statuses = [
            ChatAnalysisStatus::from("angry"),
            ChatAnalysisStatus::from("giving_up"),
            ChatAnalysisStatus::from("iterating"),
        ];
        let dist = StatusDistribution::from_statuses(statuses.iter());
        assert_eq!(dist.get(StatusCategory::Critical), 2);
        assert_eq!(dist.get(StatusCategory::Neutral), 1);
        assert_eq!(dist.get(StatusCategory::Help), 0);
        assert_eq!(dist.total(), 3);
    }

    #[test]
    fn test_distribution_serializes_as_map() {
        let statuses = [ChatAnalysisStatus::from("stuck")];
        let dist = StatusDistribution::from_statuses(statuses.iter());
        let json = serde_json::to_value(&dist).unwrap();
        assert_eq!(json["struggle"], 1);
    }

    #[test]
    fn test_sales_status_wire_values() {
        let json = serde_json::to_value(SalesStatus::ContractReview).unwrap();
        assert_eq!(json, "Contract review");
        let parsed: SalesStatus = serde_json::from_str("\"Closed Won\"").unwrap();
        assert_eq!(parsed, SalesStatus::ClosedWon);
    }

    #[test]
    fn test_sales_status_from_str() {
        assert_eq!("negotiating".parse::<SalesStatus>(), Ok(SalesStatus::Negotiating));
        assert!("Maybe Later".parse::<SalesStatus>().is_err());
    }
}
