//! Domain models for SupportHub.

pub mod ai_log;
pub mod app;
pub mod dashboard;
pub mod record_ref;
pub mod sales_comment;
pub mod status;
pub mod user_details;

pub use ai_log::{AiLog, AiLogFields, AiLogListItem, ScoreLevel, ScoreScale, SentimentScore};
pub use app::{App, AppFields, AppListItem};
pub use dashboard::{ActivityItem, DashboardMetrics};
pub use record_ref::{Identified, RecordRef, Resolution};
pub use sales_comment::{SalesComment, SalesCommentFields};
pub use status::{ChatAnalysisStatus, SalesStatus, StatusCategory, StatusDistribution};
pub use user_details::{UserDetails, UserDetailsFields, UserSummary};
