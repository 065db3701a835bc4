//! Repository implementations for record API operations.

pub mod ai_log;
pub mod app;
pub mod dashboard;
pub mod sales_comment;
pub mod table;
pub mod user_details;

pub use ai_log::AiLogRepository;
pub use app::AppRepository;
pub use dashboard::DashboardRepository;
pub use sales_comment::SalesCommentRepository;
pub use table::{BatchOutcome, IdSelection, RecordTable};
pub use user_details::UserDetailsRepository;
