pub mod ai_logs;
pub mod apps;
pub mod dashboard;
pub mod health;
pub mod list;
pub mod users;
