//! User-facing notices raised by entity services.
//!
//! Reads degrade instead of failing, so the notice channel is how a
//! rejected fetch or a failed record in a batch reaches the operator.

use serde::Serialize;
use std::sync::Mutex;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoticeLevel::Success => write!(f, "success"),
            NoticeLevel::Warning => write!(f, "warning"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}

/// One notice about an operation on a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub table: &'static str,
    pub message: String,
}

impl Notice {
    pub fn error(table: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            table,
            message: message.into(),
        }
    }

    pub fn warning(table: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            table,
            message: message.into(),
        }
    }
}

/// Sink for notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Emits notices as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => {
                tracing::error!(table = notice.table, message = %notice.message, "Record operation failed")
            }
            NoticeLevel::Warning => {
                tracing::warn!(table = notice.table, message = %notice.message, "Record operation degraded")
            }
            NoticeLevel::Success => {
                tracing::info!(table = notice.table, message = %notice.message, "Record operation succeeded")
            }
        }
    }
}

/// Keeps every notice in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices().iter().filter(|n| n.level == level).count()
    }

    pub fn clear(&self) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.clear();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
