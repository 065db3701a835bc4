//! Domain services for SupportHub.
//!
//! The record client and notifier are the seams to the outside world; the
//! page controller is the shared list page logic built on top of them.

pub mod controller;
pub mod notification;
pub mod record_client;

pub use controller::{FetchTicket, Page, PageController, PagedSource};
pub use notification::{LogNotifier, Notice, NoticeLevel, Notifier, RecordingNotifier};
pub use record_client::{
    BatchEnvelope, BatchParts, BatchResult, FieldError, ListEnvelope, RecordClient, RecordError,
    RecordFields, SingleEnvelope,
};
