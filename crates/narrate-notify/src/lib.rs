//! Narrate Outbound Notifications
//!
//! This crate delivers text messages (one-time codes, credentials) to
//! phone numbers through an external messaging gateway.

pub mod error;
pub mod notifier;
pub mod whatsapp;

pub use error::NotifyError;
pub use notifier::{LogNotifier, Notifier, RecordingNotifier, SentMessage};
pub use whatsapp::{WhatsAppConfig, WhatsAppNotifier};
