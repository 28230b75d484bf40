//! Partial-update builders.
//!
//! Each update type carries one `Option` per mutable field; only present
//! fields are applied.

pub mod notification;

pub use notification::{NotificationPreferenceUpdate, NotificationPreferenceUpdateBuilder};
