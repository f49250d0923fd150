//! Reminder storage and announcement.
//!
//! Reminders are daily (or one-shot) spoken prompts for things like
//! medicine, meals, and appointments, stored in SQLite and announced by
//! a background loop
//! through the same speaker stack the session uses. Reminder speech may
//! interleave with conversation; neither side orders around the other.

mod scheduler;
mod store;

pub use scheduler::ReminderScheduler;
pub use store::{Reminder, ReminderStore};
