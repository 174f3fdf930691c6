//! Outbound notifications for account lifecycle events.
//!
//! - [`WelcomeMail`] is the message queued when an account signs up.
//! - [`MailQueue`] is a bounded, non-blocking hand-off from request handlers
//!   to a background worker.
//! - [`delivery`] holds the SMTP channel used by that worker.

pub mod delivery;
pub mod mail_queue;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use mail_queue::{MailQueue, MailWorker, WelcomeMail};
