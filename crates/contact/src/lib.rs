//! Contact form intake: validation, sanitization, notification and the
//! optional archive of successful submissions.

mod command;
mod mailer;
mod notification;
mod sanitize;
mod store;
mod submission;

pub use command::*;
pub use mailer::*;
pub use notification::*;
pub use sanitize::*;
pub use store::*;
pub use submission::*;
