use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::{ContactRecord, ContactStore, Mailer, Notification, Submission, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("mail transport: {0:#}")]
    Transport(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgment {
    pub message: String,
}

impl Acknowledgment {
    pub fn sent() -> Self {
        Self {
            message: "Message sent.".to_owned(),
        }
    }
}

/// Contact intake handler.
///
/// The mailer and the optional store are process-wide resources built at
/// startup; cloning a `Command` shares them.
#[derive(Clone)]
pub struct Command {
    mailer: Arc<dyn Mailer>,
    store: Option<Arc<dyn ContactStore>>,
}

impl Command {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self {
            mailer,
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ContactStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Validate, notify the operator, then archive.
    ///
    /// A record is only written after the notification went out, and a failed
    /// write is logged without failing the submission.
    pub async fn submit(&self, submission: Submission) -> Result<Acknowledgment> {
        let inquiry = submission.into_inquiry()?;
        let notification = Notification::for_inquiry(&inquiry);

        self.mailer
            .send(&notification)
            .await
            .map_err(Error::Transport)?;

        info!(from = %inquiry.email, "Contact notification sent");

        let Some(store) = &self.store else {
            return Ok(Acknowledgment::sent());
        };

        let record = ContactRecord::new(inquiry);
        if let Err(e) = store.insert(&record).await {
            error!(
                error = %e,
                record_id = %record.id,
                "Failed to persist contact record"
            );
        }

        Ok(Acknowledgment::sent())
    }
}
