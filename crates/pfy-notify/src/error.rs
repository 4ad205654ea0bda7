use std::time::Duration;

use pfy_db::error::DatabaseError;
use thiserror::Error;

/// Failures of the live push transport. Never fatal to a dispatch.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("push payload could not be encoded: {0}")]
    Encode(String),

    #[error("push transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Push(#[from] PushError),

    #[error("recording notification for {receiver_id} timed out after {timeout:?}")]
    RecipientTimeout {
        receiver_id: String,
        timeout: Duration,
    },

    #[error("sweep tick exceeded {0:?}")]
    TickTimeout(Duration),

    #[error("no notification could be recorded for task {task_id}")]
    NothingDelivered { task_id: String },
}
