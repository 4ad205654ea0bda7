//! Durable side of a dispatch.
//!
//! The dispatcher writes through [`NotificationStore`] rather than the
//! service directly, so each write can be bounded and observed on its own.

use futures::FutureExt;
use futures::future::BoxFuture;
use pfy_core::entities::Notification;
use pfy_db::error::DatabaseError;
use pfy_db::service::PfyService;

pub trait NotificationStore: Send + Sync {
    /// Persist one notification addressed to `receiver_id`.
    fn record<'a>(
        &'a self,
        sender_id: &'a str,
        receiver_id: &'a str,
        message: &'a str,
        notification_type: &'a str,
        task_id: &'a str,
    ) -> BoxFuture<'a, Result<Notification, DatabaseError>>;
}

impl NotificationStore for PfyService {
    fn record<'a>(
        &'a self,
        sender_id: &'a str,
        receiver_id: &'a str,
        message: &'a str,
        notification_type: &'a str,
        task_id: &'a str,
    ) -> BoxFuture<'a, Result<Notification, DatabaseError>> {
        self.record_notification(sender_id, receiver_id, message, notification_type, task_id)
            .boxed()
    }
}

#[cfg(test)]
pub(crate) mod stalling {
    use std::collections::HashSet;
    use std::sync::Arc;

    use futures::FutureExt;
    use futures::future::BoxFuture;
    use pfy_core::entities::Notification;
    use pfy_db::error::DatabaseError;
    use pfy_db::service::PfyService;

    use super::NotificationStore;

    /// Delegates to the service, except that writes for `stall_for` never
    /// complete.
    pub struct StallingStore {
        pub inner: Arc<PfyService>,
        pub stall_for: HashSet<String>,
    }

    impl NotificationStore for StallingStore {
        fn record<'a>(
            &'a self,
            sender_id: &'a str,
            receiver_id: &'a str,
            message: &'a str,
            notification_type: &'a str,
            task_id: &'a str,
        ) -> BoxFuture<'a, Result<Notification, DatabaseError>> {
            if self.stall_for.contains(receiver_id) {
                return futures::future::pending().boxed();
            }
            self.inner
                .record(sender_id, receiver_id, message, notification_type, task_id)
        }
    }
}
