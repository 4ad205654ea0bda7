//! Notification store.
//!
//! One row per (event, recipient). Each `record_notification` call is an
//! independent write, so a failure for one recipient never affects another.

use pfy_core::entities::Notification;
use pfy_core::ids::PREFIX_NOTIFICATION;
use pfy_core::responses::NotificationInbox;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_bool, get_count, now, parse_datetime};
use crate::service::PfyService;

const SELECT_COLS: &str = "id, sender_id, receiver_id, message, notification_type, is_read, \
     task_id, created_at, updated_at";

fn row_to_notification(row: &libsql::Row) -> Result<Notification, DatabaseError> {
    Ok(Notification {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        message: row.get(3)?,
        notification_type: row.get(4)?,
        is_read: get_bool(row, 5)?,
        task_id: row.get(6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl PfyService {
    /// Persist one unread notification.
    pub async fn record_notification(
        &self,
        sender_id: &str,
        receiver_id: &str,
        message: &str,
        notification_type: &str,
        task_id: &str,
    ) -> Result<Notification, DatabaseError> {
        let now = now();
        let ts = format_datetime(&now);
        let id = self.db().generate_id(PREFIX_NOTIFICATION).await?;

        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO notifications ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?7)"
                ),
                || {
                    libsql::params![
                        id.as_str(),
                        sender_id,
                        receiver_id,
                        message,
                        notification_type,
                        task_id,
                        ts.as_str()
                    ]
                },
            )
            .await?;

        Ok(Notification {
            id,
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            message: message.to_string(),
            notification_type: notification_type.to_string(),
            is_read: false,
            task_id: task_id.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_notification(&self, id: &str) -> Result<Notification, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM notifications WHERE id = ?1"),
                || [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_notification(&row)
    }

    /// All notifications for `user_id`, newest first, plus the unread count.
    pub async fn list_notifications(&self, user_id: &str) -> Result<NotificationInbox, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {SELECT_COLS} FROM notifications WHERE receiver_id = ?1 \
                     ORDER BY created_at DESC, rowid DESC"
                ),
                || [user_id],
            )
            .await?;
        let mut data = Vec::new();
        while let Some(row) = rows.next().await? {
            data.push(row_to_notification(&row)?);
        }

        let mut rows = self
            .db()
            .query_with(
                "SELECT COUNT(*) FROM notifications WHERE receiver_id = ?1 AND is_read = 0",
                || [user_id],
            )
            .await?;
        let unread_count = match rows.next().await? {
            Some(row) => get_count(&row, 0)?,
            None => 0,
        };

        Ok(NotificationInbox { data, unread_count })
    }

    /// Mark as read. Marking an already-read notification is a no-op.
    pub async fn mark_notification_read(&self, id: &str) -> Result<Notification, DatabaseError> {
        let ts = format_datetime(&now());
        self.db()
            .execute_with(
                "UPDATE notifications SET is_read = 1, updated_at = ?1 WHERE id = ?2 AND is_read = 0",
                || [ts.as_str(), id],
            )
            .await?;
        self.get_notification(id).await
    }

    pub async fn delete_notification(&self, id: &str) -> Result<Notification, DatabaseError> {
        let current = self.get_notification(id).await?;
        self.db()
            .execute_with("DELETE FROM notifications WHERE id = ?1", || [id])
            .await?;
        Ok(current)
    }
}
