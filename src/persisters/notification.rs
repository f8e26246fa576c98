use crate::models::notification::{Notification, NotificationError};
use crate::models::student::RequestType;
use crate::persisters::Persist;
use crate::state::State;

use sqlx::types::Uuid;

/// Appends the audit row for a successful "ready" email. Only called after
/// the send came back Ok, so `email_sent` is always true.
#[derive(Debug)]
pub struct NotificationInsert {
    pub student_id: Uuid,
    pub request_type: RequestType,
}

#[async_trait]
impl Persist for NotificationInsert {
    type Ret = Notification;
    type Error = NotificationError;

    async fn persist(self, state: &State) -> Result<Self::Ret, Self::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (student_id, email_sent, sent_at, request_type)
            VALUES ($1, TRUE, NOW(), $2)
            RETURNING student_id, email_sent, sent_at, request_type
            "#,
        )
        .bind(self.student_id)
        .bind(self.request_type.as_str())
        .fetch_one(&state.db_conn)
        .await?;

        log::debug!(
            "recorded ready notification for student {} at {}",
            notification.student_id,
            notification.sent_at
        );

        Ok(notification)
    }
}
