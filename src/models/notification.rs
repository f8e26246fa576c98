use crate::models::student::RequestType;

use sqlx::types::chrono::{DateTime, Utc};
use sqlx::types::Uuid;

/// Audit row recording a successful "ready" email. Appended once per
/// mark-ready whose send succeeded; never mutated or deleted.
#[derive(Serialize, Debug, Clone, sqlx::FromRow)]
pub struct Notification {
    pub student_id: Uuid,
    pub email_sent: bool,
    pub sent_at: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub request_type: RequestType,
}

#[derive(Debug)]
pub enum NotificationError {
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for NotificationError {
    fn from(e: sqlx::Error) -> Self {
        Self::Sqlx(e)
    }
}
