use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, prelude::FromRow};
use uuid::Uuid;

use crate::model::access::HasOwner;
use crate::model::{DatabaseResult, ModelManager, ResourceTyped};
use crate::web::AuthenticatedUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Enrollment,
    Completion,
    Announcement,
    Other,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enrollment => "enrollment",
            Self::Completion => "completion",
            Self::Announcement => "announcement",
            Self::Other => "other",
        }
    }
}

impl From<&str> for NotificationKind {
    fn from(value: &str) -> Self {
        match value {
            "enrollment" => Self::Enrollment,
            "completion" => Self::Completion,
            "announcement" => Self::Announcement,
            _ => Self::Other,
        }
    }
}

/// A stored inbox entry. Not to be confused with the realtime
/// [`crate::player::Notification`] pushed over a player session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct UserNotification {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    title: String,
    message: String,
    link: Option<String>,
    read: bool,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for UserNotification {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Notification
    }
}

impl UserNotification {
    /// How many entries the inbox shows.
    pub const INBOX_SIZE: i64 = 10;

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn kind(&self) -> NotificationKind {
        NotificationKind::from(self.kind.as_str())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn read(&self) -> bool {
        self.read
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
}

impl UserNotification {
    pub async fn latest(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, id
            LIMIT $2
            "#,
        )
        .bind(actor.user_id())
        .bind(limit)
        .fetch_all(mm.executor())
        .await?;

        Ok(result)
    }

    pub async fn count_unread(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT read",
        )
        .bind(actor.user_id())
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }

    pub async fn mark_read(mut self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<Self> {
        sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.read = true;
        Ok(self)
    }

    /// Returns how many entries changed.
    pub async fn mark_all_read(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<u64> {
        let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND NOT read")
            .bind(actor.user_id())
            .execute(mm.executor())
            .await?;

        Ok(result.rows_affected())
    }

    /// Tells the learner they finished a lesson. Runs inside the caller's transaction.
    pub(crate) async fn lesson_completed(
        conn: &mut PgConnection,
        user_id: Uuid,
        lesson_id: Uuid,
    ) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, message, link)
            SELECT $1, $2, $3, 'Lesson completed',
                   'You completed "' || l.title || '" in ' || c.title,
                   '/learn/' || c.id::text || '/' || l.id::text
            FROM lessons l
            JOIN course_modules m ON m.id = l.module_id
            JOIN courses c ON c.id = m.course_id
            WHERE l.id = $4
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(NotificationKind::Completion.as_str())
        .bind(lesson_id)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Tells an instructor someone enrolled in their course. Self-enrollment is skipped.
    pub(crate) async fn student_enrolled(
        conn: &mut PgConnection,
        student_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, message, link)
            SELECT $1, c.instructor_id, $2, 'New enrollment',
                   u.username || ' enrolled in ' || c.title,
                   '/courses/' || c.id::text
            FROM courses c
            JOIN users u ON u.id = $3
            WHERE c.id = $4 AND c.instructor_id <> $3
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(NotificationKind::Enrollment.as_str())
        .bind(student_id)
        .bind(course_id)
        .execute(conn)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl HasOwner for UserNotification {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.user_id)
    }
}
