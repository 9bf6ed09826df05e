use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::entity::UserNotification;
use crate::model::{DatabaseError, DatabaseResult, ModelManager, ResourceTyped};
use crate::player::CompletionMap;
use crate::web::AuthenticatedUser;

/// Per-user, per-lesson watch state. Keyed by `(user_id, lesson_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct LessonProgress {
    user_id: Uuid,
    lesson_id: Uuid,
    watch_time_seconds: i32,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for LessonProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::LessonProgress
    }
}

impl LessonProgress {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn watch_time_seconds(&self) -> i32 {
        self.watch_time_seconds
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn completed_at(&self) -> Option<&DateTime<Utc>> {
        self.completed_at.as_ref()
    }

    pub fn updated_at(&self) -> &DateTime<Utc> {
        &self.updated_at
    }
}

fn watch_time_column(watch_time_seconds: u32) -> DatabaseResult<i32> {
    i32::try_from(watch_time_seconds).map_err(|_| DatabaseError::OutOfRange {
        column: "watch_time_seconds",
        value: i64::from(watch_time_seconds),
    })
}

impl LessonProgress {
    /// Records an absolute watch-time checkpoint. Never touches `completed`.
    pub async fn upsert_watch_time(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
        watch_time_seconds: u32,
    ) -> DatabaseResult<Self> {
        let record = sqlx::query_as(
            r#"
            INSERT INTO lesson_progress (user_id, lesson_id, watch_time_seconds, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (user_id, lesson_id) DO UPDATE
            SET watch_time_seconds = EXCLUDED.watch_time_seconds,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(actor.user_id())
        .bind(lesson_id)
        .bind(watch_time_column(watch_time_seconds)?)
        .fetch_one(mm.executor())
        .await?;

        Ok(record)
    }

    /// Marks the lesson completed. `completed_at` keeps its first value.
    ///
    /// The first completion also drops a notice into the learner's inbox.
    pub async fn mark_complete(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
        at: DateTime<Utc>,
    ) -> DatabaseResult<Self> {
        let mut tx = mm.executor().begin().await?;

        // the WHERE makes a repeated completion a no-op that returns nothing
        let newly_completed: Option<Self> = sqlx::query_as(
            r#"
            INSERT INTO lesson_progress (user_id, lesson_id, completed, completed_at, updated_at)
            VALUES ($1, $2, TRUE, $3, now())
            ON CONFLICT (user_id, lesson_id) DO UPDATE
            SET completed = TRUE,
                completed_at = COALESCE(lesson_progress.completed_at, EXCLUDED.completed_at),
                updated_at = now()
            WHERE NOT lesson_progress.completed
            RETURNING *
            "#,
        )
        .bind(actor.user_id())
        .bind(lesson_id)
        .bind(at)
        .fetch_optional(&mut *tx)
        .await?;

        let record = match newly_completed {
            Some(record) => {
                UserNotification::lesson_completed(&mut *tx, actor.user_id(), lesson_id).await?;
                record
            }
            None => {
                sqlx::query_as("SELECT * FROM lesson_progress WHERE user_id = $1 AND lesson_id = $2")
                    .bind(actor.user_id())
                    .bind(lesson_id)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;
        Ok(record)
    }

    pub async fn find(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let record = sqlx::query_as(
            "SELECT * FROM lesson_progress WHERE user_id = $1 AND lesson_id = $2",
        )
        .bind(actor.user_id())
        .bind(lesson_id)
        .fetch_optional(mm.executor())
        .await?;

        Ok(record)
    }

    /// Completion flags of every lesson the user has touched in one course.
    pub async fn completion_map(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<CompletionMap> {
        let rows: Vec<(Uuid, bool)> = sqlx::query_as(
            r#"
            SELECT lp.lesson_id, lp.completed
            FROM lesson_progress lp
            JOIN lessons l ON l.id = lp.lesson_id
            JOIN course_modules m ON m.id = l.module_id
            WHERE lp.user_id = $1 AND m.course_id = $2
            "#,
        )
        .bind(actor.user_id())
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows.into_iter().collect())
    }

    pub async fn count_completed(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM lesson_progress WHERE user_id = $1 AND completed",
        )
        .bind(actor.user_id())
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    pub async fn total_watch_time(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(watch_time_seconds), 0)::BIGINT FROM lesson_progress WHERE user_id = $1",
        )
        .bind(actor.user_id())
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn watch_time_fits_integer_column() {
        assert_eq!(watch_time_column(0).unwrap(), 0);
        assert_eq!(watch_time_column(3_600).unwrap(), 3_600);
        assert!(matches!(
            watch_time_column(u32::MAX),
            Err(DatabaseError::OutOfRange { column: "watch_time_seconds", .. })
        ));
    }
}
