use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::entity::UserNotification;
use crate::model::{DatabaseResult, ModelManager, ResourceTyped};
use crate::web::AuthenticatedUser;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Enrollment {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    enrolled_at: DateTime<Utc>,
}

impl ResourceTyped for Enrollment {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Enrollment
    }
}

impl Enrollment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn enrolled_at(&self) -> &DateTime<Utc> {
        &self.enrolled_at
    }
}

impl Enrollment {
    /// Enrolls the actor. Returns `None` when they were already enrolled.
    ///
    /// A new enrollment notifies the course's instructor.
    pub async fn enroll(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let mut tx = mm.executor().begin().await?;

        let result: Option<Self> = sqlx::query_as(
            r#"
            INSERT INTO enrollments (id, user_id, course_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, course_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(course_id)
        .fetch_optional(&mut *tx)
        .await?;

        if result.is_some() {
            UserNotification::student_enrolled(&mut *tx, actor.user_id(), course_id).await?;
        }

        tx.commit().await?;
        Ok(result)
    }

    pub async fn find(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM enrollments WHERE user_id = $1 AND course_id = $2",
        )
        .bind(actor.user_id())
        .bind(course_id)
        .fetch_optional(mm.executor())
        .await?;

        Ok(result)
    }

    pub async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    pub async fn all_for_user(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM enrollments WHERE user_id = $1 ORDER BY enrolled_at DESC",
        )
        .bind(actor.user_id())
        .fetch_all(mm.executor())
        .await?;

        Ok(result)
    }

    pub async fn count_for_user(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE user_id = $1")
            .bind(actor.user_id())
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }

    pub async fn count_for_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<i64> {
        let result: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
                .bind(course_id)
                .fetch_one(mm.executor())
                .await?;

        Ok(result)
    }
}

