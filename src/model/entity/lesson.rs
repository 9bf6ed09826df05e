use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Lesson {
    id: Uuid,
    module_id: Uuid,
    title: String,
    description: String,
    video_url: Option<String>,
    duration_seconds: Option<i32>,
    order_index: i32,
}

impl ResourceTyped for Lesson {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Lesson
    }
}

impl Lesson {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn module_id(&self) -> Uuid {
        self.module_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    /// Approximate, as entered by the instructor. The player trusts the media instead.
    pub fn duration_seconds(&self) -> Option<i32> {
        self.duration_seconds
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonCreate {
    #[serde(skip)]
    pub module_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub video_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub order_index: Option<i32>,
}

#[async_trait]
impl CrudRepository<Lesson, LessonCreate, Uuid> for Lesson {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreate,
    ) -> DatabaseResult<Self> {
        let lesson = sqlx::query_as(
            r#"
            INSERT INTO lessons (id, module_id, title, description, video_url, duration_seconds, order_index)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, (
                SELECT COALESCE(MAX(order_index) + 1, 0) FROM lessons WHERE module_id = $2
            )))
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.module_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.video_url)
        .bind(data.duration_seconds)
        .bind(data.order_index)
        .fetch_one(mm.executor())
        .await?;

        Ok(lesson)
    }

    /// Lessons stay in their module; `module_id` is ignored here.
    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreate,
    ) -> DatabaseResult<Self> {
        let order_index = data.order_index.unwrap_or(self.order_index);
        sqlx::query(
            r#"
            UPDATE lessons
            SET title = $1, description = $2, video_url = $3, duration_seconds = $4, order_index = $5
            WHERE id = $6
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.video_url)
        .bind(data.duration_seconds)
        .bind(order_index)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.title = data.title;
        self.description = data.description;
        self.video_url = data.video_url;
        self.duration_seconds = data.duration_seconds;
        self.order_index = order_index;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM lessons ORDER BY module_id, order_index, id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Lesson {
    type OwnerId = Uuid;

    /// A lesson belongs to the instructor of the course its module is in.
    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        let owner = sqlx::query_scalar(
            r#"
            SELECT c.instructor_id
            FROM course_modules m
            JOIN courses c ON c.id = m.course_id
            WHERE m.id = $1
            "#,
        )
        .bind(self.module_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(owner)
    }
}

// Utils

/// A lesson joined with the current user's progress on it.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct LessonWithProgressRow {
    #[sqlx(flatten)]
    pub lesson: Lesson,
    pub watch_time_seconds: i32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl LessonWithProgressRow {
    pub async fn find_by_id(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let row = sqlx::query_as(
            r#"
            SELECT
                l.*,
                COALESCE(lp.watch_time_seconds, 0) AS watch_time_seconds,
                COALESCE(lp.completed, FALSE) AS completed,
                lp.completed_at
            FROM lessons l
            LEFT JOIN lesson_progress lp
                ON l.id = lp.lesson_id AND lp.user_id = $2
            WHERE l.id = $1
            "#,
        )
        .bind(lesson_id)
        .bind(actor.user_id())
        .fetch_optional(mm.executor())
        .await?;

        Ok(row)
    }
}
