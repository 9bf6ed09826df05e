use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::player::{OutlineLesson, OutlineModule};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Module {
    id: Uuid,
    course_id: Uuid,
    title: String,
    description: String,
    order_index: i32,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ModuleCreate {
    #[serde(skip)]
    pub course_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub order_index: Option<i32>,
}

impl ResourceTyped for Module {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Module
    }
}

impl Module {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }
}

#[async_trait]
impl CrudRepository<Module, ModuleCreate, Uuid> for Module {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ModuleCreate,
    ) -> DatabaseResult<Self> {
        // without an explicit position the module goes last
        let module = sqlx::query_as(
            r#"
            INSERT INTO course_modules (id, course_id, title, description, order_index)
            VALUES ($1, $2, $3, $4, COALESCE($5, (
                SELECT COALESCE(MAX(order_index) + 1, 0) FROM course_modules WHERE course_id = $2
            )))
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.order_index)
        .fetch_one(mm.executor())
        .await?;

        Ok(module)
    }

    /// Modules never move between courses, `course_id` is ignored here.
    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ModuleCreate,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            "UPDATE course_modules SET title = $1, description = $2, order_index = $3 WHERE id = $4",
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.order_index.unwrap_or(self.order_index))
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.title = data.title;
        self.description = data.description;
        self.order_index = data.order_index.unwrap_or(self.order_index);
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM course_modules WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM course_modules WHERE id = $1")
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
            "SELECT * FROM course_modules ORDER BY course_id, order_index, id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM course_modules")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Module {
    type OwnerId = Uuid;

    /// A module belongs to the instructor of its course.
    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        let owner = sqlx::query_scalar("SELECT instructor_id FROM courses WHERE id = $1")
            .bind(self.course_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(owner)
    }
}

// Utils

#[derive(sqlx::FromRow)]
pub struct ModuleWithLessonsRow {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub lessons: serde_json::Value,
}

impl TryFrom<ModuleWithLessonsRow> for OutlineModule {
    type Error = serde_json::Error;

    fn try_from(row: ModuleWithLessonsRow) -> Result<Self, Self::Error> {
        let lessons: Vec<OutlineLesson> = serde_json::from_value(row.lessons)?;
        Ok(OutlineModule {
            id: row.id,
            title: row.title,
            order_index: row.order_index,
            lessons,
        })
    }
}

impl ModuleWithLessonsRow {
    pub async fn fetch_by_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<ModuleWithLessonsRow> = sqlx::query_as(
            r#"
            SELECT
            m.id,
            m.title,
            m.order_index,
            COALESCE(
                json_agg(
                    json_build_object(
                        'id', l.id,
                        'module_id', l.module_id,
                        'title', l.title,
                        'video_url', l.video_url,
                        'duration_seconds', l.duration_seconds,
                        'order_index', l.order_index
                    )
                    ORDER BY l.order_index, l.id
                ) FILTER (WHERE l.id IS NOT NULL),
                '[]'
            ) AS lessons
            FROM course_modules m
            LEFT JOIN lessons l ON l.module_id = m.id
            WHERE m.course_id = $1
            GROUP BY m.id
            ORDER BY m.order_index, m.id;
        "#,
        )
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }

    /// Loads the full module/lesson outline of a course.
    pub async fn fetch_outline(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<OutlineModule>> {
        let rows = Self::fetch_by_course(mm, actor, course_id).await?;
        Ok(rows
            .into_iter()
            .map(OutlineModule::try_from)
            .collect::<Result<_, _>>()?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn outline_module_from_aggregated_row() {
        let module_id = Uuid::new_v4();
        let lesson_id = Uuid::new_v4();
        let row = ModuleWithLessonsRow {
            id: module_id,
            title: String::from("Basics"),
            order_index: 1,
            lessons: json!([{
                "id": lesson_id,
                "module_id": module_id,
                "title": "Intro",
                "video_url": null,
                "duration_seconds": 120,
                "order_index": 0
            }]),
        };

        let module = OutlineModule::try_from(row).unwrap();
        assert_eq!(module.lessons.len(), 1);
        assert_eq!(module.lessons[0].id, lesson_id);
        assert_eq!(module.lessons[0].duration_seconds, Some(120));
        assert!(module.lessons[0].video_url.is_none());
    }

    #[test]
    fn empty_module_has_no_lessons() {
        let row = ModuleWithLessonsRow {
            id: Uuid::new_v4(),
            title: String::from("Empty"),
            order_index: 0,
            lessons: json!([]),
        };

        assert!(OutlineModule::try_from(row).unwrap().lessons.is_empty());
    }
}
