use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CourseCategory {
    WebDevelopment,
    MobileDevelopment,
    DataScience,
    Design,
    Business,
    Marketing,
    Photography,
    Music,
    Other,
}

impl CourseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebDevelopment => "web_development",
            Self::MobileDevelopment => "mobile_development",
            Self::DataScience => "data_science",
            Self::Design => "design",
            Self::Business => "business",
            Self::Marketing => "marketing",
            Self::Photography => "photography",
            Self::Music => "music",
            Self::Other => "other",
        }
    }
}

impl From<&str> for CourseCategory {
    fn from(value: &str) -> Self {
        match value {
            "web_development" => Self::WebDevelopment,
            "mobile_development" => Self::MobileDevelopment,
            "data_science" => Self::DataScience,
            "design" => Self::Design,
            "business" => Self::Business,
            "marketing" => Self::Marketing,
            "photography" => Self::Photography,
            "music" => Self::Music,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl From<&str> for Difficulty {
    fn from(value: &str) -> Self {
        match value {
            "intermediate" => Self::Intermediate,
            "advanced" => Self::Advanced,
            _ => Self::Beginner,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    id: Uuid,
    instructor_id: Uuid,
    title: String,
    description: String,
    category: String,
    difficulty: String,
    price_cents: i64,
    thumbnail_url: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CourseCreate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: CourseCategory,
    pub difficulty: Difficulty,
    pub price_cents: Option<i64>,
    pub thumbnail_url: Option<String>,
}

/// Catalogue filters; every field is optional.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams, utoipa::ToSchema)]
#[into_params(parameter_in = Query)]
pub struct CourseFilter {
    pub search: Option<String>,
    pub category: Option<CourseCategory>,
    pub difficulty: Option<Difficulty>,
    /// Only courses taught by this user.
    pub instructor_id: Option<Uuid>,
}

impl ResourceTyped for Course {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Course
    }
}

impl Course {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn instructor_id(&self) -> Uuid {
        self.instructor_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> CourseCategory {
        CourseCategory::from(self.category.as_str())
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::from(self.difficulty.as_str())
    }

    pub fn price_cents(&self) -> i64 {
        self.price_cents
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
}

#[async_trait]
impl CrudRepository<Course, CourseCreate, Uuid> for Course {
    async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        let course = sqlx::query_as(
            r#"
            INSERT INTO courses
                (id, instructor_id, title, description, category, difficulty, price_cents, thumbnail_url)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.category.as_str())
        .bind(data.difficulty.as_str())
        .bind(data.price_cents.unwrap_or(0))
        .bind(&data.thumbnail_url)
        .fetch_one(mm.executor())
        .await?;

        Ok(course)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            r#"
            UPDATE courses
            SET title = $1, description = $2, category = $3, difficulty = $4,
                price_cents = $5, thumbnail_url = $6
            WHERE id = $7
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.category.as_str())
        .bind(data.difficulty.as_str())
        .bind(data.price_cents.unwrap_or(0))
        .bind(&data.thumbnail_url)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.title = data.title;
        self.description = data.description;
        self.category = data.category.as_str().to_string();
        self.difficulty = data.difficulty.as_str().to_string();
        self.price_cents = data.price_cents.unwrap_or(0);
        self.thumbnail_url = data.thumbnail_url;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM courses ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Course {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.instructor_id)
    }
}

// Utils

/// Catalogue row: the course plus the name of its instructor.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CourseListingRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub course: Course,
    pub instructor_name: String,
}

const FILTER_CLAUSE: &str = r#"
    ($1::text IS NULL OR c.title ILIKE '%' || $1 || '%')
    AND ($2::text IS NULL OR c.category = $2)
    AND ($3::text IS NULL OR c.difficulty = $3)
    AND ($4::uuid IS NULL OR c.instructor_id = $4)
"#;

impl CourseListingRow {
    pub async fn search(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        filter: &CourseFilter,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<crate::model::Page<Self>> {
        let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let category = filter.category.map(|c| c.as_str());
        let difficulty = filter.difficulty.map(|d| d.as_str());

        let items: Vec<Self> = sqlx::query_as(&format!(
            r#"
            SELECT c.*, u.username AS instructor_name
            FROM courses c
            JOIN users u ON u.id = c.instructor_id
            WHERE {FILTER_CLAUSE}
            ORDER BY c.created_at DESC, c.id
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(search)
        .bind(category)
        .bind(difficulty)
        .bind(filter.instructor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM courses c WHERE {FILTER_CLAUSE}"
        ))
        .bind(search)
        .bind(category)
        .bind(difficulty)
        .bind(filter.instructor_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(crate::model::Page::new(items, total, limit, offset))
    }

    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let row = sqlx::query_as(
            r#"
            SELECT c.*, u.username AS instructor_name
            FROM courses c
            JOIN users u ON u.id = c.instructor_id
            WHERE c.id = $1
            "#,
        )
        .bind(course_id)
        .fetch_optional(mm.executor())
        .await?;

        Ok(row)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn category_names_match_storage() {
        let all = [
            CourseCategory::WebDevelopment,
            CourseCategory::MobileDevelopment,
            CourseCategory::DataScience,
            CourseCategory::Design,
            CourseCategory::Business,
            CourseCategory::Marketing,
            CourseCategory::Photography,
            CourseCategory::Music,
            CourseCategory::Other,
        ];

        for category in all {
            assert_eq!(CourseCategory::from(category.as_str()), category);
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn unknown_difficulty_falls_back_to_beginner() {
        assert_eq!(Difficulty::from("expert"), Difficulty::Beginner);
        assert_eq!(Difficulty::from("advanced"), Difficulty::Advanced);
    }

    #[test]
    fn filter_rejects_unknown_category() {
        let parsed: Result<CourseFilter, _> =
            serde_json::from_str(r#"{"category": "cooking"}"#);
        assert!(parsed.is_err());

        let parsed: CourseFilter =
            serde_json::from_str(r#"{"category": "music", "search": "guitar"}"#).unwrap();
        assert_eq!(parsed.category, Some(CourseCategory::Music));
        assert_eq!(parsed.search.as_deref(), Some("guitar"));
    }
}
