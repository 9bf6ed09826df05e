use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{DatabaseResult, ModelManager};
use crate::web::AuthenticatedUser;

/// Learners with a progress write inside this many days count as active.
pub const ACTIVE_WINDOW_DAYS: i32 = 30;

#[derive(Debug, FromRow)]
struct CourseStatsRow {
    total_enrollments: i64,
    active_students: i64,
    completed_students: i64,
    total_lessons: i64,
}

/// Instructor-facing numbers for one course.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseStats {
    pub course_id: Uuid,
    pub total_enrollments: i64,
    pub active_students: i64,
    /// Enrolled learners who completed every lesson.
    pub completed_students: i64,
    pub total_lessons: i64,
    /// Fraction in `0.0..=1.0`.
    pub completion_rate: f64,
}

/// Share of enrolled learners that finished the course; 0 without enrollments.
pub fn completion_rate(completed: i64, enrolled: i64) -> f64 {
    if enrolled <= 0 {
        return 0.0;
    }
    (completed.max(0) as f64 / enrolled as f64).clamp(0.0, 1.0)
}

impl CourseStats {
    pub async fn for_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Self> {
        let row: CourseStatsRow = sqlx::query_as(
            r#"
            WITH course_lessons AS (
                SELECT l.id
                FROM lessons l
                JOIN course_modules m ON m.id = l.module_id
                WHERE m.course_id = $1
            ),
            enrolled AS (
                SELECT user_id FROM enrollments WHERE course_id = $1
            ),
            finished AS (
                SELECT e.user_id
                FROM enrolled e
                JOIN lesson_progress lp ON lp.user_id = e.user_id AND lp.completed
                WHERE lp.lesson_id IN (SELECT id FROM course_lessons)
                GROUP BY e.user_id
                HAVING COUNT(*) = (SELECT COUNT(*) FROM course_lessons)
            )
            SELECT
                (SELECT COUNT(*) FROM enrolled) AS total_enrollments,
                (SELECT COUNT(DISTINCT lp.user_id)
                 FROM lesson_progress lp
                 WHERE lp.lesson_id IN (SELECT id FROM course_lessons)
                   AND lp.updated_at >= now() - make_interval(days => $2)) AS active_students,
                (SELECT COUNT(*) FROM finished) AS completed_students,
                (SELECT COUNT(*) FROM course_lessons) AS total_lessons
            "#,
        )
        .bind(course_id)
        .bind(ACTIVE_WINDOW_DAYS)
        .fetch_one(mm.executor())
        .await?;

        Ok(Self {
            course_id,
            total_enrollments: row.total_enrollments,
            active_students: row.active_students,
            completed_students: row.completed_students,
            total_lessons: row.total_lessons,
            completion_rate: completion_rate(row.completed_students, row.total_enrollments),
        })
    }
}
