use serde::{Deserialize, Serialize};

use crate::model::entity::CourseListingRow;
use crate::player::OutlineModule;

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: CourseListingRow,
    pub modules: Vec<OutlineModule>,
    pub total_lessons: usize,
    /// Sum of the lessons' declared durations; lessons without one count as 0.
    pub total_duration_seconds: i64,
    pub enrolled_students: i64,
}

impl CourseDetailResponse {
    pub fn new(course: CourseListingRow, modules: Vec<OutlineModule>, enrolled_students: i64) -> Self {
        let lessons = modules.iter().flat_map(|m| m.lessons.iter());
        let total_lessons = lessons.clone().count();
        let total_duration_seconds = lessons
            .filter_map(|l| l.duration_seconds)
            .map(i64::from)
            .sum();

        Self {
            course,
            modules,
            total_lessons,
            total_duration_seconds,
            enrolled_students,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RoleUpdateBody {
    pub role: String,
}
