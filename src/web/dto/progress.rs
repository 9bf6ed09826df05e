use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProgressSummaryResponse {
    username: String,
    enrolled_courses: i64,
    completed_lessons: i64,
    total_watch_time_seconds: i64,
}

impl ProgressSummaryResponse {
    pub fn new(
        username: String,
        enrolled_courses: i64,
        completed_lessons: i64,
        total_watch_time_seconds: i64,
    ) -> Self {
        Self {
            username,
            enrolled_courses,
            completed_lessons,
            total_watch_time_seconds,
        }
    }
}
