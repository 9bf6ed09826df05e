use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::entity::{CourseListingRow, Enrollment};
use crate::player::CourseProgress;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EnrollmentStatusResponse {
    pub enrolled: bool,
    pub enrollment: Option<Enrollment>,
}

/// One entry of the learner's "my courses" list.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MyCourseResponse {
    #[serde(flatten)]
    pub course: CourseListingRow,
    pub enrolled_at: DateTime<Utc>,
    pub progress: CourseProgress,
}
