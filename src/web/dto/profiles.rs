use serde::Serialize;

use crate::model::entity::{CourseListingRow, Profile};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: Profile,
    /// Courses the user teaches; empty for students.
    pub courses: Vec<CourseListingRow>,
}
