use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A lesson as seen by navigation and aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OutlineLesson {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub video_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub order_index: i32,
}

/// A module with its lessons, in whatever order storage returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OutlineModule {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub lessons: Vec<OutlineLesson>,
}
