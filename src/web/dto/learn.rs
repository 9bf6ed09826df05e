use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{Lesson, LessonWithProgressRow};
use crate::player::{
    CompletionMap, CourseProgress, Navigation, OutlineLesson, OutlineModule, percent_complete,
};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OutlineLessonStatus {
    #[serde(flatten)]
    pub lesson: OutlineLesson,
    pub completed: bool,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OutlineModuleStatus {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub lessons: Vec<OutlineLessonStatus>,
}

/// Sidebar of the course player.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CourseOutlineResponse {
    pub course_id: Uuid,
    pub modules: Vec<OutlineModuleStatus>,
    pub progress: CourseProgress,
}

impl CourseOutlineResponse {
    pub fn new(course_id: Uuid, modules: Vec<OutlineModule>, completion: &CompletionMap) -> Self {
        let progress = percent_complete(&modules, completion);
        let modules = modules
            .into_iter()
            .map(|module| OutlineModuleStatus {
                id: module.id,
                title: module.title,
                order_index: module.order_index,
                lessons: module
                    .lessons
                    .into_iter()
                    .map(|lesson| OutlineLessonStatus {
                        completed: completion.get(&lesson.id).copied().unwrap_or(false),
                        lesson,
                    })
                    .collect(),
            })
            .collect();

        Self {
            course_id,
            modules,
            progress,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LessonViewResponse {
    pub lesson: Lesson,
    pub watch_time_seconds: i32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub navigation: Navigation,
}

impl LessonViewResponse {
    pub fn new(row: LessonWithProgressRow, navigation: Navigation) -> Self {
        Self {
            lesson: row.lesson,
            watch_time_seconds: row.watch_time_seconds,
            completed: row.completed,
            completed_at: row.completed_at,
            navigation,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CheckpointBody {
    pub watch_time_seconds: u32,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn outline_marks_completed_lessons() {
        let module_id = Uuid::new_v4();
        let lesson = |order_index| OutlineLesson {
            id: Uuid::new_v4(),
            module_id,
            title: format!("Lesson {order_index}"),
            video_url: None,
            duration_seconds: None,
            order_index,
        };
        let modules = vec![OutlineModule {
            id: module_id,
            title: "Intro".into(),
            order_index: 0,
            lessons: vec![lesson(0), lesson(1)],
        }];
        let done = modules[0].lessons[0].id;

        let response =
            CourseOutlineResponse::new(Uuid::new_v4(), modules, &CompletionMap::from([(done, true)]));

        assert!(response.modules[0].lessons[0].completed);
        assert!(!response.modules[0].lessons[1].completed);
        assert_eq!(response.progress.display_percent, 50);
    }
}
