use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use super::OutlineModule;

/// Completion flag per lesson id. Lessons without an entry count as not completed.
pub type CompletionMap = HashMap<Uuid, bool>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, utoipa::ToSchema)]
pub struct CourseProgress {
    pub total_lessons: u32,
    pub completed_lessons: u32,
    /// Exact percentage, `0.0..=100.0`.
    pub percent: f64,
    /// `percent` rounded half away from zero.
    pub display_percent: u32,
}

impl CourseProgress {
    pub fn is_finished(&self) -> bool {
        self.total_lessons > 0 && self.completed_lessons == self.total_lessons
    }
}

/// Share of the course's lessons the user completed. An empty course is 0%.
pub fn percent_complete(modules: &[OutlineModule], completion: &CompletionMap) -> CourseProgress {
    let (total, completed) = modules
        .iter()
        .flat_map(|module| module.lessons.iter())
        .fold((0u32, 0u32), |(total, completed), lesson| {
            let done = completion.get(&lesson.id).copied().unwrap_or(false);
            (total + 1, completed + u32::from(done))
        });

    let percent = if total == 0 {
        0.0
    } else {
        f64::from(completed) / f64::from(total) * 100.0
    };

    CourseProgress {
        total_lessons: total,
        completed_lessons: completed,
        percent,
        display_percent: percent.round() as u32,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::player::OutlineLesson;

    fn lesson(module_id: Uuid, order_index: i32) -> OutlineLesson {
        OutlineLesson {
            id: Uuid::new_v4(),
            module_id,
            title: format!("Lesson {order_index}"),
            video_url: None,
            duration_seconds: Some(60),
            order_index,
        }
    }

    fn module(order_index: i32, lessons: usize) -> OutlineModule {
        let id = Uuid::new_v4();
        OutlineModule {
            id,
            title: format!("Module {order_index}"),
            order_index,
            lessons: (0..lessons).map(|i| lesson(id, i as i32)).collect(),
        }
    }

    #[test]
    fn empty_course_is_zero() {
        let progress = percent_complete(&[], &CompletionMap::new());
        assert_eq!(progress.total_lessons, 0);
        assert_eq!(progress.percent, 0.0);
        assert_eq!(progress.display_percent, 0);
        assert!(!progress.is_finished());

        let progress = percent_complete(&[module(0, 0)], &CompletionMap::new());
        assert_eq!(progress.percent, 0.0);
    }

    #[test]
    fn two_of_three_lessons() {
        let modules = vec![module(0, 2), module(1, 1)];
        let completion = CompletionMap::from([
            (modules[0].lessons[0].id, true),
            (modules[0].lessons[1].id, false),
            (modules[1].lessons[0].id, true),
        ]);

        let progress = percent_complete(&modules, &completion);
        assert_eq!(progress.total_lessons, 3);
        assert_eq!(progress.completed_lessons, 2);
        assert!((progress.percent - 66.666).abs() < 0.01);
        assert_eq!(progress.display_percent, 67);
    }

    #[test]
    fn everything_completed_is_one_hundred() {
        let modules = vec![module(0, 3), module(1, 2)];
        let completion: CompletionMap = modules
            .iter()
            .flat_map(|m| m.lessons.iter())
            .map(|l| (l.id, true))
            .collect();

        let progress = percent_complete(&modules, &completion);
        assert_eq!(progress.percent, 100.0);
        assert_eq!(progress.display_percent, 100);
        assert!(progress.is_finished());
    }

    #[test]
    fn ignores_lessons_outside_the_course() {
        let modules = vec![module(0, 2)];
        let completion = CompletionMap::from([
            (modules[0].lessons[0].id, true),
            (Uuid::new_v4(), true),
            (Uuid::new_v4(), true),
        ]);

        let progress = percent_complete(&modules, &completion);
        assert_eq!(progress.completed_lessons, 1);
        assert_eq!(progress.display_percent, 50);
    }
}
