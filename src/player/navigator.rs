use serde::Serialize;
use uuid::Uuid;

use super::{OutlineLesson, OutlineModule};

/// Lessons of a course in playback order: modules by `order_index`, then
/// lessons by `order_index`, ties broken by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonSequence {
    lessons: Vec<OutlineLesson>,
}

/// Where a lesson sits in its course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Navigation {
    /// Zero-based index into the flattened course.
    pub position: usize,
    pub total: usize,
    pub previous: Option<Uuid>,
    pub next: Option<Uuid>,
}

pub fn flatten(modules: &[OutlineModule]) -> LessonSequence {
    let mut modules: Vec<&OutlineModule> = modules.iter().collect();
    modules.sort_by_key(|module| (module.order_index, module.id));

    let lessons = modules
        .into_iter()
        .flat_map(|module| {
            let mut lessons: Vec<&OutlineLesson> = module.lessons.iter().collect();
            lessons.sort_by_key(|lesson| (lesson.order_index, lesson.id));
            lessons.into_iter().cloned()
        })
        .collect();

    LessonSequence { lessons }
}

impl LessonSequence {
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    pub fn lessons(&self) -> &[OutlineLesson] {
        &self.lessons
    }

    pub fn get(&self, index: usize) -> Option<&OutlineLesson> {
        self.lessons.get(index)
    }

    pub fn index_of(&self, lesson_id: Uuid) -> Option<usize> {
        self.lessons.iter().position(|lesson| lesson.id == lesson_id)
    }

    /// `None` at the first lesson. No wrap-around.
    pub fn previous(&self, index: usize) -> Option<&OutlineLesson> {
        if index >= self.lessons.len() {
            return None;
        }
        index.checked_sub(1).and_then(|i| self.lessons.get(i))
    }

    /// `None` at the last lesson. No wrap-around.
    pub fn next(&self, index: usize) -> Option<&OutlineLesson> {
        if index >= self.lessons.len() {
            return None;
        }
        self.lessons.get(index + 1)
    }

    pub fn navigation(&self, lesson_id: Uuid) -> Option<Navigation> {
        let position = self.index_of(lesson_id)?;

        Some(Navigation {
            position,
            total: self.lessons.len(),
            previous: self.previous(position).map(|lesson| lesson.id),
            next: self.next(position).map(|lesson| lesson.id),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lesson(module_id: Uuid, title: &str, order_index: i32) -> OutlineLesson {
        OutlineLesson {
            id: Uuid::new_v4(),
            module_id,
            title: title.to_string(),
            video_url: Some(format!("https://cdn.example.com/{title}.mp4")),
            duration_seconds: None,
            order_index,
        }
    }

    /// Module B (order 1) is listed first, lessons of A are out of order.
    fn outline() -> Vec<OutlineModule> {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        vec![
            OutlineModule {
                id: b,
                title: "B".into(),
                order_index: 1,
                lessons: vec![lesson(b, "b1", 0)],
            },
            OutlineModule {
                id: a,
                title: "A".into(),
                order_index: 0,
                lessons: vec![lesson(a, "a2", 1), lesson(a, "a1", 0)],
            },
        ]
    }

    fn titles(sequence: &LessonSequence) -> Vec<&str> {
        sequence.lessons().iter().map(|l| l.title.as_str()).collect()
    }

    #[test]
    fn flattens_in_order() {
        let sequence = flatten(&outline());
        assert_eq!(titles(&sequence), vec!["a1", "a2", "b1"]);
    }

    #[test]
    fn ties_are_stable() {
        let module_id = Uuid::new_v4();
        let mut first = lesson(module_id, "x", 0);
        let mut second = lesson(module_id, "y", 0);
        first.id = Uuid::from_u128(1);
        second.id = Uuid::from_u128(2);

        let module = OutlineModule {
            id: module_id,
            title: "M".into(),
            order_index: 0,
            lessons: vec![second, first],
        };

        let sequence = flatten(std::slice::from_ref(&module));
        assert_eq!(titles(&sequence), vec!["x", "y"]);
        assert_eq!(flatten(&[module]), sequence);
    }

    #[test]
    fn bounds_are_not_wrapped() {
        let sequence = flatten(&outline());
        let last = sequence.len() - 1;

        assert!(sequence.previous(0).is_none());
        assert!(sequence.next(last).is_none());
        assert!(sequence.previous(last + 1).is_none());
        assert!(sequence.next(last + 1).is_none());
        assert_eq!(sequence.next(0).map(|l| l.title.as_str()), Some("a2"));
        assert_eq!(sequence.previous(last).map(|l| l.title.as_str()), Some("a2"));
    }

    #[test]
    fn navigation_of_a_lesson() {
        let sequence = flatten(&outline());
        let a2 = sequence.get(1).unwrap().id;

        let navigation = sequence.navigation(a2).unwrap();
        assert_eq!(navigation.position, 1);
        assert_eq!(navigation.total, 3);
        assert_eq!(navigation.previous, Some(sequence.get(0).unwrap().id));
        assert_eq!(navigation.next, Some(sequence.get(2).unwrap().id));

        assert!(sequence.navigation(Uuid::new_v4()).is_none());
    }

    #[test]
    fn empty_course() {
        let sequence = flatten(&[]);
        assert!(sequence.is_empty());
        assert!(sequence.previous(0).is_none());
        assert!(sequence.next(0).is_none());
    }
}
