mod user;
pub use user::{UserEntity, UserEntityCreateUpdate};

mod course;
pub use course::{Course, CourseCategory, CourseCreate, CourseFilter, CourseListingRow, Difficulty};

mod module;
pub use module::{Module, ModuleCreate, ModuleWithLessonsRow};

mod lesson;
pub use lesson::{Lesson, LessonCreate, LessonWithProgressRow};

mod lesson_progress;
pub use lesson_progress::LessonProgress;

mod enrollment;
pub use enrollment::Enrollment;

mod profile;
pub use profile::{Profile, ProfileUpdate};

mod notification;
pub use notification::{NotificationKind, UserNotification};

mod course_stats;
pub use course_stats::{CourseStats, completion_rate};
