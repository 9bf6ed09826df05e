pub mod courses;
pub mod enrollments;
pub mod learn;
pub mod notifications;
pub mod profiles;
pub mod progress;
