use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::entity::LessonProgress;
use crate::model::{DatabaseResult, ModelManager};
use crate::web::AuthenticatedUser;

/// Where player sessions write progress to.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Stores an absolute watch position, replacing the previous one.
    async fn save_watch_time(
        &self,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
        watch_time_seconds: u32,
    ) -> DatabaseResult<()>;

    /// Flags the lesson completed. A first `completed_at` is kept.
    async fn mark_complete(
        &self,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
        at: DateTime<Utc>,
    ) -> DatabaseResult<()>;
}

#[async_trait]
impl ProgressStore for ModelManager {
    async fn save_watch_time(
        &self,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
        watch_time_seconds: u32,
    ) -> DatabaseResult<()> {
        LessonProgress::upsert_watch_time(self, actor, lesson_id, watch_time_seconds).await?;
        Ok(())
    }

    async fn mark_complete(
        &self,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
        at: DateTime<Utc>,
    ) -> DatabaseResult<()> {
        LessonProgress::mark_complete(self, actor, lesson_id, at).await?;
        Ok(())
    }
}
