use axum::{
    Json, Router, extract::State, http::StatusCode, middleware, response::IntoResponse,
    routing::get,
};

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{Enrollment, LessonProgress, UserEntity},
    },
    web::{
        AppState, RequestContext, WebError, WebResult, dto::progress::ProgressSummaryResponse,
        error::ErrorResponse, middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(progress_get_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/progress",
    description = "Get current user's progress",
    responses(
        (status = 200, description = "Progress found", body = ProgressSummaryResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "progress",
    security(
        ("cookie" = [])
    )
)]
async fn progress_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let (found, enrolled_courses, completed_lessons, watch_time) = tokio::try_join!(
        UserEntity::find_by_id(state.pool(), user, user.user_id()),
        Enrollment::count_for_user(state.pool(), user),
        LessonProgress::count_completed(state.pool(), user),
        LessonProgress::total_watch_time(state.pool(), user),
    )
    .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    let found = found.ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let res = ProgressSummaryResponse::new(
        found.username().to_string(),
        enrolled_courses,
        completed_lessons,
        watch_time,
    );

    Ok((StatusCode::OK, Json(res)))
}
