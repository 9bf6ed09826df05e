use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    model::{
        ResourceTyped,
        entity::{Course, CourseListingRow, Enrollment, LessonProgress, ModuleWithLessonsRow},
    },
    player::percent_complete,
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::enrollments::{EnrollmentStatusResponse, MyCourseResponse},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(my_courses_handler))
        .route(
            "/{course_id}",
            get(enrollment_status_handler)
                .post(enroll_handler)
                .delete(unenroll_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/enrollments",
    description = "Courses the current user is enrolled in, with progress",
    responses(
        (status = 200, description = "Enrolled courses", body = Vec<MyCourseResponse>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "enrollments",
    security(
        ("cookie" = [])
    )
)]
async fn my_courses_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let fetch_error = |e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e);

    let enrollments = Enrollment::all_for_user(state.pool(), user)
        .await
        .map_err(fetch_error)?;

    let mut courses = Vec::with_capacity(enrollments.len());
    for enrollment in enrollments {
        let course_id = enrollment.course_id();
        let (course, modules, completion) = tokio::try_join!(
            CourseListingRow::find_by_id(state.pool(), user, course_id),
            ModuleWithLessonsRow::fetch_outline(state.pool(), user, course_id),
            LessonProgress::completion_map(state.pool(), user, course_id),
        )
        .map_err(fetch_error)?;

        // deleted between the two reads
        let Some(course) = course else {
            continue;
        };

        courses.push(MyCourseResponse {
            course,
            enrolled_at: *enrollment.enrolled_at(),
            progress: percent_complete(&modules, &completion),
        });
    }

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/enrollments/{course_id}",
    responses(
        (status = 200, description = "Enrollment status", body = EnrollmentStatusResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "enrollments",
    security(
        ("cookie" = [])
    )
)]
async fn enrollment_status_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let enrollment = Enrollment::find(state.pool(), user, course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(EnrollmentStatusResponse {
            enrolled: enrollment.is_some(),
            enrollment,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/enrollments/{course_id}",
    responses(
        (status = 200, description = "Enrolled", body = Enrollment),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "enrollments",
    security(
        ("cookie" = [])
    )
)]
async fn enroll_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    CourseListingRow::find_by_id(state.pool(), user, course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))?;

    let enrollment = Enrollment::enroll(state.pool(), user, course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_conflict(Enrollment::get_resource_type()))?;

    tracing::info!(%course_id, user_id = %user.user_id(), "enrolled");
    Ok((StatusCode::OK, Json(enrollment)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/enrollments/{course_id}",
    description = "Leaves the course. Lesson progress is kept",
    responses(
        (status = 200, description = "Unenrolled"),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Not enrolled", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "enrollments",
    security(
        ("cookie" = [])
    )
)]
async fn unenroll_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let enrollment = Enrollment::find(state.pool(), user, course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Enrollment::get_resource_type()))?;

    enrollment
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}
