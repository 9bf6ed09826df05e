use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped, check_access,
        entity::{
            Course, CourseCreate, CourseFilter, CourseListingRow, CourseStats, Enrollment, Module,
            ModuleCreate, ModuleWithLessonsRow,
        },
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::courses::CourseDetailResponse, error::ErrorResponse, middlewares,
        routes::PaginationQuery,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(courses_list_handler).post(course_create_handler))
        .route(
            "/{id}",
            get(course_detail_handler)
                .put(course_update_handler)
                .delete(course_delete_handler),
        )
        .route("/{id}/modules", post(module_create_handler))
        .route("/{id}/analytics", get(course_analytics_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn validate_course(payload: &CourseCreate) -> WebResult<()> {
    if payload.title.trim().is_empty() {
        return Err(WebError::resource_bad_request(
            Course::get_resource_type(),
            "title must not be empty",
        ));
    }
    if payload.price_cents.is_some_and(|p| p < 0) {
        return Err(WebError::resource_bad_request(
            Course::get_resource_type(),
            "price must not be negative",
        ));
    }
    Ok(())
}

/// Loads a course the current user may edit.
async fn owned_course(
    state: &AppState,
    user: &AuthenticatedUser,
    id: Uuid,
) -> WebResult<Course> {
    let found = Course::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))?;

    check_access(state.pool(), user, &found, user.user_id())
        .await
        .map_err(|e| WebError::resource_access_error(Course::get_resource_type(), e))?;

    Ok(found)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses",
    description = "Public course catalogue. Filters are optional",
    params(PaginationQuery, CourseFilter),
    responses(
        (status = 200, description = "Requested page of courses", body = crate::model::Page<CourseListingRow>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_list_handler(
    State(state): State<AppState>,
    Query(page): Query<PaginationQuery>,
    Query(filter): Query<CourseFilter>,
) -> WebResult<impl IntoResponse> {
    let courses = CourseListingRow::search(
        state.pool(),
        &AuthenticatedUser::admin(),
        &filter,
        page.limit(),
        page.offset(),
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    description = "Course with its outline and totals",
    responses(
        (status = 200, description = "Course found", body = CourseDetailResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn course_detail_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let course = CourseListingRow::find_by_id(state.pool(), &admin, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))?;

    let (modules, enrolled) = tokio::try_join!(
        ModuleWithLessonsRow::fetch_outline(state.pool(), &admin, id),
        Enrollment::count_for_course(state.pool(), &admin, id),
    )
    .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(CourseDetailResponse::new(course, modules, enrolled)),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = CourseCreate,
    description = "Creates a course owned by the current instructor",
    responses(
        (status = 200, description = "Course created", body = Course),
        (status = 400, description = "Invalid course", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Only instructors and admins can do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("cookie" = [])
    )
)]
async fn course_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    validate_course(&payload)?;

    let created = Course::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    tracing::info!(course_id = %created.id(), "course created");
    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    request_body = CourseCreate,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Invalid course", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("cookie" = [])
    )
)]
async fn course_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CourseCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    validate_course(&payload)?;

    let found = owned_course(&state, user, id).await?;
    let updated = found
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    description = "Deletes a course with its modules, lessons and progress",
    responses(
        (status = 200, description = "Course deleted"),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("cookie" = [])
    )
)]
async fn course_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;

    let found = owned_course(&state, user, id).await?;
    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    tracing::info!(course_id = %id, "course deleted");
    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/modules",
    request_body = ModuleCreate,
    description = "Adds a module to the course. Without `order_index` it goes last",
    responses(
        (status = 200, description = "Module created", body = Module),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("cookie" = [])
    )
)]
async fn module_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModuleCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let course = owned_course(&state, user, id).await?;

    let payload = ModuleCreate {
        course_id: course.id(),
        ..payload
    };
    let created = Module::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/analytics",
    description = "Enrollment and completion numbers, for the course's instructor",
    responses(
        (status = 200, description = "Course numbers", body = CourseStats),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("cookie" = [])
    )
)]
async fn course_analytics_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let course = owned_course(&state, user, id).await?;

    let stats = CourseStats::for_course(state.pool(), user, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(stats)))
}
