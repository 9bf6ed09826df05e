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
        entity::{Course, CourseFilter, CourseListingRow, Profile, ProfileUpdate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::profiles::ProfileResponse, error::ErrorResponse, middlewares,
    },
};

/// Upper bound on the courses listed on a profile.
const PROFILE_COURSES: i64 = 50;

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/me", get(profile_me_handler).put(profile_update_handler))
        .route("/{user_id}", get(profile_get_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

async fn load_profile(state: &AppState, actor: &AuthenticatedUser, user_id: Uuid) -> WebResult<ProfileResponse> {
    let profile = Profile::find(state.pool(), actor, user_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Profile::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Profile::get_resource_type()))?;

    let filter = CourseFilter {
        instructor_id: Some(user_id),
        ..Default::default()
    };
    let courses = CourseListingRow::search(state.pool(), actor, &filter, PROFILE_COURSES, 0)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok(ProfileResponse {
        profile,
        courses: courses.items,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/profiles/{user_id}",
    description = "Public profile of any user, with the courses they teach",
    responses(
        (status = 200, description = "Profile found", body = ProfileResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "profiles"
)]
async fn profile_get_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let res = load_profile(&state, &AuthenticatedUser::admin(), user_id).await?;
    Ok((StatusCode::OK, Json(res)))
}

#[utoipa::path(
    get,
    path = "/api/v1/profiles/me",
    responses(
        (status = 200, description = "Your profile", body = ProfileResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "profiles",
    security(
        ("cookie" = [])
    )
)]
async fn profile_me_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let res = load_profile(&state, user, user.user_id()).await?;
    Ok((StatusCode::OK, Json(res)))
}

#[utoipa::path(
    put,
    path = "/api/v1/profiles/me",
    request_body = ProfileUpdate,
    description = "Replaces your display name, bio, avatar and skills",
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Invalid profile", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "profiles",
    security(
        ("cookie" = [])
    )
)]
async fn profile_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ProfileUpdate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let payload = payload
        .normalized()
        .map_err(|details| WebError::resource_bad_request(Profile::get_resource_type(), details))?;

    Profile::upsert(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Profile::get_resource_type(), e))?;

    tracing::info!(user_id = %user.user_id(), "profile updated");
    let res = load_profile(&state, user, user.user_id()).await?;
    Ok((StatusCode::OK, Json(res)))
}
