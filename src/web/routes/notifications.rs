use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    model::{ResourceTyped, check_access, entity::UserNotification},
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::notifications::{InboxResponse, MarkedReadResponse},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(inbox_handler))
        .route("/read", put(read_all_handler))
        .route("/{id}/read", put(read_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    description = "Your newest notifications and the unread count",
    responses(
        (status = 200, description = "Inbox", body = InboxResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "notifications",
    security(
        ("cookie" = [])
    )
)]
async fn inbox_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let (items, unread) = tokio::try_join!(
        UserNotification::latest(state.pool(), user, UserNotification::INBOX_SIZE),
        UserNotification::count_unread(state.pool(), user),
    )
    .map_err(|e| WebError::resource_fetch_error(UserNotification::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(InboxResponse { items, unread })))
}

#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}/read",
    responses(
        (status = 200, description = "Marked read", body = UserNotification),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your notification", body = ErrorResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "notifications",
    security(
        ("cookie" = [])
    )
)]
async fn read_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = UserNotification::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserNotification::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserNotification::get_resource_type()))?;

    check_access(state.pool(), user, &found, user.user_id())
        .await
        .map_err(|e| WebError::resource_access_error(UserNotification::get_resource_type(), e))?;

    let updated = found
        .mark_read(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserNotification::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    put,
    path = "/api/v1/notifications/read",
    description = "Marks every one of your notifications read",
    responses(
        (status = 200, description = "Marked read", body = MarkedReadResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "notifications",
    security(
        ("cookie" = [])
    )
)]
async fn read_all_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let updated = UserNotification::mark_all_read(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserNotification::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(MarkedReadResponse { updated })))
}
