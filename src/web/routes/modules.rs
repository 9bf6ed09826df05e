use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{post, put},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped, check_access,
        entity::{Lesson, LessonCreate, Module, ModuleCreate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult, error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/{id}",
            put(module_update_handler).delete(module_delete_handler),
        )
        .route("/{id}/lessons", post(lesson_create_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

async fn owned_module(state: &AppState, user: &AuthenticatedUser, id: Uuid) -> WebResult<Module> {
    let found = Module::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Module::get_resource_type()))?;

    check_access(state.pool(), user, &found, user.user_id())
        .await
        .map_err(|e| WebError::resource_access_error(Module::get_resource_type(), e))?;

    Ok(found)
}

#[utoipa::path(
    put,
    path = "/api/v1/modules/{id}",
    request_body = ModuleCreate,
    responses(
        (status = 200, description = "Module updated", body = Module),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "modules",
    security(
        ("cookie" = [])
    )
)]
async fn module_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModuleCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let found = owned_module(&state, user, id).await?;

    let updated = found
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/modules/{id}",
    description = "Deletes a module with its lessons",
    responses(
        (status = 200, description = "Module deleted"),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "modules",
    security(
        ("cookie" = [])
    )
)]
async fn module_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let found = owned_module(&state, user, id).await?;

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/v1/modules/{id}/lessons",
    request_body = LessonCreate,
    description = "Adds a lesson to the module. Without `order_index` it goes last",
    responses(
        (status = 200, description = "Lesson created", body = Lesson),
        (status = 400, description = "Invalid lesson", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "modules",
    security(
        ("cookie" = [])
    )
)]
async fn lesson_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LessonCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    super::lessons::validate_lesson(&payload)?;
    let module = owned_module(&state, user, id).await?;

    let payload = LessonCreate {
        module_id: module.id(),
        ..payload
    };
    let created = Lesson::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(created)))
}
