//! Learner side of the course player.
//!
//! Besides plain HTTP views, `GET /{course_id}/{lesson_id}/session` upgrades
//! to a WebSocket that runs a player session: the client sends
//! [`PlaybackEvent`]s as JSON text frames and receives [`Notification`]s.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    error::log_error,
    model::{
        CrudRepository, ResourceTyped,
        entity::{Course, Lesson, LessonProgress, LessonWithProgressRow, ModuleWithLessonsRow},
    },
    player::{
        LessonSequence, LessonSession, MediaDevice, Notification, Notifier, OutlineModule,
        PlaybackEvent, PlayerContext, SessionDriver, flatten,
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::learn::{CheckpointBody, CourseOutlineResponse, LessonViewResponse},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{course_id}", get(outline_handler))
        .route("/{course_id}/{lesson_id}", get(lesson_view_handler))
        .route("/{course_id}/{lesson_id}/checkpoint", put(checkpoint_handler))
        .route("/{course_id}/{lesson_id}/complete", post(complete_handler))
        .route("/{course_id}/{lesson_id}/session", get(session_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

/// The course outline, or 404 when the course does not exist.
async fn load_outline(
    state: &AppState,
    user: &AuthenticatedUser,
    course_id: Uuid,
) -> WebResult<Vec<OutlineModule>> {
    let (course, modules) = tokio::try_join!(
        Course::find_by_id(state.pool(), user, course_id),
        ModuleWithLessonsRow::fetch_outline(state.pool(), user, course_id),
    )
    .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    if course.is_none() {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    }
    Ok(modules)
}

/// Flattened lessons of the course, or 404 unless `lesson_id` is one of them.
async fn load_sequence(
    state: &AppState,
    user: &AuthenticatedUser,
    course_id: Uuid,
    lesson_id: Uuid,
) -> WebResult<LessonSequence> {
    let sequence = flatten(&load_outline(state, user, course_id).await?);
    if sequence.index_of(lesson_id).is_none() {
        return Err(WebError::resource_not_found(Lesson::get_resource_type()));
    }
    Ok(sequence)
}

#[utoipa::path(
    get,
    path = "/api/v1/learn/{course_id}",
    description = "Course outline with the current user's completion flags and progress",
    responses(
        (status = 200, description = "Outline", body = CourseOutlineResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "learn",
    security(
        ("cookie" = [])
    )
)]
async fn outline_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let modules = load_outline(&state, user, course_id).await?;
    let completion = LessonProgress::completion_map(state.pool(), user, course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(CourseOutlineResponse::new(course_id, modules, &completion)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/learn/{course_id}/{lesson_id}",
    description = "A lesson, the user's progress on it and previous/next navigation",
    responses(
        (status = 200, description = "Lesson", body = LessonViewResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Course or lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "learn",
    security(
        ("cookie" = [])
    )
)]
async fn lesson_view_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(Uuid, Uuid)>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let sequence = load_sequence(&state, user, course_id, lesson_id).await?;
    let navigation = sequence
        .navigation(lesson_id)
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    let row = LessonWithProgressRow::find_by_id(state.pool(), user, lesson_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    Ok((
        StatusCode::OK,
        Json(LessonViewResponse::new(row, navigation)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/learn/{course_id}/{lesson_id}/checkpoint",
    request_body = CheckpointBody,
    description = "Stores the absolute watch position of the lesson",
    responses(
        (status = 200, description = "Checkpoint stored", body = LessonProgress),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Course or lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "learn",
    security(
        ("cookie" = [])
    )
)]
async fn checkpoint_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CheckpointBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    load_sequence(&state, user, course_id, lesson_id).await?;

    let progress =
        LessonProgress::upsert_watch_time(state.pool(), user, lesson_id, payload.watch_time_seconds)
            .await
            .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(progress)))
}

#[utoipa::path(
    post,
    path = "/api/v1/learn/{course_id}/{lesson_id}/complete",
    description = "Marks the lesson completed. Repeating it keeps the first completion time",
    responses(
        (status = 200, description = "Lesson completed", body = LessonProgress),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Course or lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "learn",
    security(
        ("cookie" = [])
    )
)]
async fn complete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(Uuid, Uuid)>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    load_sequence(&state, user, course_id, lesson_id).await?;

    let progress = LessonProgress::mark_complete(state.pool(), user, lesson_id, chrono::Utc::now())
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(progress)))
}

#[utoipa::path(
    get,
    path = "/api/v1/learn/{course_id}/{lesson_id}/session",
    description = "Upgrades to a WebSocket player session. Send playback events as JSON text \
                   frames (`metadata_loaded`, `time_update`, `play`, `pause`, `ended`); \
                   notifications come back the same way",
    responses(
        (status = 101, description = "Switching protocols"),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Course or lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "learn",
    security(
        ("cookie" = [])
    )
)]
async fn session_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(Uuid, Uuid)>,
    ws: WebSocketUpgrade,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?.clone();

    let sequence = load_sequence(&state, &user, course_id, lesson_id).await?;
    let already_completed = LessonProgress::find(state.pool(), &user, lesson_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?
        .is_some_and(|progress| progress.completed());

    let session = LessonSession::new(sequence, lesson_id, already_completed, state.policy())
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    Ok(ws.on_upgrade(move |socket| run_player_socket(socket, state, user, session)))
}

#[tracing::instrument(skip_all, fields(user_id = %user.user_id(), lesson_id = %session.lesson_id()))]
async fn run_player_socket(
    mut socket: WebSocket,
    state: AppState,
    user: AuthenticatedUser,
    session: LessonSession,
) {
    let device = MediaDevice::new(state.device_buffer());
    let (notifier, mut notifications) = Notifier::channel();
    let cancel = state.shutdown().child_token();

    let context = PlayerContext {
        user,
        store: state.progress_store(),
        notifier,
        policy: state.policy(),
    };
    let driver = SessionDriver::new(context, session, cancel.clone());
    let handle = tokio::spawn(driver.run(device.observe()));
    tracing::debug!("player session opened");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<PlaybackEvent>(text.as_str()) {
                        Ok(event) => {
                            device.emit(event);
                        }
                        Err(e) => tracing::debug!(error = %e, "ignoring malformed playback event"),
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "player socket failed");
                    break;
                }
            },
            Some(notification) = notifications.recv() => {
                if !send_notification(&mut socket, &notification).await {
                    break;
                }
            }
        }
    }

    // closing the stream lets the driver handle what the learner already sent;
    // the token only fires on server shutdown
    drop(device);

    match handle.await {
        Ok(outcome) => tracing::debug!(
            state = ?outcome.state,
            completed = outcome.completed,
            advanced_to = ?outcome.advanced_to,
            pending_writes = outcome.in_flight.len(),
            "player session closed"
        ),
        Err(e) => log_error(&e),
    }
}

/// `false` once the socket is gone.
async fn send_notification(socket: &mut WebSocket, notification: &Notification) -> bool {
    let payload = match serde_json::to_string(notification) {
        Ok(payload) => payload,
        Err(e) => {
            log_error(&e);
            return true;
        }
    };

    socket.send(Message::Text(payload.into())).await.is_ok()
}
