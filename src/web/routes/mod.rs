use crate::{
    Config,
    web::{AppState, doc::ApiDoc},
};
use axum::Router;
use serde::Deserialize;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod courses;
pub mod enrollments;
pub mod learn;
pub mod lessons;
pub mod modules;
pub mod notifications;
pub mod profiles;
pub mod progress;
pub mod user;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    #[serde(default = "PaginationQuery::default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

impl PaginationQuery {
    const MAX_LIMIT: i64 = 100;

    fn default_limit() -> i64 {
        20
    }

    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.max(0)
    }
}

pub fn build_app<S: Send + Sync + Clone + 'static>(
    state: AppState,
    config: &'static Config,
) -> Router<S> {
    let mut router = Router::new()
        .nest("/api/v1/account", user::routes(state.clone()))
        .nest("/api/v1/courses", courses::routes(state.clone()))
        .nest("/api/v1/modules", modules::routes(state.clone()))
        .nest("/api/v1/lessons", lessons::routes(state.clone()))
        .nest("/api/v1/enrollments", enrollments::routes(state.clone()))
        .nest("/api/v1/learn", learn::routes(state.clone()))
        .nest("/api/v1/progress", progress::routes(state.clone()))
        .nest("/api/v1/profiles", profiles::routes(state.clone()))
        .nest("/api/v1/notifications", notifications::routes(state.clone()))
        .layer(CookieManagerLayer::default())
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    if config.app().docs() {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        let query: PaginationQuery = serde_json::from_str(r#"{"limit": 5000, "offset": -3}"#).unwrap();
        assert_eq!(query.limit(), 100);
        assert_eq!(query.offset(), 0);

        let query: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit(), 20);
    }
}
