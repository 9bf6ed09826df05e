use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "SID",
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::user::user_signup_handler,
        crate::web::routes::user::user_signin_handler,
        crate::web::routes::user::user_signout_handler,
        crate::web::routes::user::user_me_handler,
        crate::web::routes::user::user_list_handler,
        crate::web::routes::user::user_update_handler,
        crate::web::routes::user::user_role_handler,
        crate::web::routes::user::user_delete_handler,
        crate::web::routes::courses::courses_list_handler,
        crate::web::routes::courses::course_detail_handler,
        crate::web::routes::courses::course_create_handler,
        crate::web::routes::courses::course_update_handler,
        crate::web::routes::courses::course_delete_handler,
        crate::web::routes::courses::module_create_handler,
        crate::web::routes::courses::course_analytics_handler,
        crate::web::routes::modules::module_update_handler,
        crate::web::routes::modules::module_delete_handler,
        crate::web::routes::modules::lesson_create_handler,
        crate::web::routes::lessons::lesson_update_handler,
        crate::web::routes::lessons::lesson_delete_handler,
        crate::web::routes::enrollments::my_courses_handler,
        crate::web::routes::enrollments::enrollment_status_handler,
        crate::web::routes::enrollments::enroll_handler,
        crate::web::routes::enrollments::unenroll_handler,
        crate::web::routes::learn::outline_handler,
        crate::web::routes::learn::lesson_view_handler,
        crate::web::routes::learn::checkpoint_handler,
        crate::web::routes::learn::complete_handler,
        crate::web::routes::learn::session_handler,
        crate::web::routes::progress::progress_get_handler,
        crate::web::routes::profiles::profile_get_handler,
        crate::web::routes::profiles::profile_me_handler,
        crate::web::routes::profiles::profile_update_handler,
        crate::web::routes::notifications::inbox_handler,
        crate::web::routes::notifications::read_handler,
        crate::web::routes::notifications::read_all_handler,
    ),
    modifiers(&CookieAuthModifier),
)]
pub struct ApiDoc;
