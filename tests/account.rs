mod common;
use axum::http::StatusCode;
use coursehub::web::{UserRole, middlewares::AUTH_TOKEN};
use serde_json::json;
use tower_cookies::cookie::SameSite;

use crate::common::{Scenario, Step, new_course, signin, signup};

#[tokio::test]
async fn route_account_signup_test() {
    let mut s = Scenario::start().await;

    s.run(
        signup("ada")
            .check_cookie(AUTH_TOKEN, |cookie| {
                assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                assert_eq!(cookie.path(), Some("/"));
                assert_eq!(cookie.http_only(), Some(true));
            })
            // new accounts always start as learners
            .check(|_, body| {
                assert_eq!(body["username"], "ada");
                assert_eq!(body["role"], "student");
                assert!(body.get("password_hash").is_none());
            })
            .save_as("ada"),
    )
    .await;

    s.run_all([
        Step::get("me", "/api/v1/account/me").check(|saved, body| {
            assert_eq!(body["id"], saved.get("ada")["id"]);
            assert_eq!(body["role"], "student");
        }),
        signup("ada").anonymous().expect(StatusCode::CONFLICT),
    ])
    .await;
}

#[tokio::test]
async fn route_account_signin_test() {
    let mut s = Scenario::start().await;
    s.db().user("grace", UserRole::Instructor).await;

    s.run_all([
        signin("grace").check(|_, body| assert_eq!(body["role"], "instructor")),
        Step::post("wrong_password", "/api/v1/account/signin")
            .json(json!({ "username": "grace", "password": "hopper" }))
            .anonymous()
            .expect(StatusCode::UNAUTHORIZED)
            .check(|_, body| {
                assert!(body["message"].as_str().unwrap().contains("Authentication error"));
            }),
        signin("nobody").expect(StatusCode::UNAUTHORIZED),
        signin("grace"),
        Step::post("signout", "/api/v1/account/signout")
            .check_cookie(AUTH_TOKEN, |cookie| assert_eq!(cookie.value(), "")),
        Step::get("me_signed_out", "/api/v1/account/me")
            .anonymous()
            .expect(StatusCode::UNAUTHORIZED),
    ])
    .await;
}

#[tokio::test]
async fn route_account_promotion_test() {
    let mut s = Scenario::start().await;

    let tutor = s.run(signup("tutor").save_as("tutor")).await;
    let tutor_id = tutor["id"].as_str().unwrap().to_string();
    let role_path = format!("/api/v1/account/{tutor_id}/role");

    s.run_all([
        // learners can neither author nor promote themselves
        new_course("Before promotion").expect(StatusCode::FORBIDDEN),
        Step::put("self_promotion", &role_path)
            .json(json!({ "role": "instructor" }))
            .expect(StatusCode::FORBIDDEN),
        signin("admin"),
        Step::put("unknown_role", &role_path)
            .json(json!({ "role": "wizard" }))
            .expect(StatusCode::BAD_REQUEST),
        Step::put("promote", &role_path)
            .json(json!({ "role": "instructor" }))
            .check(|_, body| assert_eq!(body["role"], "instructor")),
        signin("tutor"),
        Step::get("me", "/api/v1/account/me").check(|_, body| assert_eq!(body["role"], "instructor")),
    ])
    .await;

    s.run(new_course("After promotion").check(move |_, body| {
        assert_eq!(body["instructor_id"], tutor_id.as_str());
        assert_eq!(body["title"], "After promotion");
    }))
    .await;

    s.run_all([
        signin("admin"),
        Step::put("demote", &role_path).json(json!({ "role": "student" })),
        signin("tutor"),
        new_course("After demotion").expect(StatusCode::FORBIDDEN),
    ])
    .await;
}

#[tokio::test]
async fn route_account_admin_test() {
    let mut s = Scenario::start().await;
    let grace = s.db().user("grace", UserRole::Instructor).await;
    let grace_path = format!("/api/v1/account/{}", grace.id());

    s.run(signup("sam").save_as("sam")).await;
    s.run_all([
        Step::get("user_page", "/api/v1/account/page")
            .query("limit", 5)
            .expect(StatusCode::FORBIDDEN),
        Step::put("rename_other", &grace_path)
            .json(json!({ "username": "mallory", "password": "x" }))
            .expect(StatusCode::FORBIDDEN),
        Step::delete("delete_other", &grace_path).expect(StatusCode::FORBIDDEN),
        Step::put("rename_self", "")
            .at(|saved| format!("/api/v1/account/{}", saved.id("sam")))
            .json(json!({ "username": "samuel", "password": "samuel" }))
            .check(|_, body| assert_eq!(body["username"], "samuel")),
        // a course to see the cascade below
        signin("grace"),
        new_course("Compilers"),
        signin("admin"),
        Step::get("user_page", "/api/v1/account/page")
            .query("limit", 5)
            .query("offset", 0)
            .check(|_, body| {
                assert_eq!(body["total"], 3);
                assert_eq!(body["limit"], 5);
            }),
        Step::put("rename_taken", &grace_path)
            .json(json!({ "username": "samuel", "password": "x" }))
            .expect(StatusCode::CONFLICT),
        Step::delete("delete_instructor", &grace_path),
        Step::delete("delete_again", &grace_path).expect(StatusCode::NOT_FOUND),
        // their courses went with them
        Step::get("catalogue", "/api/v1/courses").check(|_, body| assert_eq!(body["total"], 0)),
        signin("samuel"),
        Step::delete("delete_self", "").at(|saved| format!("/api/v1/account/{}", saved.id("sam"))),
        signin("samuel").expect(StatusCode::UNAUTHORIZED),
    ])
    .await;
}
