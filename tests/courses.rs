mod common;
use axum::http::StatusCode;
use coursehub::web::UserRole;
use serde_json::json;

use crate::common::{Scenario, Step, enroll, new_course, new_lesson, new_module, signin};

fn course_path(key: &'static str) -> impl Fn(&common::Saved) -> String + Send + Sync + 'static {
    move |saved| format!("/api/v1/courses/{}", saved.id(key))
}

#[tokio::test]
async fn route_course_catalogue_test() {
    let mut s = Scenario::start().await;
    let alice = s.db().user("alice", UserRole::Instructor).await;

    s.run_all([
        signin("alice"),
        new_course("Rust Basics").save_as("rust"),
        Step::post("piano", "/api/v1/courses").json(json!({
            "title": "Piano for Everyone",
            "category": "music",
            "difficulty": "advanced",
            "price_cents": 4900,
        })),
        new_module("rust", "Ownership").save_as("ownership"),
        new_lesson("ownership", "moves", 300),
        new_lesson("ownership", "borrows", 420),
        // the catalogue is public
        Step::get("catalogue", "/api/v1/courses").anonymous().check(|_, body| {
            assert_eq!(body["total"], 2);
            assert_eq!(body["items"][0]["instructor_name"], "alice");
        }),
        Step::get("search", "/api/v1/courses")
            .query("search", "RUST")
            .check(|_, body| {
                assert_eq!(body["total"], 1);
                assert_eq!(body["items"][0]["title"], "Rust Basics");
            }),
        Step::get("filter", "/api/v1/courses")
            .query("category", "music")
            .query("difficulty", "advanced")
            .check(|_, body| {
                assert_eq!(body["total"], 1);
                assert_eq!(body["items"][0]["price_cents"], 4900);
            }),
        Step::get("unknown_category", "/api/v1/courses")
            .query("category", "cooking")
            .expect(StatusCode::BAD_REQUEST),
        Step::get("by_instructor", "/api/v1/courses")
            .query("instructor_id", alice.id())
            .check(|_, body| assert_eq!(body["total"], 2)),
        Step::get("by_other_instructor", "/api/v1/courses")
            .query("instructor_id", uuid::Uuid::new_v4())
            .check(|_, body| assert_eq!(body["total"], 0)),
        Step::get("detail", "").at(course_path("rust")).check(|_, body| {
            assert_eq!(body["total_lessons"], 2);
            assert_eq!(body["total_duration_seconds"], 720);
            assert_eq!(body["enrolled_students"], 0);
            assert_eq!(body["instructor_name"], "alice");
            assert_eq!(body["modules"][0]["lessons"][1]["title"], "borrows");
        }),
        Step::get("detail_missing", "")
            .at(|_| format!("/api/v1/courses/{}", uuid::Uuid::new_v4()))
            .expect(StatusCode::NOT_FOUND),
    ])
    .await;
}

#[tokio::test]
async fn route_course_authoring_test() {
    let mut s = Scenario::start().await;
    s.db().user("alice", UserRole::Instructor).await;
    s.db().user("bob", UserRole::Instructor).await;
    s.db().user("sam", UserRole::Student).await;

    s.run_all([
        signin("sam"),
        new_course("Nope").expect(StatusCode::FORBIDDEN),
        signin("alice"),
        new_course("   ").expect(StatusCode::BAD_REQUEST),
        Step::post("negative_price", "/api/v1/courses")
            .json(json!({
                "title": "Negative",
                "category": "other",
                "difficulty": "beginner",
                "price_cents": -1,
            }))
            .expect(StatusCode::BAD_REQUEST),
        new_course("Rust Basics").save_as("rust"),
        new_module("rust", "First").save_as("first"),
        new_module("rust", "Second").save_as("second"),
        // modules without an explicit position go last
        Step::get("module_order", "").at(course_path("rust")).check(|saved, body| {
            assert_eq!(body["modules"][0]["id"], saved.get("first")["id"]);
            assert_eq!(body["modules"][1]["id"], saved.get("second")["id"]);
            assert_eq!(body["modules"][1]["order_index"], 1);
        }),
        new_lesson("first", "intro", 60).save_as("intro"),
        Step::put("lesson_update", "")
            .at(|saved| format!("/api/v1/lessons/{}", saved.id("intro")))
            .json(json!({ "title": "Introduction", "duration_seconds": 90 }))
            .check(|_, body| assert_eq!(body["title"], "Introduction")),
        // someone else's course
        signin("bob"),
        Step::put("course_update", "")
            .at(course_path("rust"))
            .json(json!({ "title": "Hijacked", "category": "other", "difficulty": "beginner" }))
            .expect(StatusCode::FORBIDDEN),
        new_module("rust", "Sneaky").expect(StatusCode::FORBIDDEN),
        new_lesson("first", "sneaky", 10).expect(StatusCode::FORBIDDEN),
        Step::delete("module_delete", "")
            .at(|saved| format!("/api/v1/modules/{}", saved.id("second")))
            .expect(StatusCode::FORBIDDEN),
        // the owner may
        signin("alice"),
        Step::put("course_update", "")
            .at(course_path("rust"))
            .json(json!({
                "title": "Rust in Depth",
                "category": "web_development",
                "difficulty": "intermediate",
            }))
            .check(|_, body| {
                assert_eq!(body["title"], "Rust in Depth");
                assert_eq!(body["difficulty"], "intermediate");
            }),
        Step::delete("module_delete", "").at(|saved| format!("/api/v1/modules/{}", saved.id("second"))),
        // and so may an admin
        signin("admin"),
        Step::delete("course_delete", "").at(course_path("rust")),
        Step::get("course_gone", "").at(course_path("rust")).expect(StatusCode::NOT_FOUND),
    ])
    .await;
}

#[tokio::test]
async fn route_enrollment_test() {
    let mut s = Scenario::start().await;
    s.db().user("alice", UserRole::Instructor).await;
    s.db().user("sam", UserRole::Student).await;

    let status = |key: &'static str| {
        Step::get("enrollment_status", "")
            .at(move |saved| format!("/api/v1/enrollments/{}", saved.id(key)))
    };

    s.run_all([
        signin("alice"),
        new_course("Rust Basics").save_as("rust"),
        new_module("rust", "Ownership").save_as("ownership"),
        new_lesson("ownership", "moves", 300),
        enroll("rust").anonymous().expect(StatusCode::UNAUTHORIZED),
        signin("sam"),
        status("rust").check(|_, body| {
            assert_eq!(body["enrolled"], false);
            assert!(body["enrollment"].is_null());
        }),
        enroll("rust"),
        enroll("rust").expect(StatusCode::CONFLICT),
        Step::post("enroll_missing", "")
            .at(|_| format!("/api/v1/enrollments/{}", uuid::Uuid::new_v4()))
            .expect(StatusCode::NOT_FOUND),
        status("rust").check(|_, body| assert_eq!(body["enrolled"], true)),
        Step::get("my_courses", "/api/v1/enrollments").check(|_, body| {
            assert_eq!(body[0]["title"], "Rust Basics");
            assert_eq!(body[0]["progress"]["total_lessons"], 1);
            assert_eq!(body[0]["progress"]["display_percent"], 0);
        }),
        Step::get("detail", "")
            .at(course_path("rust"))
            .check(|_, body| assert_eq!(body["enrolled_students"], 1)),
        Step::delete("unenroll", "").at(|saved| format!("/api/v1/enrollments/{}", saved.id("rust"))),
        Step::delete("unenroll_again", "")
            .at(|saved| format!("/api/v1/enrollments/{}", saved.id("rust")))
            .expect(StatusCode::NOT_FOUND),
        Step::get("my_courses", "/api/v1/enrollments").check(|_, body| assert_eq!(body, &json!([]))),
    ])
    .await;
}

#[tokio::test]
async fn route_course_analytics_test() {
    let mut s = Scenario::start().await;
    s.db().user("alice", UserRole::Instructor).await;
    s.db().user("bob", UserRole::Instructor).await;
    s.db().user("sam", UserRole::Student).await;
    s.db().user("kim", UserRole::Student).await;

    let analytics = || Step::get("analytics", "").at(|saved| format!("{}/analytics", course_path("rust")(saved)));
    let finish = |lesson: &'static str| {
        Step::post("complete", "").at(move |saved| {
            format!("/api/v1/learn/{}/{}/complete", saved.id("rust"), saved.id(lesson))
        })
    };

    s.run_all([
        signin("alice"),
        new_course("Rust Basics").save_as("rust"),
        analytics().check(|_, body| {
            assert_eq!(body["total_enrollments"], 0);
            assert_eq!(body["total_lessons"], 0);
            assert_eq!(body["completion_rate"], 0.0);
        }),
        new_module("rust", "Ownership").save_as("ownership"),
        new_lesson("ownership", "moves", 300).save_as("moves"),
        new_lesson("ownership", "borrows", 420).save_as("borrows"),
        // sam finishes the course, kim only starts it
        signin("sam"),
        enroll("rust"),
        finish("moves"),
        finish("borrows"),
        signin("kim"),
        enroll("rust"),
        finish("moves"),
        // numbers are for the owner
        analytics().expect(StatusCode::FORBIDDEN),
        signin("bob"),
        analytics().expect(StatusCode::FORBIDDEN),
        Step::get("analytics_missing", "")
            .at(|_| format!("/api/v1/courses/{}/analytics", uuid::Uuid::new_v4()))
            .expect(StatusCode::NOT_FOUND),
        signin("alice"),
        analytics().check(|saved, body| {
            assert_eq!(body["course_id"], saved.get("rust")["id"]);
            assert_eq!(body["total_enrollments"], 2);
            assert_eq!(body["active_students"], 2);
            assert_eq!(body["completed_students"], 1);
            assert_eq!(body["total_lessons"], 2);
            assert_eq!(body["completion_rate"], 0.5);
        }),
        signin("admin"),
        analytics().check(|_, body| assert_eq!(body["total_enrollments"], 2)),
    ])
    .await;
}
