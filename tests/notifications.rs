mod common;
use axum::http::StatusCode;
use coursehub::web::UserRole;

use crate::common::{Saved, Scenario, Step, enroll, new_course, new_lesson, new_module, signin};

fn inbox() -> Step {
    Step::get("inbox", "/api/v1/notifications")
}

fn complete(lesson: &'static str) -> Step {
    Step::post("complete", "").at(move |saved| {
        format!("/api/v1/learn/{}/{}/complete", saved.id("rust"), saved.id(lesson))
    })
}

fn read_path(saved: &Saved) -> String {
    let id = saved.get("sam_inbox")["items"][0]["id"].as_str().unwrap().to_string();
    format!("/api/v1/notifications/{id}/read")
}

#[tokio::test]
async fn route_notifications_test() {
    let mut s = Scenario::start().await;
    s.db().user("alice", UserRole::Instructor).await;
    s.db().user("sam", UserRole::Student).await;

    s.run_all([
        inbox().anonymous().expect(StatusCode::UNAUTHORIZED),
        signin("alice"),
        new_course("Rust Basics").save_as("rust"),
        new_module("rust", "Ownership").save_as("ownership"),
        new_lesson("ownership", "moves", 300).save_as("moves"),
        new_lesson("ownership", "borrows", 420).save_as("borrows"),
        // enrolling in your own course notifies nobody
        enroll("rust"),
        inbox().check(|_, body| assert_eq!(body["unread"], 0)),
        signin("sam"),
        enroll("rust"),
        complete("moves"),
        complete("moves"),
        complete("borrows"),
        inbox()
            .check(|saved, body| {
                let items = body["items"].as_array().unwrap();
                assert_eq!(items.len(), 2);
                assert_eq!(body["unread"], 2);
                // newest first
                assert_eq!(items[0]["kind"], "completion");
                assert!(items[0]["message"].as_str().unwrap().contains("borrows"));
                assert!(items[1]["message"].as_str().unwrap().contains("moves"));
                let link = format!("/learn/{}/{}", saved.id("rust"), saved.id("moves"));
                assert_eq!(items[1]["link"], link.as_str());
                assert_eq!(items[1]["read"], false);
            })
            .save_as("sam_inbox"),
        // someone else's notification
        signin("alice"),
        Step::put("read_foreign", "").at(read_path).expect(StatusCode::FORBIDDEN),
        inbox().check(|_, body| {
            assert_eq!(body["unread"], 1);
            assert_eq!(body["items"][0]["kind"], "enrollment");
            assert_eq!(body["items"][0]["message"], "sam enrolled in Rust Basics");
        }),
        signin("sam"),
        Step::put("read_one", "")
            .at(read_path)
            .check(|_, body| assert_eq!(body["read"], true)),
        inbox().check(|_, body| {
            assert_eq!(body["unread"], 1);
            assert_eq!(body["items"][0]["read"], true);
        }),
        Step::put("read_missing", "")
            .at(|_| format!("/api/v1/notifications/{}/read", uuid::Uuid::new_v4()))
            .expect(StatusCode::NOT_FOUND),
        Step::put("read_all", "/api/v1/notifications/read")
            .check(|_, body| assert_eq!(body["updated"], 1)),
        inbox().check(|_, body| assert_eq!(body["unread"], 0)),
    ])
    .await;
}

#[tokio::test]
async fn route_notifications_latest_test() {
    const LESSONS: [&str; 12] = [
        "l01", "l02", "l03", "l04", "l05", "l06", "l07", "l08", "l09", "l10", "l11", "l12",
    ];

    let mut s = Scenario::start().await;
    s.db().user("alice", UserRole::Instructor).await;
    s.db().user("sam", UserRole::Student).await;

    s.run_all([
        signin("alice"),
        new_course("Long Course").save_as("rust"),
        new_module("rust", "Everything").save_as("everything"),
    ])
    .await;
    for lesson in LESSONS {
        s.run(new_lesson("everything", lesson, 60).save_as(lesson)).await;
    }

    s.run(signin("sam")).await;
    for lesson in LESSONS {
        s.run(complete(lesson)).await;
    }

    // the inbox shows ten entries but counts every unread one
    s.run(inbox().check(|_, body| {
        assert_eq!(body["items"].as_array().map(Vec::len), Some(10));
        assert_eq!(body["unread"], 12);
        assert!(body["items"][0]["message"].as_str().unwrap().contains("l12"));
    }))
    .await;
}
