//! HTTP API tests against a real PostgreSQL
//!
//! Run with `cargo test -- --ignored` on a machine with Docker.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use cftrack::{
    db::repositories::{SettingsRepository, SnapshotRepository, StudentRepository},
    models::{NewStudent, Student},
    services::{InactivityService, SyncReport, SyncService},
};
use common::{
    FakePlatform, FakeUser, rated_contest, settings_defaults, start_postgres, submission,
    sync_options, test_app, test_app_with,
};

fn platform() -> FakePlatform {
    FakePlatform::default()
        .with_user(
            "ada_l",
            FakeUser {
                rating: Some(1540),
                max_rating: Some(1620),
                rank: Some("specialist".to_string()),
                contests: vec![
                    rated_contest(1001, 40, 1400, 1480),
                    rated_contest(1002, 20, 1480, 1510),
                    rated_contest(1003, 5, 1510, 1540),
                ],
                submissions: vec![
                    submission(9, 1003, "A", Some(800), "OK", 1),
                    submission(8, 1003, "C", Some(1450), "OK", 2),
                    submission(7, 1003, "A", Some(800), "OK", 3),
                    submission(6, 1003, "B", Some(1200), "WRONG_ANSWER", 3),
                    submission(5, 1003, "B", Some(1200), "OK", 4),
                    submission(1, 900, "E", Some(2400), "OK", 60),
                ],
            },
        )
        .with_user(
            "idle_bob",
            FakeUser {
                submissions: vec![submission(3, 950, "A", Some(800), "OK", 20)],
                ..Default::default()
            },
        )
        .with_user(
            "busy_cy",
            FakeUser {
                submissions: vec![submission(4, 1003, "D", None, "COMPILATION_ERROR", 1)],
                ..Default::default()
            },
        )
}

/// Insert a student without the immediate fetch the API performs
async fn insert_student(pool: &PgPool, name: &str, handle: &str) -> Student {
    StudentRepository::create(
        pool,
        &NewStudent {
            name: name.to_string(),
            email: format!("{}@example.com", handle),
            phone_number: "555-0100".to_string(),
            codeforces_handle: handle.to_string(),
        },
    )
    .await
    .unwrap()
}

async fn seed_settings(pool: &PgPool) {
    let defaults = settings_defaults();
    SettingsRepository::get_or_create(pool, &defaults.sync_schedule, defaults.inactivity_threshold_days)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_student_and_reject_duplicates() {
    let (_container, pool) = start_postgres().await;
    let app = test_app(pool, platform()).await;

    let created = app.create_student("Ada Lovelace", "ada@example.com", "ada_l").await;
    assert!(created.get("cf_error").is_none());

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/students",
            Some(json!({
                "name": "Ada Again",
                "email": "ADA@example.com",
                "phone_number": "555-0199",
                "codeforces_handle": "someone_else",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Student with this email or Codeforces handle already exists"
    );

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/students",
            Some(json!({
                "name": "Other",
                "email": "other@example.com",
                "phone_number": "555-0199",
                "codeforces_handle": "ada_l",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request("POST", "/api/v1/students", Some(json!({ "name": "Only a name" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide all required fields");

    let (status, list) = app.request("GET", "/api/v1/students", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["current_rating"], 1540);
    assert_eq!(list[0]["max_rating"], 1620);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unknown_handle_still_creates_student() {
    let (_container, pool) = start_postgres().await;
    let app = test_app(pool, platform()).await;

    let created = app.create_student("Ghost", "ghost@example.com", "no_such_user").await;
    assert_eq!(
        created["cf_error"],
        "Could not fetch Codeforces data. Will try again during next sync."
    );

    let id = created["id"].as_str().unwrap();
    let (status, body) = app
        .request("GET", &format!("/api/v1/students/{}/codeforces", id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Codeforces data not found for this student");

    let (status, detail) = app.request("GET", &format!("/api/v1/students/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(detail["cf_data"].is_null());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_toggle_emails_flips_only_the_flag() {
    let (_container, pool) = start_postgres().await;
    let app = test_app(pool, platform()).await;

    let created = app.create_student("Bob", "bob@example.com", "idle_bob").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = app
        .request("PUT", &format!("/api/v1/students/{}/toggle-emails", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disable_emails"], true);

    let (_, detail) = app.request("GET", &format!("/api/v1/students/{}", id), None).await;
    assert_eq!(detail["disable_emails"], true);
    assert_eq!(detail["name"], created["name"]);
    assert_eq!(detail["email"], created["email"]);
    assert_eq!(detail["emails_sent"], created["emails_sent"]);

    let (_, body) = app
        .request("PUT", &format!("/api/v1/students/{}/toggle-emails", id), None)
        .await;
    assert_eq!(body["disable_emails"], false);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_contest_history_window() {
    let (_container, pool) = start_postgres().await;
    let app = test_app(pool, platform()).await;

    let created = app.create_student("Ada", "ada@example.com", "ada_l").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = app
        .request("GET", &format!("/api/v1/students/{}/contests?days=30", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<i64> = body["contests"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["contest_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1003, 1002]);

    let points: Vec<i64> = body["rating_points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["contest_id"].as_i64().unwrap())
        .collect();
    assert_eq!(points, vec![1002, 1003]);

    // Garbage falls back to 30 days
    let (_, fallback) = app
        .request("GET", &format!("/api/v1/students/{}/contests?days=abc", id), None)
        .await;
    assert_eq!(fallback["contests"], body["contests"]);

    let (_, wide) = app
        .request("GET", &format!("/api/v1/students/{}/contests?days=365", id), None)
        .await;
    assert_eq!(wide["contests"].as_array().unwrap().len(), 3);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_problem_stats_count_each_problem_once() {
    let (_container, pool) = start_postgres().await;
    let app = test_app(pool, platform()).await;

    let created = app.create_student("Ada", "ada@example.com", "ada_l").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = app
        .request("GET", &format!("/api/v1/students/{}/problems?days=30", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["total_problems_solved"], 3);
    assert_eq!(body["most_difficult_problem"]["index"], "C");
    assert_eq!(body["problems_by_rating"]["800"], 1);
    assert_eq!(body["problems_by_rating"]["1200"], 1);
    assert_eq!(body["problems_by_rating"]["1400"], 1);
    assert_eq!(body["average_rating"], 1150);
    assert_eq!(body["average_problems_per_day"], 0.1);

    let heatmap_total: u64 = body["submission_heatmap"]
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(heatmap_total, 3);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_inactivity_check_skips_and_cooldown() {
    let (_container, pool) = start_postgres().await;
    let app = test_app(pool.clone(), platform()).await;

    app.create_student("Bob", "bob@example.com", "idle_bob").await;
    app.create_student("Cy", "cy@example.com", "busy_cy").await;
    app.create_student("Ghost", "ghost@example.com", "no_such_user").await;
    let opted_out = app.create_student("Dee", "dee@example.com", "ada_l").await;
    app.request(
        "PUT",
        &format!("/api/v1/students/{}/toggle-emails", opted_out["id"].as_str().unwrap()),
        None,
    )
    .await;

    let defaults = settings_defaults();
    let sent = InactivityService::check_all(&pool, app.mailer.as_ref(), &defaults)
        .await
        .unwrap();
    assert_eq!(sent, 1);

    let mails = app.mailer.sent();
    assert_eq!(mails.len(), 1);
    assert_eq!(mails[0].to_address, "bob@example.com");

    // Within the cooldown nothing is sent again
    let sent = InactivityService::check_all(&pool, app.mailer.as_ref(), &defaults)
        .await
        .unwrap();
    assert_eq!(sent, 0);
    assert_eq!(app.mailer.sent().len(), 1);

    let (_, list) = app.request("GET", "/api/v1/students", None).await;
    let bob = list
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["email"] == "bob@example.com")
        .unwrap();
    assert_eq!(bob["emails_sent"], 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_settings_update_validates_cron() {
    let (_container, pool) = start_postgres().await;
    let app = test_app(pool, platform()).await;

    let (status, body) = app.request("GET", "/api/v1/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sync_schedule"], "0 2 * * *");
    assert_eq!(body["inactivity_threshold_days"], 7);

    let (status, body) = app
        .request("PUT", "/api/v1/config", Some(json!({ "sync_schedule": "whenever" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid cron schedule expression");

    let (status, _) = app
        .request("PUT", "/api/v1/config", Some(json!({ "inactivity_threshold_days": 0 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            "PUT",
            "/api/v1/config",
            Some(json!({ "sync_schedule": "30 4 * * 1", "inactivity_threshold_days": 10 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sync_schedule"], "30 4 * * 1");
    assert_eq!(body["inactivity_threshold_days"], 10);
    assert_eq!(
        app.state.scheduler().current_expression().await.as_deref(),
        Some("0 30 4 * * 1")
    );

    let (status, body) = app.request("POST", "/api/v1/config/sync", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Codeforces data sync started");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_and_delete_student() {
    let (_container, pool) = start_postgres().await;
    let app = test_app(pool, platform()).await;

    let bob = app.create_student("Bob", "bob@example.com", "idle_bob").await;
    app.create_student("Ada", "ada@example.com", "ada_l").await;
    let id = bob["id"].as_str().unwrap();

    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/v1/students/{}", id),
            Some(json!({ "email": "ada@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/v1/students/{}", id),
            Some(json!({ "codeforces_handle": "busy_cy", "name": "Robert" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Robert");
    assert!(body.get("cf_error").is_none());

    let (_, snapshot) = app
        .request("GET", &format!("/api/v1/students/{}/codeforces", id), None)
        .await;
    assert_eq!(snapshot["handle"], "busy_cy");

    let (status, body) = app.request("DELETE", &format!("/api/v1/students/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);

    let (status, body) = app.request("GET", &format!("/api/v1/students/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Student not found");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_malformed_bodies_get_message() {
    let (_container, pool) = start_postgres().await;
    let app = test_app(pool, platform()).await;

    let (status, body) = app
        .request_raw("POST", "/api/v1/students", "application/json", r#"{"name": "Ada""#)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body) = app
        .request_raw("POST", "/api/v1/students", "text/plain", "name=Ada")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body) = app
        .request("PUT", "/api/v1/config", Some(json!({ "inactivity_threshold_days": "ten" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (_, list) = app.request("GET", "/api/v1/students", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_oversized_threshold_is_rejected() {
    let (_container, pool) = start_postgres().await;
    let app = test_app(pool.clone(), platform()).await;

    let (status, body) = app
        .request("PUT", "/api/v1/config", Some(json!({ "inactivity_threshold_days": i32::MAX })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (_, settings) = app.request("GET", "/api/v1/config", None).await;
    assert_eq!(settings["inactivity_threshold_days"], 7);

    // The table refuses it too
    let stored = SettingsRepository::update(&pool, None, Some(i32::MAX)).await;
    assert!(stored.is_err());

    let (status, body) = app
        .request("PUT", "/api/v1/config", Some(json!({ "inactivity_threshold_days": 36500 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inactivity_threshold_days"], 36500);

    app.create_student("Bob", "bob@example.com", "idle_bob").await;
    let sent = InactivityService::check_all(&pool, app.mailer.as_ref(), &settings_defaults())
        .await
        .unwrap();
    assert_eq!(sent, 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_slow_platform_does_not_block_create() {
    let (_container, pool) = start_postgres().await;
    let mut options = sync_options();
    options.inline_timeout = Duration::from_millis(200);
    let app = test_app_with(
        pool,
        platform().with_latency(Duration::from_secs(30)),
        options,
    )
    .await;

    let started = std::time::Instant::now();
    let created = app.create_student("Ada", "ada@example.com", "ada_l").await;
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(
        created["cf_error"],
        "Could not fetch Codeforces data. Will try again during next sync."
    );

    let id = created["id"].as_str().unwrap();
    let (status, detail) = app.request("GET", &format!("/api/v1/students/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(detail["cf_data"].is_null());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_sync_all_continues_past_failures() {
    let (_container, pool) = start_postgres().await;
    let app = test_app(pool.clone(), platform()).await;
    seed_settings(&pool).await;

    app.create_student("Bob", "bob@example.com", "idle_bob").await;
    let ada = insert_student(&pool, "Ada", "ada_l").await;
    let ghost = insert_student(&pool, "Ghost", "no_such_user").await;

    let runner = app.state.runner();
    let report = SyncService::sync_all(&pool, runner.platform(), runner.options())
        .await
        .unwrap();
    assert_eq!(
        report,
        SyncReport {
            processed: 3,
            updated: 1,
            skipped_fresh: 1,
            failed: 1,
        }
    );

    let snapshot = SnapshotRepository::find_by_student(&pool, &ada.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.handle, "ada_l");
    assert_eq!(snapshot.rating, 1540);
    assert!(
        SnapshotRepository::find_by_student(&pool, &ghost.id)
            .await
            .unwrap()
            .is_none()
    );

    let (_, settings) = app.request("GET", "/api/v1/config", None).await;
    assert!(settings["last_sync_at"].is_string());

    // Everyone fetched so far is now fresh
    let report = SyncService::sync_all(&pool, runner.platform(), runner.options())
        .await
        .unwrap();
    assert_eq!(report.skipped_fresh, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.updated, 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_overlapping_run_is_skipped() {
    let (_container, pool) = start_postgres().await;
    let app = test_app(pool.clone(), platform()).await;
    seed_settings(&pool).await;

    let ada = insert_student(&pool, "Ada", "ada_l").await;
    let runner = app.state.runner();

    let guard = runner.try_acquire().unwrap();
    assert!(runner.run_manual().await.is_none());
    assert!(runner.run_scheduled().await.is_none());

    assert!(
        SnapshotRepository::find_by_student(&pool, &ada.id)
            .await
            .unwrap()
            .is_none()
    );
    let (_, settings) = app.request("GET", "/api/v1/config", None).await;
    assert!(settings["last_sync_at"].is_null());
    drop(guard);

    let report = runner.run_manual().await.unwrap();
    assert_eq!(report.updated, 1);
    assert!(
        SnapshotRepository::find_by_student(&pool, &ada.id)
            .await
            .unwrap()
            .is_some()
    );
    let (_, settings) = app.request("GET", "/api/v1/config", None).await;
    assert!(settings["last_sync_at"].is_string());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_scheduled_run_syncs_then_reminds() {
    let (_container, pool) = start_postgres().await;
    let app = test_app(pool.clone(), platform()).await;

    insert_student(&pool, "Bob", "idle_bob").await;
    insert_student(&pool, "Cy", "busy_cy").await;

    let report = app.state.runner().run_scheduled().await.unwrap();
    assert_eq!(report.updated, 2);

    let mails = app.mailer.sent();
    assert_eq!(mails.len(), 1);
    assert_eq!(mails[0].to_address, "idle_bob@example.com");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_health_reports_database_and_environment() {
    let (_container, pool) = start_postgres().await;
    let app = test_app(pool, platform()).await;

    let (status, body) = app.request("GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["environment"], "test");
}
