//! `CodeforcesClient` against a local fake of the public API

use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use cftrack::{
    codeforces::{CodeforcesClient, CodeforcesError, ContestPlatform},
    config::CodeforcesConfig,
};

async fn api(Path(method): Path<String>, Query(query): Query<HashMap<String, String>>) -> impl IntoResponse {
    match method.as_str() {
        "user.info" => match query.get("handles").map(String::as_str) {
            Some("tourist") => (
                StatusCode::OK,
                Json(json!({
                    "status": "OK",
                    "result": [{"handle": "tourist", "rating": 3800, "maxRating": 4000,
                                "rank": "legendary grandmaster", "maxRank": "legendary grandmaster"}]
                })),
            ),
            Some("empty") => (StatusCode::OK, Json(json!({"status": "OK", "result": []}))),
            _ => (
                StatusCode::BAD_REQUEST,
                Json(json!({"status": "FAILED", "comment": "handles: User with handle nobody not found"})),
            ),
        },
        "user.rating" => (
            StatusCode::OK,
            Json(json!({
                "status": "OK",
                "result": [{"contestId": 1, "contestName": "Round 1", "handle": "tourist", "rank": 1,
                            "ratingUpdateTimeSeconds": 1700000000, "oldRating": 3700, "newRating": 3800}]
            })),
        ),
        "user.status" => {
            let paged = query.get("from").map(String::as_str) == Some("1")
                && query.get("count").map(String::as_str) == Some("1000");
            let result: Value = if paged {
                json!([{"id": 5, "contestId": 1, "creationTimeSeconds": 1700000000,
                        "problem": {"contestId": 1, "index": "A", "name": "Start", "rating": 800, "tags": ["implementation"]},
                        "verdict": "OK"}])
            } else {
                json!([])
            };
            (StatusCode::OK, Json(json!({"status": "OK", "result": result})))
        }
        "contest.standings" => (
            StatusCode::OK,
            Json(json!({
                "status": "OK",
                "result": {
                    "contest": {"id": 1},
                    "problems": [{"index": "A", "name": "Start"}, {"index": "B", "name": "Next"}],
                    "rows": []
                }
            })),
        ),
        _ => (StatusCode::NOT_FOUND, Json(json!({"status": "FAILED", "comment": "unknown method"}))),
    }
}

async fn client() -> CodeforcesClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/api/{method}", get(api));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    CodeforcesClient::new(&CodeforcesConfig {
        api_url: format!("http://{}/api/", addr),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_user_info_decodes_profile() {
    let client = client().await;

    let user = client.user_info("tourist").await.unwrap();
    assert_eq!(user.rating, Some(3800));
    assert_eq!(user.max_rating, Some(4000));
    assert_eq!(user.rank.as_deref(), Some("legendary grandmaster"));
}

#[tokio::test]
async fn test_failed_envelope_carries_comment() {
    let client = client().await;

    match client.user_info("nobody").await {
        Err(CodeforcesError::Api { method, comment }) => {
            assert_eq!(method, "user.info");
            assert!(comment.contains("not found"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_user_list_is_handle_not_found() {
    let client = client().await;

    let err = client.user_info("empty").await.unwrap_err();
    assert!(matches!(err, CodeforcesError::HandleNotFound(h) if h == "empty"));
}

#[tokio::test]
async fn test_rating_status_and_standings() {
    let client = client().await;

    let changes = client.user_rating("tourist").await.unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].new_rating - changes[0].old_rating, 100);

    let submissions = client.user_status("tourist").await.unwrap();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].problem.tags, vec!["implementation".to_string()]);

    assert_eq!(client.contest_problem_count(1).await.unwrap(), 2);
}
